use serde::Serialize;

/// Per-strand metrics reported by the design engine for one primer.
///
/// Right-strand primers carry their sequence already reverse-complemented, so both
/// `sequence` fields read 5'→3' as they would be ordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerFeatures {
    /// Position of the 5' base on the template.
    pub start: usize,
    pub length: usize,
    pub tm: f64,
    pub gc_percent: f64,
    pub self_any: f64,
    /// 3' self-complementarity, a proxy for primer-dimer tendency.
    pub self_end: f64,
    /// Mispriming / library similarity score (0.0 when no library is configured).
    #[serde(rename = "rep")]
    pub mispriming: f64,
    pub sequence: String,
}

/// One ranked left/right primer combination.
///
/// Pairs are kept in the order the engine returned them; rank 0 is the engine's best.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerPair {
    #[serde(rename = "pair_id")]
    pub rank: usize,
    #[serde(rename = "left_primer")]
    pub left: PrimerFeatures,
    #[serde(rename = "right_primer")]
    pub right: PrimerFeatures,
    pub product_size: usize,
    /// Engine-computed pair penalty; lower is better.
    pub penalty: f64,
}
