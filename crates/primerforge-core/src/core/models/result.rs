use super::primer::PrimerPair;
use serde::Serialize;
use std::fmt;

pub const EXHAUSTED_NOTE: &str = "No primers found - consider a wider sequence search area";

/// A position in the fixed troubleshooting protocol.
///
/// Steps run strictly in [`RelaxationStep::SEQUENCE`] order and are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelaxationStep {
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "gc_clamp_2")]
    GcClamp2,
    #[serde(rename = "gc_clamp_1")]
    GcClamp1,
    #[serde(rename = "gc_clamp_0")]
    GcClamp0,
    #[serde(rename = "tm_widened")]
    TmWidened,
}

impl RelaxationStep {
    pub const SEQUENCE: [RelaxationStep; 5] = [
        RelaxationStep::Initial,
        RelaxationStep::GcClamp2,
        RelaxationStep::GcClamp1,
        RelaxationStep::GcClamp0,
        RelaxationStep::TmWidened,
    ];

    pub fn index(self) -> usize {
        match self {
            RelaxationStep::Initial => 0,
            RelaxationStep::GcClamp2 => 1,
            RelaxationStep::GcClamp1 => 2,
            RelaxationStep::GcClamp0 => 3,
            RelaxationStep::TmWidened => 4,
        }
    }

    /// The step attempted after this one comes back empty.
    pub fn next(self) -> Option<Self> {
        Self::SEQUENCE.get(self.index() + 1).copied()
    }

    /// Label recorded in `troubleshooting_applied` when this step succeeds.
    /// The initial attempt is not a relaxation and has no label.
    pub fn label(self) -> Option<&'static str> {
        match self {
            RelaxationStep::Initial => None,
            RelaxationStep::GcClamp2 => Some("gc_clamp_2"),
            RelaxationStep::GcClamp1 => Some("gc_clamp_1"),
            RelaxationStep::GcClamp0 => Some("gc_clamp_0"),
            RelaxationStep::TmWidened => Some("tm_widened"),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RelaxationStep::Initial => "Design with requested constraints",
            RelaxationStep::GcClamp2 => "Force GC clamp to 2",
            RelaxationStep::GcClamp1 => "Reduce GC clamp to 1",
            RelaxationStep::GcClamp0 => "Reduce GC clamp to 0",
            RelaxationStep::TmWidened => "Widen Tm range by ±1 °C",
        }
    }
}

impl fmt::Display for RelaxationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("initial"))
    }
}

/// Record of one engine invocation made while answering a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub step: RelaxationStep,
    pub gc_clamp: u32,
    pub primer_tm_min: f64,
    pub primer_tm_max: f64,
    pub pairs_found: usize,
}

/// Outcome of one top-level `design` or `troubleshoot` call.
///
/// An empty `pairs` list is a successful answer, not a fault. When the relaxation
/// protocol is exhausted `troubleshooting_applied` stays unset; the attempt log still
/// shows every step that was tried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignResult {
    pairs: Vec<PrimerPair>,
    num_returned: usize,
    #[serde(serialize_with = "serialize_step_label")]
    troubleshooting_applied: Option<RelaxationStep>,
    attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl DesignResult {
    pub fn new(
        pairs: Vec<PrimerPair>,
        troubleshooting_applied: Option<RelaxationStep>,
        attempts: Vec<Attempt>,
    ) -> Self {
        Self {
            num_returned: pairs.len(),
            pairs,
            troubleshooting_applied,
            attempts,
            note: None,
        }
    }

    /// Empty result after every relaxation step came back without pairs.
    pub fn exhausted(attempts: Vec<Attempt>) -> Self {
        Self {
            note: Some(EXHAUSTED_NOTE.to_string()),
            ..Self::new(Vec::new(), None, attempts)
        }
    }

    pub fn pairs(&self) -> &[PrimerPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<PrimerPair> {
        self.pairs
    }

    pub fn num_returned(&self) -> usize {
        self.num_returned
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn troubleshooting_applied(&self) -> Option<RelaxationStep> {
        self.troubleshooting_applied
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn last_attempted(&self) -> Option<RelaxationStep> {
        self.attempts.last().map(|a| a.step)
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

fn serialize_step_label<S>(step: &Option<RelaxationStep>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match step.and_then(RelaxationStep::label) {
        Some(label) => serializer.serialize_some(label),
        None => serializer.serialize_none(),
    }
}
