use crate::core::models::primer::PrimerFeatures;
use crate::core::models::result::DesignResult;
use std::io::Write;

const HEADER: [&str; 19] = [
    "pair_id",
    "product_size",
    "penalty",
    "left_start",
    "left_length",
    "left_tm",
    "left_gc_percent",
    "left_self_any",
    "left_self_end",
    "left_rep",
    "left_sequence",
    "right_start",
    "right_length",
    "right_tm",
    "right_gc_percent",
    "right_self_any",
    "right_self_end",
    "right_rep",
    "right_sequence",
];

fn strand_fields(features: &PrimerFeatures) -> [String; 8] {
    [
        features.start.to_string(),
        features.length.to_string(),
        format!("{:.2}", features.tm),
        format!("{:.2}", features.gc_percent),
        format!("{:.2}", features.self_any),
        format!("{:.2}", features.self_end),
        format!("{:.2}", features.mispriming),
        features.sequence.clone(),
    ]
}

/// Writes one CSV row per primer pair, left and right strand features side by side.
pub fn write_csv<W: Write>(result: &DesignResult, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for pair in result.pairs() {
        let mut row = vec![
            pair.rank.to_string(),
            pair.product_size.to_string(),
            format!("{:.4}", pair.penalty),
        ];
        row.extend(strand_fields(&pair.left));
        row.extend(strand_fields(&pair.right));
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
