use crate::cli::OutputFormat;
use crate::error::{CliError, Result};
use primerforge::core::io::tabular;
use primerforge::core::models::result::DesignResult;
use std::io::Write;

pub fn render<W: Write>(result: &DesignResult, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(result, writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, result)
                .map_err(|e| CliError::Other(e.into()))?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            tabular::write_csv(result, &mut *writer).map_err(|e| CliError::Other(e.into()))?
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_table<W: Write>(result: &DesignResult, w: &mut W) -> std::io::Result<()> {
    if result.is_empty() {
        writeln!(w, "No primer pairs found.")?;
    } else {
        writeln!(
            w,
            "{:<4} {:>7} {:>8}  {:<32} {:>6}  {:<32} {:>6}",
            "#", "product", "penalty", "left primer", "Tm", "right primer", "Tm"
        )?;
        for pair in result.pairs() {
            writeln!(
                w,
                "{:<4} {:>7} {:>8.4}  {:<32} {:>6.2}  {:<32} {:>6.2}",
                pair.rank,
                pair.product_size,
                pair.penalty,
                pair.left.sequence,
                pair.left.tm,
                pair.right.sequence,
                pair.right.tm
            )?;
        }
    }

    if let Some(step) = result.troubleshooting_applied() {
        writeln!(w, "Troubleshooting applied: {} ({})", step, step.description())?;
    }
    if let Some(note) = result.note() {
        writeln!(w, "Note: {}", note)?;
    }
    Ok(())
}
