use crate::error::{CliError, Result};
use std::path::Path;

/// Template text from a plain or FASTA file.
///
/// FASTA headers (`>`) and comment lines (`;`) are skipped and the remaining
/// lines are concatenated; only the first record is read.
pub fn read_sequence_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    let mut sequence = String::new();
    let mut seen_header = false;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('>') {
            if seen_header && !sequence.is_empty() {
                break;
            }
            seen_header = true;
            continue;
        }
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        sequence.push_str(line);
    }

    if sequence.is_empty() {
        return Err(CliError::FileParsing {
            path: path.to_path_buf(),
            source: anyhow::anyhow!("no sequence data found"),
        });
    }
    Ok(sequence)
}

pub fn resolve_sequence(inline: Option<&str>, path: Option<&Path>) -> Result<String> {
    match (inline, path) {
        (Some(sequence), _) => Ok(sequence.to_string()),
        (None, Some(path)) => read_sequence_file(path),
        (None, None) => Err(CliError::Argument(
            "Provide a template with --sequence or --input.".to_string(),
        )),
    }
}
