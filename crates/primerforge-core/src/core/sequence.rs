use phf::{Set, phf_set};
use thiserror::Error;

/// Placeholder token marking the amplification target in raw input.
pub const TARGET_MARKER: &str = "[n]";

static DNA_ALPHABET: Set<char> = phf_set! {
    'A', 'T', 'G', 'C', 'N',
    'a', 't', 'g', 'c', 'n',
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceError {
    #[error("Sequence must contain a [n] placeholder for the target region")]
    MissingTarget,

    #[error("Sequence must contain exactly one [n] placeholder, found {count}")]
    DuplicateTarget { count: usize },

    #[error("Sequence is empty once the [n] placeholder is removed")]
    EmptySequence,

    #[error("Sequence contains invalid characters: {}. Only ATGCN bases are allowed.", format_chars(.0))]
    InvalidCharacters(Vec<char>),
}

fn format_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A template sequence with the target marker resolved to coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetedSequence {
    pub sequence: String,
    pub target_start: usize,
    pub target_length: usize,
}

impl TargetedSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Resolves the single `[n]` marker (case-insensitive) in `raw`.
///
/// Whitespace is dropped, the marker is removed, and the target starts at the
/// position the marker occupied in the cleaned sequence, spanning one base.
pub fn parse_target(raw: &str) -> Result<TargetedSequence, SequenceError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let lowered = compact.to_ascii_lowercase();

    let positions: Vec<usize> = lowered
        .match_indices(TARGET_MARKER)
        .map(|(idx, _)| idx)
        .collect();

    let target_start = match positions.as_slice() {
        [] => return Err(SequenceError::MissingTarget),
        [single] => *single,
        many => return Err(SequenceError::DuplicateTarget { count: many.len() }),
    };

    let mut sequence = String::with_capacity(compact.len() - TARGET_MARKER.len());
    sequence.push_str(&compact[..target_start]);
    sequence.push_str(&compact[target_start + TARGET_MARKER.len()..]);

    validate_dna(&sequence)?;

    Ok(TargetedSequence {
        sequence,
        target_start,
        target_length: 1,
    })
}

/// Checks that `sequence` is non-empty and drawn from the `ATGCN` alphabet.
pub fn validate_dna(sequence: &str) -> Result<(), SequenceError> {
    if sequence.is_empty() {
        return Err(SequenceError::EmptySequence);
    }
    let mut invalid: Vec<char> = sequence
        .chars()
        .filter(|c| !DNA_ALPHABET.contains(c))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    invalid.sort_unstable();
    invalid.dedup();
    Err(SequenceError::InvalidCharacters(invalid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_removes_marker_and_records_position() {
        let parsed = parse_target("ATGC[n]GCTA").unwrap();
        assert_eq!(parsed.sequence, "ATGCGCTA");
        assert_eq!(parsed.target_start, 4);
        assert_eq!(parsed.target_length, 1);
    }

    #[test]
    fn parse_target_is_case_insensitive() {
        let parsed = parse_target("ATGC[N]GCTA").unwrap();
        assert_eq!(parsed.sequence, "ATGCGCTA");
        assert_eq!(parsed.target_start, 4);
    }

    #[test]
    fn parse_target_ignores_whitespace_when_locating_marker() {
        let parsed = parse_target("ATG C\n[n]\tGCTA ").unwrap();
        assert_eq!(parsed.sequence, "ATGCGCTA");
        assert_eq!(parsed.target_start, 4);
    }

    #[test]
    fn parse_target_handles_marker_at_either_end() {
        assert_eq!(parse_target("[n]ACGT").unwrap().target_start, 0);
        assert_eq!(parse_target("ACGT[n]").unwrap().target_start, 4);
    }

    #[test]
    fn parse_target_rejects_missing_marker() {
        assert_eq!(parse_target("ATGCGCTA"), Err(SequenceError::MissingTarget));
    }

    #[test]
    fn parse_target_rejects_duplicate_markers() {
        assert_eq!(
            parse_target("AT[n]GC[N]TA"),
            Err(SequenceError::DuplicateTarget { count: 2 })
        );
    }

    #[test]
    fn parse_target_rejects_marker_only_input() {
        assert_eq!(parse_target("[n]"), Err(SequenceError::EmptySequence));
    }

    #[test]
    fn parse_target_rejects_invalid_bases_sorted_and_unique() {
        let err = parse_target("ATGCXYZX[n]GC").unwrap_err();
        assert_eq!(err, SequenceError::InvalidCharacters(vec!['X', 'Y', 'Z']));
        assert!(err.to_string().contains("invalid characters: X, Y, Z"));
    }

    #[test]
    fn validate_dna_accepts_ambiguous_and_lowercase_bases() {
        assert!(validate_dna("ATGCATGCN").is_ok());
        assert!(validate_dna("atgcn").is_ok());
    }
}
