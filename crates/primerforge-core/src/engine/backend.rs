use super::config::{ConfigError, DesignParameters};
use super::error::EngineError;
use crate::core::models::primer::PrimerPair;

/// Everything one engine invocation needs.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    /// Clean template, marker already removed.
    pub sequence: &'a str,
    pub parameters: &'a DesignParameters,
}

impl EngineRequest<'_> {
    pub fn target_start(&self) -> usize {
        self.parameters.target_start
    }

    pub fn target_length(&self) -> usize {
        self.parameters.target_length
    }
}

/// The two non-fault outcomes of a design attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// Ranked pairs, best first, in the engine's own order.
    Pairs(Vec<PrimerPair>),
    NoPairs,
}

impl EngineOutcome {
    /// Normalizes an empty pair list into [`EngineOutcome::NoPairs`].
    pub fn from_pairs(pairs: Vec<PrimerPair>) -> Self {
        if pairs.is_empty() {
            EngineOutcome::NoPairs
        } else {
            EngineOutcome::Pairs(pairs)
        }
    }

    pub fn pair_count(&self) -> usize {
        match self {
            EngineOutcome::Pairs(pairs) => pairs.len(),
            EngineOutcome::NoPairs => 0,
        }
    }

    pub fn into_pairs(self) -> Vec<PrimerPair> {
        match self {
            EngineOutcome::Pairs(pairs) => pairs,
            EngineOutcome::NoPairs => Vec::new(),
        }
    }
}

/// An external primer-design engine.
///
/// Implementations must keep "zero pairs" and genuine faults apart: the first is an
/// [`EngineOutcome::NoPairs`], the second an [`EngineError`]. Calls take `&self` and
/// carry no state between invocations.
pub trait DesignEngine {
    /// Rejects templates the engine cannot work with under its own settings,
    /// before any attempt is made.
    fn check_template(&self, _sequence_length: usize) -> Result<(), ConfigError> {
        Ok(())
    }

    fn design(&self, request: &EngineRequest<'_>) -> Result<EngineOutcome, EngineError>;
}

impl<E: DesignEngine + ?Sized> DesignEngine for &E {
    fn check_template(&self, sequence_length: usize) -> Result<(), ConfigError> {
        (**self).check_template(sequence_length)
    }

    fn design(&self, request: &EngineRequest<'_>) -> Result<EngineOutcome, EngineError> {
        (**self).design(request)
    }
}

impl<E: DesignEngine + ?Sized> DesignEngine for Box<E> {
    fn check_template(&self, sequence_length: usize) -> Result<(), ConfigError> {
        (**self).check_template(sequence_length)
    }

    fn design(&self, request: &EngineRequest<'_>) -> Result<EngineOutcome, EngineError> {
        (**self).design(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::primer::fixtures::pairs;

    #[test]
    fn from_pairs_normalizes_empty_list() {
        assert_eq!(EngineOutcome::from_pairs(vec![]), EngineOutcome::NoPairs);
        assert_eq!(EngineOutcome::from_pairs(pairs(2)).pair_count(), 2);
    }

    #[test]
    fn no_pairs_converts_to_empty_vec() {
        assert!(EngineOutcome::NoPairs.into_pairs().is_empty());
    }
}
