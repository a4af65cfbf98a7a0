//! Public entry points: plain design, design with troubleshooting, and the
//! [`PrimerDesigner`] service that binds both to an engine.

pub mod design;
pub mod error;
pub mod troubleshoot;

pub use error::{DesignError, ErrorKind};

use crate::core::models::result::DesignResult;
use crate::core::sequence::{TargetedSequence, parse_target};
use crate::engine::backend::DesignEngine;
use crate::engine::config::{DesignOverrides, DesignParameters, DesignParametersBuilder};
use crate::engine::progress::ProgressReporter;

/// Stateless design service. Each call is independent; the only thing held is the engine.
#[derive(Debug, Clone)]
pub struct PrimerDesigner<E> {
    engine: E,
}

impl<E: DesignEngine> PrimerDesigner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Parses the `[n]` marker and layers `overrides` over the defaults.
    ///
    /// Target coordinates come from the marker unless the overrides name them
    /// explicitly, in which case they must still fall inside the cleaned sequence.
    /// The engine then gets a chance to reject the template length.
    pub fn prepare(
        &self,
        raw_sequence: &str,
        overrides: &DesignOverrides,
    ) -> Result<(TargetedSequence, DesignParameters), DesignError> {
        let targeted = parse_target(raw_sequence)?;
        let parameters = DesignParametersBuilder::new()
            .target(targeted.target_start, targeted.target_length)
            .overrides(overrides)
            .sequence_length(targeted.len())
            .build()?;
        self.engine.check_template(targeted.len())?;
        Ok((targeted, parameters))
    }

    pub fn design(
        &self,
        raw_sequence: &str,
        overrides: &DesignOverrides,
    ) -> Result<DesignResult, DesignError> {
        self.design_with_progress(raw_sequence, overrides, &ProgressReporter::new())
    }

    pub fn design_with_progress(
        &self,
        raw_sequence: &str,
        overrides: &DesignOverrides,
        reporter: &ProgressReporter,
    ) -> Result<DesignResult, DesignError> {
        let (targeted, parameters) = self.prepare(raw_sequence, overrides)?;
        design::run(&self.engine, &targeted.sequence, &parameters, reporter)
    }

    pub fn troubleshoot(
        &self,
        raw_sequence: &str,
        overrides: &DesignOverrides,
    ) -> Result<DesignResult, DesignError> {
        self.troubleshoot_with_progress(raw_sequence, overrides, &ProgressReporter::new())
    }

    pub fn troubleshoot_with_progress(
        &self,
        raw_sequence: &str,
        overrides: &DesignOverrides,
        reporter: &ProgressReporter,
    ) -> Result<DesignResult, DesignError> {
        let (targeted, parameters) = self.prepare(raw_sequence, overrides)?;
        troubleshoot::run(&self.engine, &targeted.sequence, &parameters, reporter)
    }
}
