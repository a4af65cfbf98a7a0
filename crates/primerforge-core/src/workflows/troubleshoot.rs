//! The constraint-relaxation retry policy.
//!
//! Attempts run in [`RelaxationStep::SEQUENCE`] order until one yields pairs:
//!
//! | Step        | Bundle                                                  |
//! |-------------|---------------------------------------------------------|
//! | initial     | caller's parameters                                     |
//! | gc_clamp_2  | base with `gc_clamp = 2`                                |
//! | gc_clamp_1  | base with `gc_clamp = 1`                                |
//! | gc_clamp_0  | base with `gc_clamp = 0`                                |
//! | tm_widened  | previous bundle with Tm min - 1 °C and Tm max + 1 °C    |
//!
//! An engine fault ends the run immediately. Running out of steps is an empty success.

use super::design::attempt;
use super::error::DesignError;
use crate::core::models::result::{DesignResult, RelaxationStep};
use crate::engine::backend::{DesignEngine, EngineOutcome};
use crate::engine::config::{ConfigError, DesignParameters, DesignParametersBuilder};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

const TM_WIDENING_CELSIUS: f64 = 1.0;

#[instrument(skip_all, name = "troubleshoot_workflow")]
pub fn run<E: DesignEngine + ?Sized>(
    engine: &E,
    sequence: &str,
    base: &DesignParameters,
    reporter: &ProgressReporter,
) -> Result<DesignResult, DesignError> {
    info!(
        sequence_length = sequence.len(),
        gc_clamp = base.gc_clamp,
        "Starting primer design with troubleshooting."
    );

    let mut attempts = Vec::with_capacity(RelaxationStep::SEQUENCE.len());
    let mut previous = base.clone();
    let mut next_step = Some(RelaxationStep::Initial);

    while let Some(step) = next_step {
        let parameters = relaxed_parameters(step, base, &previous)?;
        let (outcome, record) = attempt(engine, sequence, &parameters, step, reporter)?;
        attempts.push(record);

        if let EngineOutcome::Pairs(pairs) = outcome {
            let applied = step.label().map(|_| step);
            match applied {
                Some(step) => {
                    info!(step = %step, pairs = pairs.len(), "Relaxation produced primer pairs.");
                    reporter.report(Progress::Message(format!(
                        "Applied troubleshooting step: {}",
                        step.description()
                    )));
                }
                None => info!(pairs = pairs.len(), "Design succeeded without relaxation."),
            }
            return Ok(DesignResult::new(pairs, applied, attempts));
        }

        info!(step = %step, "No primer pairs found.");
        previous = parameters;
        next_step = step.next();
    }

    warn!(
        attempts = attempts.len(),
        "Troubleshooting exhausted without finding primer pairs."
    );
    Ok(DesignResult::exhausted(attempts))
}

/// Bundle for `step`. GC-clamp steps override the caller's base independently;
/// Tm widening builds on the bundle of the step before it.
pub fn relaxed_parameters(
    step: RelaxationStep,
    base: &DesignParameters,
    previous: &DesignParameters,
) -> Result<DesignParameters, ConfigError> {
    match step {
        RelaxationStep::Initial => Ok(base.clone()),
        RelaxationStep::GcClamp2 => DesignParametersBuilder::from_base(base).gc_clamp(2).build(),
        RelaxationStep::GcClamp1 => DesignParametersBuilder::from_base(base).gc_clamp(1).build(),
        RelaxationStep::GcClamp0 => DesignParametersBuilder::from_base(base).gc_clamp(0).build(),
        RelaxationStep::TmWidened => DesignParametersBuilder::from_base(previous)
            .primer_tm_min(previous.primer_tm_min - TM_WIDENING_CELSIUS)
            .primer_tm_max(previous.primer_tm_max + TM_WIDENING_CELSIUS)
            .build(),
    }
}
