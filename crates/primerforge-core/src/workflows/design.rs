use super::error::DesignError;
use crate::core::models::result::{Attempt, DesignResult, RelaxationStep};
use crate::engine::backend::{DesignEngine, EngineOutcome, EngineRequest};
use crate::engine::config::DesignParameters;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

/// Single design attempt with the caller's parameters; an empty result is returned as is.
#[instrument(skip_all, name = "design_workflow")]
pub fn run<E: DesignEngine + ?Sized>(
    engine: &E,
    sequence: &str,
    parameters: &DesignParameters,
    reporter: &ProgressReporter,
) -> Result<DesignResult, DesignError> {
    info!(
        sequence_length = sequence.len(),
        target_start = parameters.target_start,
        "Starting primer design."
    );
    let (outcome, attempt) = attempt(engine, sequence, parameters, RelaxationStep::Initial, reporter)?;
    let result = DesignResult::new(outcome.into_pairs(), None, vec![attempt]);
    info!("Design complete. Returning {} pair(s).", result.num_returned());
    Ok(result)
}

/// One engine invocation for `step`, reported and logged.
pub(crate) fn attempt<E: DesignEngine + ?Sized>(
    engine: &E,
    sequence: &str,
    parameters: &DesignParameters,
    step: RelaxationStep,
    reporter: &ProgressReporter,
) -> Result<(EngineOutcome, Attempt), EngineError> {
    reporter.report(Progress::AttemptStart { step });
    debug!(
        step = %step,
        gc_clamp = parameters.gc_clamp,
        tm_min = parameters.primer_tm_min,
        tm_max = parameters.primer_tm_max,
        "Invoking design engine."
    );

    let outcome = engine.design(&EngineRequest {
        sequence,
        parameters,
    })?;
    let pairs_found = outcome.pair_count();

    debug!(step = %step, pairs_found, "Design engine returned.");
    reporter.report(Progress::AttemptFinish {
        step,
        pairs: pairs_found,
    });

    Ok((
        outcome,
        Attempt {
            step,
            gc_clamp: parameters.gc_clamp,
            primer_tm_min: parameters.primer_tm_min,
            primer_tm_max: parameters.primer_tm_max,
            pairs_found,
        },
    ))
}
