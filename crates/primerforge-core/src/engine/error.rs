use crate::core::io::boulder::BoulderError;
use thiserror::Error;

/// A design engine fault. "No pairs found" is never an `EngineError`; backends
/// report it as [`EngineOutcome::NoPairs`](super::backend::EngineOutcome::NoPairs).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not find primer3 executable '{executable}'. Install primer3 or set {env_var}")]
    ToolNotFound {
        executable: String,
        env_var: &'static str,
    },

    #[error("primer3 exited with status {status:?}: {stderr}")]
    ToolFailed { status: Option<i32>, stderr: String },

    #[error("primer3 reported an error: {0}")]
    Reported(String),

    #[error("Unexpected primer3 output: {0}")]
    MalformedOutput(String),

    #[error("Could not parse primer3 output: {source}")]
    Boulder {
        #[from]
        source: BoulderError,
    },

    #[error("I/O error while running the design engine: {0}")]
    Io(#[from] std::io::Error),
}
