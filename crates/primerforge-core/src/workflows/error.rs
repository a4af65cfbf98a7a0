use crate::core::sequence::SequenceError;
use crate::engine::config::ConfigError;
use crate::engine::error::EngineError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Every way a top-level design call can fail. An empty result is not among them.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] SequenceError),

    #[error("Engine invocation failed: {0}")]
    EngineInvocation(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfiguration,
    MalformedInput,
    EngineInvocation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidConfiguration => "invalid_configuration",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::EngineInvocation => "engine_invocation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DesignError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DesignError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            DesignError::MalformedInput(_) => ErrorKind::MalformedInput,
            DesignError::EngineInvocation(_) => ErrorKind::EngineInvocation,
        }
    }
}
