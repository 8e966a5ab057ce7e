use std::time::Duration;
use thiserror::Error;

use crate::core::kind::InputKind;

/// Faults raised by the content backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Node {0} was not found")]
    NodeNotFound(i32),

    #[error("Backend operation failed: {0}")]
    Operation(String),
}

/// Errors an execute routine can return.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Input {position} is not a {expected} input")]
    InputMismatch { position: usize, expected: InputKind },
}

/// A provider could not enumerate its processors.
#[derive(Debug, Error)]
#[error("Provider '{provider}' failed to enumerate processors: {reason}")]
pub struct DiscoveryError {
    pub provider: String,
    pub reason: String,
}

impl DiscoveryError {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

/// Hard failures of a dispatch, for hosts that want them raised rather than reported.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Processor '{label}' failed: {source}")]
    Execution {
        label: String,
        #[source]
        source: ProcessorError,
    },

    #[error("Processor '{label}' did not finish within {timeout:?}")]
    TimedOut { label: String, timeout: Duration },

    #[error("Processor '{0}' panicked")]
    Panicked(String),
}
