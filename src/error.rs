//! Error types for lazyseq generators

use std::fmt;
use thiserror::Error;

use crate::generator::GeneratorState;

/// Main error type for lazyseq
#[derive(Error, Debug)]
pub enum Error {
    /// Operation not permitted in the generator's current lifecycle state
    #[error("InvalidState: cannot {operation} a generator that is {state}")]
    InvalidState {
        operation: &'static str,
        state: GeneratorState,
    },

    /// The caller-supplied step function reported a failure
    #[error("StepError: {message}")]
    StepFailed { message: String },

    /// The step function panicked on the producer thread
    #[error("StepError: producer panicked: {message}")]
    ProducerPanicked { message: String },

    /// An arbitrary error raised by a step function
    #[error("StepError: {0}")]
    External(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The producer thread could not be spawned
    #[error("SpawnError: {source}")]
    SpawnError {
        #[from]
        source: std::io::Error,
    },

    /// Invalid or unreadable configuration
    #[error("ConfigError: {0}")]
    ConfigError(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Misuse of the lifecycle (next before start, double start)
    InvalidState,
    /// The producer failed while computing an element
    StepFailure,
    /// The producer thread could not be created
    Spawn,
    /// Configuration could not be loaded
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidState => write!(f, "InvalidState"),
            ErrorKind::StepFailure => write!(f, "StepFailure"),
            ErrorKind::Spawn => write!(f, "Spawn"),
            ErrorKind::Config => write!(f, "Config"),
        }
    }
}

impl Error {
    /// Create an InvalidState error for `operation` attempted in `state`
    pub fn invalid_state(operation: &'static str, state: GeneratorState) -> Self {
        Error::InvalidState { operation, state }
    }

    /// Create a step failure with a message
    pub fn step_failed(message: impl Into<String>) -> Self {
        Error::StepFailed {
            message: message.into(),
        }
    }

    /// Wrap any error raised inside a step function
    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::External(Box::new(error))
    }

    /// Build a step failure from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            messages::UNKNOWN_PANIC.to_string()
        };
        Error::ProducerPanicked { message }
    }

    /// Coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidState { .. } => ErrorKind::InvalidState,
            Error::StepFailed { .. } | Error::ProducerPanicked { .. } | Error::External(_) => {
                ErrorKind::StepFailure
            }
            Error::SpawnError { .. } => ErrorKind::Spawn,
            Error::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Returns `true` for lifecycle misuse errors
    pub fn is_invalid_state(&self) -> bool {
        self.kind() == ErrorKind::InvalidState
    }

    /// Returns `true` when the producer failed while computing an element
    pub fn is_step_failure(&self) -> bool {
        self.kind() == ErrorKind::StepFailure
    }
}

/// Result type alias for lazyseq
pub type Result<T> = std::result::Result<T, Error>;

/// Operation names and fixed messages used in error reports
pub mod messages {
    pub const OP_START: &str = "start";
    pub const OP_NEXT: &str = "pull from";
    pub const UNKNOWN_PANIC: &str = "non-string panic payload";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = Error::invalid_state(messages::OP_NEXT, GeneratorState::NotStarted);
        assert_eq!(
            err.to_string(),
            "InvalidState: cannot pull from a generator that is not started"
        );
        assert!(err.is_invalid_state());
        assert!(!err.is_step_failure());
    }

    #[test]
    fn test_step_failure_kinds() {
        assert_eq!(Error::step_failed("boom").kind(), ErrorKind::StepFailure);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(Error::external(io).kind(), ErrorKind::StepFailure);
    }

    #[test]
    fn test_panic_payloads() {
        let err = Error::from_panic(Box::new("static message"));
        assert_eq!(err.to_string(), "StepError: producer panicked: static message");

        let err = Error::from_panic(Box::new(String::from("owned message")));
        assert!(err.to_string().contains("owned message"));

        let err = Error::from_panic(Box::new(42u32));
        assert!(err.to_string().contains(messages::UNKNOWN_PANIC));
    }

    #[test]
    fn test_spawn_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Spawn);
    }
}
