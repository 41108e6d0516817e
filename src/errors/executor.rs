//! Error types for the retrying query executor.

use std::fmt;

use super::DecodeError;

/// Boxed error carried through provider attempts.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single failed attempt against one provider binding.
///
/// Work passed to [`QueryExecutor::operation`](crate::QueryExecutor::operation)
/// returns this to tell the executor whether the next binding should be tried.
#[derive(Debug)]
pub enum AttemptError {
    /// The failure may not repeat on another binding; keep iterating.
    Retryable(BoxError),
    /// Trying another binding is pointless; stop after recording this failure.
    Fatal(BoxError),
}

impl AttemptError {
    /// Wrap an error as retryable.
    pub fn retryable(error: impl Into<BoxError>) -> Self {
        AttemptError::Retryable(error.into())
    }

    /// Wrap an error as fatal.
    pub fn fatal(error: impl Into<BoxError>) -> Self {
        AttemptError::Fatal(error.into())
    }

    /// Returns true if the executor must not try further bindings.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, AttemptError::Fatal(_))
    }

    pub(crate) fn into_inner(self) -> BoxError {
        match self {
            AttemptError::Retryable(e) | AttemptError::Fatal(e) => e,
        }
    }
}

/// One recorded failure of one provider binding.
#[derive(Debug)]
pub struct BindingFailure {
    /// Identity of the provider binding that failed
    pub binding: String,
    /// Whether the work asked to stop after this failure
    pub fatal: bool,
    /// The failure itself
    pub error: BoxError,
}

impl fmt::Display for BindingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.binding, self.error)?;
        if self.fatal {
            write!(f, " (stopped)")?;
        }
        Ok(())
    }
}

/// Errors returned by [`QueryExecutor::operation`](crate::QueryExecutor::operation).
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The executor was built without any provider binding.
    #[error("No provider bindings configured")]
    NoBindings,

    /// The decoding engine could not be initialised.
    #[error("Decoding engine failed to initialise")]
    EngineInit(#[source] DecodeError),

    /// Every attempted binding failed (or one asked to stop).
    #[error("All provider bindings failed: {}", format_failures(.failures))]
    Exhausted {
        /// Failures in the order the bindings were attempted
        failures: Vec<BindingFailure>,
    },
}

fn format_failures(failures: &[BindingFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
