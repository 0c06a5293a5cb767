//! Error types for the pipeline.
//!
//! The pipeline declares exactly one failure of its own: trying to extend a
//! chain after dispatch has started. Every other failure belongs to the
//! middleware or the fallback and travels through the pipeline untouched.

use thiserror::Error;

/// Result type alias for pipeline-building operations.
pub type PipelineResult<T> = Result<T, PipelineLockedError>;

/// A building operation was attempted on a locked pipeline.
///
/// A queue or dispatcher locks the first time it is asked for its next
/// middleware. From then on it can only be dispatched, never extended.
/// This is a usage error: the caller kept building on a value that had
/// already been dispatched.
///
/// # Example
///
/// ```
/// use relay_core::PipelineLockedError;
///
/// let err = PipelineLockedError::new("add middleware");
/// assert_eq!(err.operation(), "add middleware");
/// assert_eq!(
///     err.to_string(),
///     "cannot add middleware once the pipeline is dequeueing"
/// );
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("cannot {operation} once the pipeline is dequeueing")]
pub struct PipelineLockedError {
    operation: &'static str,
}

impl PipelineLockedError {
    /// Creates a locked error for the rejected operation.
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self { operation }
    }

    /// Returns the name of the operation that was rejected.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }
}
