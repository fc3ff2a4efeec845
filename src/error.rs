//! Error types for the store seam and the tracker service.

/// Failure reported by a [`crate::storage::TaskStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The dog collection could not be loaded or parsed.
    #[error("task store unavailable: {0}")]
    Unavailable(String),

    /// A mutation could not be persisted.
    #[error("failed to write to task store: {0}")]
    Write(String),
}

/// Failure of a [`crate::tracker::Tracker`] operation.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dog '{0}' not found")]
    DogNotFound(String),

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    /// Input rejected before any state change was attempted.
    #[error("{0}")]
    Validation(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TrackerError>;
