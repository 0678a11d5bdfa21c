use thiserror::Error;

/// Contract violations detected at the observer call boundary.
///
/// None of these are recoverable by retry; a failed call leaves the observer
/// state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObserverError {
    /// A state or gain slice does not match the observer state dimension.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The sample time is not a finite positive number.
    #[error("sample time must be finite and positive, got {0}")]
    InvalidSampleTime(f64),

    /// The observer was stepped before an initial state was set.
    #[error("observer stepped before an initial state was set")]
    Uninitialized,
}
