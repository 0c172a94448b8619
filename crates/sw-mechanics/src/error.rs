//! Error types for the rules engine.

/// Errors that can occur during rules operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// The roll has already used every push it is allowed.
    #[error("this roll cannot be pushed")]
    NotPushable,
}

/// Convenience result type for rules operations.
pub type MechResult<T> = Result<T, MechError>;
