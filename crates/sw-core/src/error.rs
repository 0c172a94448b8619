/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when working with character data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The skill id is not one of the eleven Streetwise skills.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// The attribute id is not one of the four Streetwise attributes.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The archetype id is not one of the seven Streetwise archetypes.
    #[error("unknown archetype: {0}")]
    UnknownArchetype(String),

    /// The condition id is not a known condition stage.
    #[error("unknown condition: {0}")]
    UnknownCondition(String),

    /// A condition list skipped a stage or listed stages out of order.
    #[error("conditions must be cumulative (bruised, hurt, injured, broken): got {0:?}")]
    NonCumulativeConditions(Vec<String>),
}
