//! Error types for scene services and the host boundary.

use sw_mechanics::MechError;

/// A failure reported by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host rejected a metadata write.
    #[error("metadata write rejected: {0}")]
    WriteRejected(String),

    /// A broadcast could not be sent.
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),

    /// Any other host call failed.
    #[error("host call failed: {0}")]
    Unavailable(String),
}

/// Convenience result type for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur in scene services.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A host call failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The operation is reserved for the GM.
    #[error("only the GM can {0}")]
    NotGameMaster(&'static str),

    /// A player tried to write a character they do not own.
    #[error("player {player} cannot edit the character of {owner}")]
    NotOwner {
        /// The player attempting the write.
        player: String,
        /// The owner of the character.
        owner: String,
    },

    /// No token is selected on the map.
    #[error("Please select a token on the map first")]
    NoTokenSelected,

    /// More than one item is selected on the map.
    #[error("Please select only one token")]
    MultipleTokensSelected,

    /// The token is not on the map.
    #[error("Token not found: {0}")]
    TokenNotFound(String),

    /// The selected item is not an image token.
    #[error("Selected item is not a token")]
    NotAToken,

    /// No NPC has this id.
    #[error("NPC not found: {0}")]
    NpcNotFound(String),

    /// No player in the party has this id.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// A push was requested before any roll.
    #[error("there is no roll to push")]
    NoRoll,

    /// Turn actions spend more than the two-action budget.
    #[error("only {budget} of the three actions can be used in a turn, not {used}")]
    ActionBudgetExceeded {
        /// Actions marked as used.
        used: usize,
        /// Actions allowed per turn.
        budget: usize,
    },

    /// A player tried to help themselves.
    #[error("you cannot help yourself")]
    SelfAssistance,

    /// A rules contract was violated.
    #[error(transparent)]
    Rules(#[from] MechError),

    /// A value could not be encoded for the host.
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// The metadata key being written.
        key: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}

/// Convenience result type for scene services.
pub type SceneResult<T> = Result<T, SceneError>;
