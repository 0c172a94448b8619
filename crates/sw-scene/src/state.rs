//! Typed scene state decoded from room metadata.
//!
//! Every value in the room store is decoded here, once, at the read
//! boundary. Missing, `null`, or malformed values fall back to their
//! defaults so a client always recovers a usable view from the next full
//! read, whatever a failed or racing write left behind.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SceneError, SceneResult};
use crate::host::Metadata;
use crate::keys::Keys;

/// Decode `key` from a metadata snapshot.
///
/// Returns `None` for a missing or `null` key. A value that does not decode
/// is logged and treated as missing.
pub fn read_key<T: DeserializeOwned>(meta: &Metadata, key: &str) -> Option<T> {
    let value = meta.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed metadata value");
            None
        }
    }
}

/// Decode a non-negative count, accepting integral floats.
pub fn read_count(meta: &Metadata, key: &str) -> Option<u32> {
    let value = meta.get(key)?;
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Assistance as stored: either a bare count from older clients or a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistanceValue {
    /// A bare count with no helper list.
    Legacy(u32),
    /// A count with the ids of the players helping.
    Record(Assistance),
}

/// Bonus dice waiting for a player's next roll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assistance {
    /// Pending bonus dice.
    pub count: u32,
    /// Ids of the players who granted them.
    #[serde(default)]
    pub helpers: Vec<String>,
}

impl From<AssistanceValue> for Assistance {
    fn from(value: AssistanceValue) -> Self {
        match value {
            AssistanceValue::Legacy(count) => Self {
                count,
                helpers: Vec::new(),
            },
            AssistanceValue::Record(record) => record,
        }
    }
}

impl Assistance {
    /// Read a player's assistance, resolving the legacy form.
    pub fn read(meta: &Metadata, keys: &Keys, player_id: &str) -> Self {
        read_key::<AssistanceValue>(meta, &keys.assistance(player_id))
            .map(Self::from)
            .unwrap_or_default()
    }
}

/// Who a player is currently helping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpingInfo {
    /// Id of the player being helped.
    pub target_player_id: String,
    /// Display name of the player being helped.
    pub target_player_name: String,
}

/// Actions used this turn: two quick actions and one slow action.
///
/// A slow action costs as much as two quick ones, so at most two of the
/// three flags may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnActions {
    /// The two quick action slots.
    pub quick: [bool; 2],
    /// The slow action.
    pub slow: bool,
}

impl TurnActions {
    /// Maximum number of flags that may be set at once.
    pub const BUDGET: usize = 2;

    /// Number of flags set.
    pub fn used(&self) -> usize {
        self.quick.iter().filter(|&&q| q).count() + usize::from(self.slow)
    }

    /// Returns true if the flags respect the action budget.
    pub fn is_valid(&self) -> bool {
        self.used() <= Self::BUDGET
    }

    /// `Ok(self)` if the budget holds, otherwise the error to report.
    pub fn checked(self) -> SceneResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SceneError::ActionBudgetExceeded {
                used: self.used(),
                budget: Self::BUDGET,
            })
        }
    }

    /// Toggle a quick slot. Refuses (returns false) when setting the flag
    /// would exceed the budget or the slot does not exist.
    pub fn toggle_quick(&mut self, slot: usize) -> bool {
        let Some(&current) = self.quick.get(slot) else {
            return false;
        };
        if !current && self.used() >= Self::BUDGET {
            return false;
        }
        self.quick[slot] = !current;
        true
    }

    /// Toggle the slow action. Refuses (returns false) when setting the flag
    /// would exceed the budget.
    pub fn toggle_slow(&mut self) -> bool {
        if !self.slow && self.used() >= Self::BUDGET {
            return false;
        }
        self.slow = !self.slow;
        true
    }
}

/// A GM-controlled character in the initiative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// Id, always prefixed `npc_`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Drawn initiative, if any.
    pub initiative: Option<u32>,
    /// Actions used this turn.
    #[serde(default)]
    pub turn_actions: TurnActions,
}

/// How a scene challenge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeResolution {
    /// Successes reached the target.
    Success,
    /// Banes reached the target.
    Failure,
    /// Both reached the target.
    Partial,
}

impl fmt::Display for ChallengeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SCENE CHALLENGE COMPLETE! The party succeeded!"),
            Self::Failure => write!(f, "SCENE CHALLENGE FAILED! Too many banes accumulated."),
            Self::Partial => write!(
                f,
                "SCENE CHALLENGE PARTIAL SUCCESS! Both success and failure reached."
            ),
        }
    }
}

/// A collective goal the party rolls toward.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneChallenge {
    /// Whether rolls may contribute.
    pub active: bool,
    /// Successes (or banes) needed to resolve.
    pub target: u32,
    /// What the party is trying to do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Successes so far.
    #[serde(default)]
    pub successes: u32,
    /// Banes so far.
    #[serde(default)]
    pub banes: u32,
}

impl SceneChallenge {
    /// An active challenge with zeroed counters.
    pub fn started(target: u32, description: Option<String>) -> Self {
        Self {
            active: true,
            target,
            description,
            successes: 0,
            banes: 0,
        }
    }

    /// How the challenge stands, or `None` if inactive or unresolved.
    pub fn resolution(&self) -> Option<ChallengeResolution> {
        if !self.active {
            return None;
        }
        let success = self.successes >= self.target;
        let failure = self.banes >= self.target;
        match (success, failure) {
            (true, true) => Some(ChallengeResolution::Partial),
            (true, false) => Some(ChallengeResolution::Success),
            (false, true) => Some(ChallengeResolution::Failure),
            (false, false) => None,
        }
    }
}

/// The initiative round record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitiativeRound {
    /// Whether a round is running.
    pub active: bool,
    /// Undrawn values.
    pub pool: Vec<u32>,
}

impl InitiativeRound {
    /// Read the round from metadata.
    pub fn read(meta: &Metadata, keys: &Keys) -> Self {
        Self {
            active: read_key(meta, &keys.round_active()).unwrap_or(false),
            pool: read_key(meta, &keys.round_pool()).unwrap_or_default(),
        }
    }
}

/// Read the NPC list.
pub fn read_npcs(meta: &Metadata, keys: &Keys) -> Vec<Npc> {
    read_key(meta, &keys.npcs()).unwrap_or_default()
}

/// One client's decoded view of the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSnapshot {
    /// Scene strain.
    pub strain: u32,
    /// Bonus dice waiting for this player.
    pub assistance: Assistance,
    /// Who this player is helping.
    pub helping: Option<HelpingInfo>,
    /// This player's drawn initiative.
    pub initiative: Option<u32>,
    /// This player's actions this turn.
    pub turn_actions: TurnActions,
    /// The initiative round.
    pub round: InitiativeRound,
    /// NPCs in the order.
    pub npcs: Vec<Npc>,
    /// Current turn; 0 before any round starts.
    pub turn_counter: u32,
    /// The scene challenge.
    pub challenge: SceneChallenge,
}

impl SceneSnapshot {
    /// Decode everything `player_id` needs from a metadata snapshot.
    pub fn read(meta: &Metadata, keys: &Keys, player_id: &str) -> Self {
        Self {
            strain: read_count(meta, &keys.strain()).unwrap_or(0),
            assistance: Assistance::read(meta, keys, player_id),
            helping: read_key(meta, &keys.helping(player_id)),
            initiative: read_count(meta, &keys.initiative(player_id)),
            turn_actions: read_key(meta, &keys.turn_actions(player_id)).unwrap_or_default(),
            round: InitiativeRound::read(meta, keys),
            npcs: read_npcs(meta, keys),
            turn_counter: read_count(meta, &keys.turn_counter()).unwrap_or(0),
            challenge: read_key(meta, &keys.scene_challenge()).unwrap_or_default(),
        }
    }
}

/// Build a metadata update from key/value pairs.
pub fn update<I, K>(entries: I) -> Metadata
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
