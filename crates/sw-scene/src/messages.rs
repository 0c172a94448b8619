//! Broadcast messages and the notification filter.
//!
//! Every message carries a millisecond timestamp. Receivers key duplicates
//! on type, author, and timestamp, and use the author ids to keep a player
//! from being notified of their own roll, panic, or help.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sw_mechanics::{DiceRoll, ScenePanic};

/// Dice pool sizes in a roll message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSize {
    /// Regular dice.
    pub regular: u32,
    /// Strain dice.
    pub strain: u32,
}

/// Totals in a roll message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTotals {
    /// Successes.
    pub successes: u32,
    /// Banes across both pools.
    pub banes: u32,
    /// Banes on strain dice.
    pub strain_banes: u32,
}

/// A player rolled (or pushed) a dice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollMessage {
    /// Author id.
    pub player_id: String,
    /// Author display name.
    pub player_name: String,
    /// Character that rolled.
    pub character_name: String,
    /// Skill or attribute rolled.
    pub skill_name: String,
    /// Pool sizes.
    pub dice_pool: PoolSize,
    /// Totals.
    pub results: RollTotals,
    /// Whether the roll was pushed.
    pub pushed: bool,
    /// Whether a strain bane showed.
    #[serde(default)]
    pub panic_triggered: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl RollMessage {
    /// Describe `roll` for broadcast.
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        character_name: impl Into<String>,
        skill_name: impl Into<String>,
        roll: &DiceRoll,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            character_name: character_name.into(),
            skill_name: skill_name.into(),
            dice_pool: PoolSize {
                regular: roll.regular_dice,
                strain: roll.strain_dice,
            },
            results: RollTotals {
                successes: roll.successes,
                banes: roll.total_banes,
                strain_banes: roll.strain_banes,
            },
            pushed: roll.pushed,
            panic_triggered: roll.strain_banes > 0,
            timestamp: now_millis(),
        }
    }
}

/// Scene strain changed. Decoded for compatibility; never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrainChangeMessage {
    /// Strain before.
    pub old_value: u32,
    /// Strain after.
    pub new_value: u32,
    /// Difference.
    pub delta: i64,
    /// Name of the player who changed it.
    pub changed_by: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A roll triggered scene panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePanicMessage {
    /// Character whose roll panicked the scene.
    pub character_name: String,
    /// Author id.
    pub player_id: String,
    /// The panic d6.
    pub roll: u32,
    /// Panic d6 plus strain.
    pub total: u32,
    /// Table text.
    pub effect: String,
    /// Extra strain added.
    pub strain_increase: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ScenePanicMessage {
    /// Describe `panic` for broadcast.
    pub fn new(
        player_id: impl Into<String>,
        character_name: impl Into<String>,
        panic: &ScenePanic,
    ) -> Self {
        Self {
            character_name: character_name.into(),
            player_id: player_id.into(),
            roll: panic.roll,
            total: panic.total,
            effect: panic.effect().to_string(),
            strain_increase: panic.strain_increase(),
            timestamp: now_millis(),
        }
    }
}

/// One player granted another a bonus die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceMessage {
    /// Helper id.
    pub from_player_id: String,
    /// Helper display name.
    pub from_player_name: String,
    /// Helper's character.
    pub from_character_name: String,
    /// Target id.
    pub to_player_id: String,
    /// Target display name.
    pub to_player_name: String,
    /// Target's character.
    pub to_character_name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Everything sent on the rolls channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BroadcastMessage {
    /// A roll result.
    #[serde(rename = "STREETWISE_ROLL")]
    Roll(RollMessage),
    /// A strain change.
    #[serde(rename = "STRAIN_CHANGE")]
    StrainChange(StrainChangeMessage),
    /// A scene panic.
    #[serde(rename = "SCENE_PANIC")]
    ScenePanic(ScenePanicMessage),
    /// An assistance grant.
    #[serde(rename = "PLAYER_ASSISTANCE")]
    Assistance(AssistanceMessage),
}

impl BroadcastMessage {
    /// Decode a channel payload. Payloads that are not ours yield `None`.
    pub fn decode(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Encode for the channel.
    pub fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Roll(_) => "STREETWISE_ROLL",
            Self::StrainChange(_) => "STRAIN_CHANGE",
            Self::ScenePanic(_) => "SCENE_PANIC",
            Self::Assistance(_) => "PLAYER_ASSISTANCE",
        }
    }

    /// Id of the player who sent the message, when it names one.
    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Roll(m) => Some(&m.player_id),
            Self::ScenePanic(m) => Some(&m.player_id),
            Self::Assistance(m) => Some(&m.from_player_id),
            Self::StrainChange(_) => None,
        }
    }

    /// The message timestamp.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Roll(m) => m.timestamp,
            Self::StrainChange(m) => m.timestamp,
            Self::ScenePanic(m) => m.timestamp,
            Self::Assistance(m) => m.timestamp,
        }
    }
}

impl fmt::Display for BroadcastMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roll(m) => {
                write!(
                    f,
                    "{} ({}) rolled {}: {} successes, {} banes",
                    m.character_name,
                    m.player_name,
                    m.skill_name,
                    m.results.successes,
                    m.results.banes
                )?;
                if m.pushed {
                    write!(f, " (pushed)")?;
                }
                Ok(())
            }
            Self::StrainChange(m) => write!(
                f,
                "Strain {} -> {} ({})",
                m.old_value, m.new_value, m.changed_by
            ),
            Self::ScenePanic(m) => {
                write!(
                    f,
                    "SCENE PANIC! {} rolled {} = {}: {}",
                    m.character_name, m.roll, m.total, m.effect
                )?;
                if m.strain_increase > 0 {
                    write!(f, " +{} Strain", m.strain_increase)?;
                }
                Ok(())
            }
            Self::Assistance(m) => write!(
                f,
                "{} is helping {}",
                m.from_character_name, m.to_character_name
            ),
        }
    }
}

/// A message worth showing, with how long to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The message.
    pub message: BroadcastMessage,
    /// Time until it is dismissed.
    pub dismiss_after: Duration,
}

/// Decides which incoming messages become notifications for one player.
#[derive(Debug, Clone)]
pub struct NotificationFilter {
    player_id: String,
    dismiss_after: Duration,
    seen: HashSet<(&'static str, Option<String>, i64)>,
}

impl NotificationFilter {
    /// A filter for `player_id`.
    pub fn new(player_id: impl Into<String>, dismiss_after: Duration) -> Self {
        Self {
            player_id: player_id.into(),
            dismiss_after,
            seen: HashSet::new(),
        }
    }

    /// Returns a notification if `message` should be shown.
    ///
    /// Drops repeats of a message already shown, the player's own rolls
    /// and panics, help the player gave, and strain changes. A repeat has
    /// the same type, author, and timestamp; a push sends its roll and its
    /// panic in the same millisecond and both are shown.
    pub fn accept(&mut self, message: BroadcastMessage) -> Option<Notification> {
        let author = message.author();
        if author == Some(self.player_id.as_str()) {
            return None;
        }
        let key = (message.kind(), author.map(str::to_string), message.timestamp());
        if !self.seen.insert(key) {
            return None;
        }
        if matches!(message, BroadcastMessage::StrainChange(_)) {
            return None;
        }
        Some(Notification {
            message,
            dismiss_after: self.dismiss_after,
        })
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
