//! Shared scene state for Streetwise.
//!
//! Every client in a room reads and writes one host-provided key/value store.
//! The services here (strain, assistance, initiative, NPCs, turns, and the
//! scene challenge) each own a slice of its keys and borrow a [`Scene`] for
//! host access. Multi-key changes go out as one merge, which the host applies
//! last-write-wins per key without cross-key atomicity; readers decode
//! through [`state`], which tolerates whatever a failed or racing write left.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sw_scene::host::{MemoryRoom, Player, Role};
//! use sw_scene::{Scene, SceneConfig};
//!
//! # async fn demo() -> sw_scene::SceneResult<()> {
//! let room = MemoryRoom::new();
//! let gm = room.join(Player::new("gm", "Gail", Role::GameMaster)).await;
//! let scene = Scene::new(Arc::new(gm), SceneConfig::default());
//! scene.initiative().start().await?;
//! # Ok(())
//! # }
//! ```

pub mod assistance;
pub mod challenge;
pub mod characters;
pub mod config;
pub mod error;
pub mod host;
pub mod initiative;
pub mod keys;
pub mod messages;
pub mod npcs;
pub mod scene;
pub mod session;
pub mod state;
pub mod strain;
pub mod tokens;
pub mod turns;

pub use config::SceneConfig;
pub use error::{HostError, HostResult, SceneError, SceneResult};
pub use keys::Keys;
pub use messages::{BroadcastMessage, Notification, NotificationFilter};
pub use scene::Scene;
pub use session::{RollOutcome, RollRequest, RollSession};
pub use state::{ChallengeResolution, SceneChallenge, SceneSnapshot, TurnActions};
