//! Streetwise rules engine.
//!
//! Provides the dice pool roller with pushes and locked dice, scene strain
//! accrual, the scene panic table, the d66 roller, and the talent effects
//! resolver that turns a character sheet into a dice pool for a skill.

pub mod d66;
pub mod dice;
pub mod error;
pub mod panic;
pub mod talents;

pub use d66::{D66, roll_d66};
pub use dice::{DicePool, DiceRoll, RollParameters};
pub use error::{MechError, MechResult};
pub use panic::{PanicEntry, ScenePanic, ScenePanicTable};
pub use talents::{PoolBreakdown, TalentEffect};
