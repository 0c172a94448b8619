//! Core types for Streetwise: characters, attributes, skills, and talents.
//!
//! This crate defines the character data model that the rules engine reads
//! and the scene services persist. It is independent of the host runtime:
//! a [`Character`] can be built programmatically or imported from JSON via
//! [`transfer::import_character`].

/// Archetypes a character can be built from.
pub mod archetype;
/// The four attributes and their value block.
pub mod attribute;
/// The character sheet model.
pub mod character;
/// Cumulative condition stages and their dice penalty.
pub mod condition;
/// Error types used throughout the crate.
pub mod error;
/// The eleven skills and their value block.
pub mod skill;
/// Static talent definitions.
pub mod talent;
/// Versioned JSON import/export, including legacy migration.
pub mod transfer;

pub use archetype::Archetype;
pub use attribute::{Attribute, Attributes};
pub use character::Character;
pub use condition::{Condition, Conditions};
pub use error::{CoreError, CoreResult};
pub use skill::{Skill, Skills};
pub use talent::{TalentDefinition, TalentKind, TalentMechanics};
