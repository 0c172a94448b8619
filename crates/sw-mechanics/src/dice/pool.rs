//! Dice pool construction and rolling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::roll::{DiceFaces, DiceRoll};
use super::{count_banes, count_successes, roll_dice};

/// Inputs to a roll as the sheet sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollParameters {
    /// Attribute rating (after any talent swap).
    pub attribute: u32,
    /// Skill rating, 0 for a raw attribute roll.
    pub skill: u32,
    /// Net situational modifier; may be negative.
    pub modifier: i32,
    /// Current scene strain, one strain die per point.
    pub strain_points: u32,
}

impl RollParameters {
    /// Parameters for an attribute plus skill roll with no modifier or strain.
    pub fn new(attribute: u32, skill: u32) -> Self {
        Self {
            attribute,
            skill,
            modifier: 0,
            strain_points: 0,
        }
    }

    /// Set the situational modifier.
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Set the scene strain.
    pub fn with_strain(mut self, strain_points: u32) -> Self {
        self.strain_points = strain_points;
        self
    }
}

/// The number of regular and strain dice to roll.
///
/// The regular pool never drops below one die, so no roll is impossible.
/// The strain pool has no floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    /// Regular dice (at least 1).
    pub regular: u32,
    /// Strain dice.
    pub strain: u32,
    /// Net modifier that went into the regular pool, kept for display.
    pub modifier: i32,
}

impl DicePool {
    /// A pool of `regular` and `strain` dice. `regular` is floored at 1.
    pub fn new(regular: u32, strain: u32) -> Self {
        Self {
            regular: regular.max(1),
            strain,
            modifier: 0,
        }
    }

    /// Size a pool from sheet values: attribute + skill + modifier, floored at 1.
    pub fn from_parameters(params: RollParameters) -> Self {
        let raw =
            i64::from(params.attribute) + i64::from(params.skill) + i64::from(params.modifier);
        let regular = u32::try_from(raw.max(1)).unwrap_or(u32::MAX);
        Self {
            regular,
            strain: params.strain_points,
            modifier: params.modifier,
        }
    }

    /// Total number of dice in both pools.
    pub fn count(&self) -> u32 {
        self.regular + self.strain
    }

    /// Roll both pools. The result may be pushed once.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let regular = roll_dice(rng, self.regular);
        let strain = roll_dice(rng, self.strain);

        let successes = count_successes(&regular) + count_successes(&strain);
        let regular_banes = count_banes(&regular);
        let strain_banes = count_banes(&strain);

        DiceRoll {
            regular_dice: self.regular,
            strain_dice: self.strain,
            modifier: self.modifier,
            results: DiceFaces { regular, strain },
            locked: None,
            successes,
            regular_banes,
            strain_banes,
            total_banes: regular_banes + strain_banes,
            breakdown: None,
            pushed: false,
            can_push: true,
            original_roll: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pool_from_parameters() {
        let pool = DicePool::from_parameters(
            RollParameters::new(3, 2).with_modifier(1).with_strain(2),
        );
        assert_eq!(pool.regular, 6);
        assert_eq!(pool.strain, 2);
        assert_eq!(pool.modifier, 1);
        assert_eq!(pool.count(), 8);
    }

    #[test]
    fn pool_floors_at_one() {
        let pool = DicePool::from_parameters(RollParameters::new(1, 0).with_modifier(-4));
        assert_eq!(pool.regular, 1);
        assert_eq!(DicePool::new(0, 0).regular, 1);
    }

    #[test]
    fn strain_pool_has_no_floor() {
        assert_eq!(DicePool::new(3, 0).strain, 0);
    }

    #[test]
    fn roll_sizes_match_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let roll = DicePool::new(4, 3).roll(&mut rng);
        assert_eq!(roll.results.regular.len(), 4);
        assert_eq!(roll.results.strain.len(), 3);
        assert!(!roll.pushed);
        assert!(roll.can_push);
        assert!(roll.locked.is_none());
    }

    #[test]
    fn roll_deterministic_with_seed() {
        let pool = DicePool::new(5, 2);
        let a = pool.roll(&mut StdRng::seed_from_u64(99));
        let b = pool.roll(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
