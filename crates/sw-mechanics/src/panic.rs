//! Scene strain accrual and the scene panic table.
//!
//! When a roll shows a bane on any strain die, the scene panics: roll a d6,
//! add the scene strain from before the push, and read the result off the
//! table. Some results raise strain by one more point.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::dice::{DiceRoll, roll_d6};

/// One row of the scene panic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanicEntry {
    /// Stable id for the row.
    pub id: &'static str,
    /// Lowest total that selects this row.
    pub min: u32,
    /// Highest total that selects this row; `None` is open-ended.
    pub max: Option<u32>,
    /// Table text read out to the table.
    pub effect: &'static str,
    /// Extra strain this result adds.
    pub strain_increase: u32,
}

impl PanicEntry {
    /// Returns true if `total` falls inside this row's inclusive range.
    pub fn contains(&self, total: u32) -> bool {
        total >= self.min && self.max.is_none_or(|max| total <= max)
    }
}

/// The scene panic table, ordered from calmest to worst.
pub struct ScenePanicTable;

impl ScenePanicTable {
    /// Table rows. Ranges are contiguous and non-overlapping from 1 upward.
    pub const ENTRIES: [PanicEntry; 5] = [
        PanicEntry {
            id: "keep-it-together",
            min: 1,
            max: Some(6),
            effect: "Keep it together. You manage to stay calm. No effect.",
            strain_increase: 0,
        },
        PanicEntry {
            id: "minor-complication",
            min: 7,
            max: Some(8),
            effect: "Minor complication. A guard is suspicious, the crowd is getting unsettled, you say the wrong thing.",
            strain_increase: 1,
        },
        PanicEntry {
            id: "major-complication",
            min: 9,
            max: Some(10),
            effect: "Major Complication. You have been spotted, your quarry vanishes in the crowd, you are proved to be lying.",
            strain_increase: 1,
        },
        PanicEntry {
            id: "escalation",
            min: 11,
            max: Some(12),
            effect: "Escalation. People are yelling for the Peelers, bruisers burst into the room, the alley is a dead end.",
            strain_increase: 1,
        },
        PanicEntry {
            id: "chaos",
            min: 13,
            max: None,
            effect: "Chaos. The Peelers arrive, a fight breaks out, a structure collapses, you are trapped.",
            strain_increase: 0,
        },
    ];

    /// The first row whose range contains `total`.
    ///
    /// A total of 0 cannot come from a d6 roll; it reads as the calmest row.
    pub fn lookup(total: u32) -> &'static PanicEntry {
        let entries = &Self::ENTRIES;
        entries
            .iter()
            .find(|entry| entry.contains(total))
            .unwrap_or(&entries[0])
    }
}

/// A triggered scene panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePanic {
    /// The panic d6.
    pub roll: u32,
    /// Panic d6 plus the strain it was rolled against.
    pub total: u32,
    /// The table row selected by `total`.
    pub entry: &'static PanicEntry,
}

impl ScenePanic {
    /// Resolve a known panic die against a strain value.
    pub fn resolve(panic_roll: u32, current_strain: u32) -> Self {
        let total = panic_roll + current_strain;
        Self {
            roll: panic_roll,
            total,
            entry: ScenePanicTable::lookup(total),
        }
    }

    /// Table text for the result.
    pub fn effect(&self) -> &'static str {
        self.entry.effect
    }

    /// Extra strain the result adds.
    pub fn strain_increase(&self) -> u32 {
        self.entry.strain_increase
    }
}

impl fmt::Display for ScenePanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCENE PANIC! Rolled {} + {} Strain = {}: {}",
            self.roll,
            self.total - self.roll,
            self.total,
            self.effect()
        )
    }
}

/// Check a roll for scene panic.
///
/// Panic triggers only when a strain die shows a bane. `current_strain` is
/// the scene strain from before the roll's banes were added.
pub fn check_scene_panic<R: Rng + ?Sized>(
    roll: &DiceRoll,
    current_strain: u32,
    rng: &mut R,
) -> Option<ScenePanic> {
    if roll.strain_banes == 0 {
        return None;
    }
    let panic = ScenePanic::resolve(roll_d6(rng), current_strain);
    tracing::info!(
        roll = panic.roll,
        total = panic.total,
        result = panic.entry.id,
        "scene panic"
    );
    Some(panic)
}

/// Scene strain after a pushed roll: every bane on the roll adds a point.
pub fn calculate_new_strain(current_strain: u32, roll: &DiceRoll) -> u32 {
    current_strain + roll.total_banes
}

/// Scene strain after any extra strain from a panic result.
pub fn apply_panic_strain(new_strain: u32, panic: Option<&ScenePanic>) -> u32 {
    new_strain + panic.map_or(0, ScenePanic::strain_increase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DicePool;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn table_partition() {
        let expected = [
            (1, "keep-it-together", 0),
            (6, "keep-it-together", 0),
            (7, "minor-complication", 1),
            (8, "minor-complication", 1),
            (9, "major-complication", 1),
            (10, "major-complication", 1),
            (11, "escalation", 1),
            (12, "escalation", 1),
            (13, "chaos", 0),
            (40, "chaos", 0),
        ];
        for (total, id, increase) in expected {
            let entry = ScenePanicTable::lookup(total);
            assert_eq!(entry.id, id, "total {total}");
            assert_eq!(entry.strain_increase, increase, "total {total}");
        }
    }

    #[test]
    fn ranges_are_contiguous() {
        let entries = ScenePanicTable::ENTRIES;
        assert_eq!(entries[0].min, 1);
        for pair in entries.windows(2) {
            assert_eq!(pair[0].max.map(|m| m + 1), Some(pair[1].min));
        }
        assert!(entries[4].max.is_none());
    }

    #[test]
    fn resolve_adds_strain() {
        let panic = ScenePanic::resolve(4, 5);
        assert_eq!(panic.total, 9);
        assert_eq!(panic.strain_increase(), 1);
        assert!(panic.effect().starts_with("Major Complication"));
    }

    #[test]
    fn no_panic_without_strain_banes() {
        let mut rng = StdRng::seed_from_u64(3);
        let roll = DicePool::new(3, 0).roll(&mut rng);
        assert!(check_scene_panic(&roll, 5, &mut rng).is_none());
    }

    #[test]
    fn panic_on_strain_bane() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut roll = DicePool::new(1, 1).roll(&mut rng);
        roll.results.strain = vec![1];
        roll.strain_banes = 1;
        let panic = check_scene_panic(&roll, 2, &mut rng).unwrap();
        assert!((3..=8).contains(&panic.total));
        assert_eq!(panic.total, panic.roll + 2);
    }

    #[test]
    fn strain_accrual() {
        let mut roll = DicePool::new(2, 0).roll(&mut StdRng::seed_from_u64(1));
        roll.total_banes = 3;
        assert_eq!(calculate_new_strain(2, &roll), 5);
        let panic = ScenePanic::resolve(6, 2);
        assert_eq!(apply_panic_strain(5, Some(&panic)), 6);
        assert_eq!(apply_panic_strain(5, None), 5);
    }

    #[test]
    fn display() {
        let panic = ScenePanic::resolve(3, 1);
        assert_eq!(
            panic.to_string(),
            "SCENE PANIC! Rolled 3 + 1 Strain = 4: Keep it together. You manage to stay calm. No effect."
        );
    }
}
