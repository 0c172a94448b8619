//! Roll results and pushing.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{count_banes, is_locked_face, roll_d6, BANE, SUCCESS};
use crate::error::{MechError, MechResult};

/// Face values for both pools, in roll order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceFaces {
    /// Regular dice faces.
    pub regular: Vec<u32>,
    /// Strain dice faces.
    pub strain: Vec<u32>,
}

/// Which dice kept their face on a push (true) and which were rerolled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockMask {
    /// Lock flags for the regular dice.
    pub regular: Vec<bool>,
    /// Lock flags for the strain dice.
    pub strain: Vec<bool>,
}

/// How a pushed roll's totals split between the earlier roll and the reroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBreakdown {
    /// Successes carried over from the roll that was pushed.
    pub original_successes: u32,
    /// Successes on the rerolled dice.
    pub pushed_successes: u32,
    /// Banes carried over from the roll that was pushed.
    pub original_banes: u32,
    /// Banes on the rerolled dice.
    pub pushed_banes: u32,
}

/// A rolled dice pool.
///
/// Rolls are values: pushing produces a new roll that keeps the earlier one
/// in [`original_roll`](Self::original_roll).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    /// Number of regular dice.
    pub regular_dice: u32,
    /// Number of strain dice.
    pub strain_dice: u32,
    /// Net modifier that sized the regular pool.
    pub modifier: i32,
    /// Face values.
    pub results: DiceFaces,
    /// Lock mask, present on pushed rolls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<LockMask>,
    /// Sixes across both pools.
    pub successes: u32,
    /// Ones on the regular dice.
    pub regular_banes: u32,
    /// Ones on the strain dice; any of these trigger scene panic.
    pub strain_banes: u32,
    /// Banes that feed scene strain.
    pub total_banes: u32,
    /// Split of the totals, present on pushed rolls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<PushBreakdown>,
    /// Whether this roll is the result of a push.
    pub pushed: bool,
    /// Whether this roll may still be pushed.
    pub can_push: bool,
    /// The roll this one was pushed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_roll: Option<Box<DiceRoll>>,
}

impl DiceRoll {
    /// Push the roll: reroll every die not showing a 1 or a 6.
    ///
    /// Successes and total banes are the earlier totals plus whatever the
    /// rerolled dice show, so a push never loses successes. Per-pool banes
    /// are counted on the final faces. The result can be pushed again only
    /// when `can_push_twice` is set and this is the first push.
    pub fn push<R: Rng + ?Sized>(&self, can_push_twice: bool, rng: &mut R) -> MechResult<Self> {
        if !self.can_push {
            return Err(MechError::NotPushable);
        }

        let (regular, regular_locks) = reroll_unlocked(&self.results.regular, rng);
        let (strain, strain_locks) = reroll_unlocked(&self.results.strain, rng);

        let pushed_successes = count_rerolled(&regular, &regular_locks, SUCCESS)
            + count_rerolled(&strain, &strain_locks, SUCCESS);
        let pushed_banes = count_rerolled(&regular, &regular_locks, BANE)
            + count_rerolled(&strain, &strain_locks, BANE);

        let times_pushed = self.times_pushed() + 1;
        let regular_banes = count_banes(&regular);
        let strain_banes = count_banes(&strain);

        tracing::debug!(
            times_pushed,
            pushed_successes,
            pushed_banes,
            "pushed roll"
        );

        Ok(Self {
            regular_dice: self.regular_dice,
            strain_dice: self.strain_dice,
            modifier: self.modifier,
            results: DiceFaces { regular, strain },
            locked: Some(LockMask {
                regular: regular_locks,
                strain: strain_locks,
            }),
            successes: self.successes + pushed_successes,
            regular_banes,
            strain_banes,
            total_banes: self.total_banes + pushed_banes,
            breakdown: Some(PushBreakdown {
                original_successes: self.successes,
                pushed_successes,
                original_banes: self.total_banes,
                pushed_banes,
            }),
            pushed: true,
            can_push: can_push_twice && times_pushed < 2,
            original_roll: Some(Box::new(self.clone())),
        })
    }

    /// How many times this roll has been pushed.
    pub fn times_pushed(&self) -> u32 {
        if !self.pushed {
            return 0;
        }
        self.original_roll
            .as_ref()
            .map_or(1, |original| original.times_pushed() + 1)
    }

    /// Returns true if at least one die would be rerolled by a push.
    pub fn has_pushable_dice(&self) -> bool {
        self.results
            .regular
            .iter()
            .chain(&self.results.strain)
            .any(|&face| !is_locked_face(face))
    }

    /// Successes added by the most recent push, or all successes if unpushed.
    pub fn new_successes(&self) -> u32 {
        self.breakdown.map_or(self.successes, |b| b.pushed_successes)
    }

    /// Banes added by the most recent push, or all banes if unpushed.
    pub fn new_banes(&self) -> u32 {
        self.breakdown.map_or(self.total_banes, |b| b.pushed_banes)
    }
}

fn reroll_unlocked<R: Rng + ?Sized>(faces: &[u32], rng: &mut R) -> (Vec<u32>, Vec<bool>) {
    faces
        .iter()
        .map(|&face| {
            if is_locked_face(face) {
                (face, true)
            } else {
                (roll_d6(rng), false)
            }
        })
        .unzip()
}

fn count_rerolled(faces: &[u32], locks: &[bool], value: u32) -> u32 {
    faces
        .iter()
        .zip(locks)
        .filter(|&(&face, &locked)| !locked && face == value)
        .count() as u32
}

fn plural(n: u32, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pool: {} regular", self.regular_dice)?;
        if self.strain_dice > 0 {
            write!(f, " + {} strain", self.strain_dice)?;
        }
        if self.modifier != 0 {
            write!(f, " (mod: {:+})", self.modifier)?;
        }
        write!(f, " -> {}", plural(self.successes, "success", "successes"))?;
        if self.total_banes > 0 {
            write!(f, ", {}", plural(self.total_banes, "bane", "banes"))?;
        }
        if self.pushed {
            write!(f, " (PUSHED)")?;
        }
        Ok(())
    }
}
