//! Condition stages and the cumulative condition track.
//!
//! Harm in Streetwise climbs a fixed ladder: bruised, hurt, injured, broken.
//! A character can never hold a stage without every stage below it, so the
//! track is stored as a level (0-4) and rendered as the list of held stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One rung of the condition ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// First stage.
    Bruised,
    /// Second stage.
    Hurt,
    /// Third stage.
    Injured,
    /// Fourth and final stage.
    Broken,
}

impl Condition {
    /// All stages from lightest to worst.
    pub const LADDER: [Self; 4] = [Self::Bruised, Self::Hurt, Self::Injured, Self::Broken];

    /// The lowercase id used in JSON.
    pub fn id(self) -> &'static str {
        match self {
            Self::Bruised => "bruised",
            Self::Hurt => "hurt",
            Self::Injured => "injured",
            Self::Broken => "broken",
        }
    }

    /// Position on the ladder, starting at 1 for bruised.
    pub fn level(self) -> u8 {
        match self {
            Self::Bruised => 1,
            Self::Hurt => 2,
            Self::Injured => 3,
            Self::Broken => 4,
        }
    }

    /// Parse a stage from its id.
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "bruised" => Ok(Self::Bruised),
            "hurt" => Ok(Self::Hurt),
            "injured" => Ok(Self::Injured),
            "broken" => Ok(Self::Broken),
            _ => Err(CoreError::UnknownCondition(s.to_string())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bruised => write!(f, "Bruised"),
            Self::Hurt => write!(f, "Hurt"),
            Self::Injured => write!(f, "Injured"),
            Self::Broken => write!(f, "Broken"),
        }
    }
}

/// The set of condition stages a character currently holds.
///
/// Serializes as an ordered list of stage ids. Deserialization rejects any
/// list that is not a prefix of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct Conditions {
    level: u8,
}

impl Conditions {
    /// No conditions held.
    pub fn healthy() -> Self {
        Self::default()
    }

    /// Hold every stage up to `level` (clamped to 4).
    pub fn at_level(level: u8) -> Self {
        Self {
            level: level.min(4),
        }
    }

    /// Build from a list of stages, which must be a prefix of the ladder.
    pub fn from_stages(stages: &[Condition]) -> CoreResult<Self> {
        let expected = &Condition::LADDER[..stages.len().min(4)];
        if stages.len() > 4 || stages != expected {
            return Err(CoreError::NonCumulativeConditions(
                stages.iter().map(|c| c.id().to_string()).collect(),
            ));
        }
        Ok(Self {
            level: stages.len() as u8,
        })
    }

    /// Number of stages held (0-4).
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Dice removed from every pool: one per stage held.
    pub fn penalty(&self) -> u32 {
        u32::from(self.level)
    }

    /// The stages held, lightest first.
    pub fn stages(&self) -> &'static [Condition] {
        &Condition::LADDER[..usize::from(self.level)]
    }

    /// Returns true if the given stage is held.
    pub fn has(&self, condition: Condition) -> bool {
        condition.level() <= self.level
    }

    /// Returns true if no stage is held.
    pub fn is_healthy(&self) -> bool {
        self.level == 0
    }

    /// The worst stage held, if any.
    pub fn worst(&self) -> Option<Condition> {
        self.stages().last().copied()
    }

    /// Set the number of stages held, clamped to 0-4.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(4);
    }

    /// Toggle a stage the way the sheet checkbox does.
    ///
    /// Checking a stage also checks every lighter stage. Unchecking a held
    /// stage clears it and every worse stage.
    pub fn toggle(&mut self, condition: Condition) {
        if self.has(condition) {
            self.level = condition.level() - 1;
        } else {
            self.level = condition.level();
        }
    }

    /// Take one more stage of harm. Returns false if already broken.
    pub fn worsen(&mut self) -> bool {
        if self.level >= 4 {
            return false;
        }
        self.level += 1;
        true
    }

    /// Heal the worst stage. Returns false if already healthy.
    pub fn heal_one(&mut self) -> bool {
        if self.level == 0 {
            return false;
        }
        self.level -= 1;
        true
    }

    /// Status label shown on the sheet.
    pub fn label(&self) -> &'static str {
        match self.worst() {
            None => "Healthy",
            Some(Condition::Bruised) => "Bruised",
            Some(Condition::Hurt) => "Hurt",
            Some(Condition::Injured) => "Injured",
            Some(Condition::Broken) => "Broken",
        }
    }
}

impl TryFrom<Vec<Condition>> for Conditions {
    type Error = CoreError;

    fn try_from(stages: Vec<Condition>) -> CoreResult<Self> {
        Self::from_stages(&stages)
    }
}

impl From<Conditions> for Vec<Condition> {
    fn from(conditions: Conditions) -> Self {
        conditions.stages().to_vec()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_has_no_penalty() {
        let c = Conditions::healthy();
        assert_eq!(c.penalty(), 0);
        assert!(c.is_healthy());
        assert_eq!(c.label(), "Healthy");
        assert!(c.stages().is_empty());
    }

    #[test]
    fn stages_are_cumulative() {
        let c = Conditions::at_level(3);
        assert_eq!(
            c.stages(),
            &[Condition::Bruised, Condition::Hurt, Condition::Injured]
        );
        assert!(c.has(Condition::Bruised));
        assert!(!c.has(Condition::Broken));
        assert_eq!(c.penalty(), 3);
        assert_eq!(c.worst(), Some(Condition::Injured));
    }

    #[test]
    fn at_level_clamps() {
        assert_eq!(Conditions::at_level(9).level(), 4);
    }

    #[test]
    fn toggle_checks_lower_stages() {
        let mut c = Conditions::healthy();
        c.toggle(Condition::Injured);
        assert_eq!(c.level(), 3);
    }

    #[test]
    fn toggle_unchecks_higher_stages() {
        let mut c = Conditions::at_level(4);
        c.toggle(Condition::Hurt);
        assert_eq!(c.stages(), &[Condition::Bruised]);
    }

    #[test]
    fn worsen_and_heal() {
        let mut c = Conditions::at_level(3);
        assert!(c.worsen());
        assert!(!c.worsen());
        assert_eq!(c.label(), "Broken");
        assert!(c.heal_one());
        assert_eq!(c.level(), 3);

        let mut healthy = Conditions::healthy();
        assert!(!healthy.heal_one());
    }

    #[test]
    fn from_stages_rejects_gaps() {
        assert!(Conditions::from_stages(&[Condition::Bruised, Condition::Injured]).is_err());
        assert!(Conditions::from_stages(&[Condition::Hurt]).is_err());
        assert_eq!(
            Conditions::from_stages(&[Condition::Bruised, Condition::Hurt])
                .unwrap()
                .level(),
            2
        );
    }

    #[test]
    fn serde_as_stage_list() {
        let c = Conditions::at_level(2);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"["bruised","hurt"]"#);
        let back: Conditions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn serde_rejects_out_of_order() {
        let result: Result<Conditions, _> = serde_json::from_str(r#"["hurt","bruised"]"#);
        assert!(result.is_err());
    }
}
