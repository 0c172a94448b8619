//! Static talent definitions from the Streetwise core rules.
//!
//! Characters store talents by name. A name only has a mechanical effect if
//! it keys into [`TALENTS`]; the rules engine reads the structured
//! [`TalentMechanics`] to decide how a talent changes a roll.

use std::fmt;

use serde::Serialize;

use crate::attribute::Attribute;
use crate::skill::Skill;

/// What kind of mechanic a talent provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TalentKind {
    /// Roll a skill with a different attribute.
    AttributeSwap,
    /// Push a roll twice instead of once.
    DoublePush,
    /// Add dice to a roll.
    RollModification,
    /// Ignore or reduce incoming conditions.
    DamageMitigation,
    /// Take a hit meant for someone else.
    DamageTransfer,
    /// Ask the GM a question.
    QuestionAbility,
    /// Remove conditions from another character.
    Healing,
    /// Declare a helpful contact.
    ContactSummon,
    /// Slip away automatically.
    AutoEscape,
    /// Grant an ally an extra action.
    AllyBenefit,
    /// Better initiative.
    InitiativeBonus,
    /// Defer a condition.
    ConditionDelay,
    /// Declare a story detail.
    NarrativeDeclaration,
    /// Anything else.
    Special,
}

impl TalentKind {
    /// Returns true if this kind changes dice pools or push limits.
    pub fn affects_rolls(self) -> bool {
        matches!(
            self,
            Self::AttributeSwap | Self::DoublePush | Self::RollModification
        )
    }
}

impl fmt::Display for TalentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AttributeSwap => "attribute-swap",
            Self::DoublePush => "double-push",
            Self::RollModification => "roll-modification",
            Self::DamageMitigation => "damage-mitigation",
            Self::DamageTransfer => "damage-transfer",
            Self::QuestionAbility => "question-ability",
            Self::Healing => "healing",
            Self::ContactSummon => "contact-summon",
            Self::AutoEscape => "auto-escape",
            Self::AllyBenefit => "ally-benefit",
            Self::InitiativeBonus => "initiative-bonus",
            Self::ConditionDelay => "condition-delay",
            Self::NarrativeDeclaration => "narrative-declaration",
            Self::Special => "special",
        };
        f.write_str(s)
    }
}

/// Structured mechanics of a talent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TalentMechanics {
    /// The mechanic kind.
    pub kind: TalentKind,
    /// Skill the talent applies to, if any.
    pub skill: Option<Skill>,
    /// Attribute the talent applies to (double-push) or replaces (swap).
    pub attribute_from: Option<Attribute>,
    /// Replacement attribute for swaps.
    pub attribute_to: Option<Attribute>,
    /// Fictional trigger.
    pub condition: Option<&'static str>,
    /// Extra rules text.
    pub details: Option<&'static str>,
}

impl TalentMechanics {
    const fn new(kind: TalentKind) -> Self {
        Self {
            kind,
            skill: None,
            attribute_from: None,
            attribute_to: None,
            condition: None,
            details: None,
        }
    }

    const fn skill(mut self, skill: Skill) -> Self {
        self.skill = Some(skill);
        self
    }

    const fn attribute(mut self, attribute: Attribute) -> Self {
        self.attribute_from = Some(attribute);
        self
    }

    const fn replaced_by(mut self, attribute: Attribute) -> Self {
        self.attribute_to = Some(attribute);
        self
    }

    const fn when(mut self, condition: &'static str) -> Self {
        self.condition = Some(condition);
        self
    }

    const fn details(mut self, details: &'static str) -> Self {
        self.details = Some(details);
        self
    }
}

/// A talent from the rulebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TalentDefinition {
    /// Talent name; the key characters store.
    pub name: &'static str,
    /// Flavour description.
    pub description: &'static str,
    /// Rules summary.
    pub effect: &'static str,
    /// Structured mechanics.
    pub mechanics: TalentMechanics,
}

const fn talent(
    name: &'static str,
    description: &'static str,
    effect: &'static str,
    mechanics: TalentMechanics,
) -> TalentDefinition {
    TalentDefinition {
        name,
        description,
        effect,
        mechanics,
    }
}

use Attribute::{Agility, Empathy, Strength, Wits};
use TalentKind::*;

/// Every talent in the core rules.
pub static TALENTS: &[TalentDefinition] = &[
    talent(
        "Fast Talk",
        "You are excellent at talking your way out of a tight spot.",
        "Use Wits instead of Empathy when persuading someone of your innocence.",
        TalentMechanics::new(AttributeSwap)
            .skill(Skill::Hoodwink)
            .attribute(Empathy)
            .replaced_by(Wits)
            .when("when persuading someone of your innocence"),
    ),
    talent(
        "Light Fingered",
        "Your fingers are quick and nimble, perfect for delicate work.",
        "Push Pinch rolls twice instead of once.",
        TalentMechanics::new(DoublePush)
            .skill(Skill::Pinch)
            .when("when executing particularly delicate pickpocketing, swiping or theft"),
    ),
    talent(
        "Stand Firm",
        "You can brace yourself against inanimate impacts.",
        "Ignore the first Condition from inanimate hits, or reduce multiple Conditions by 1.",
        TalentMechanics::new(DamageMitigation)
            .when("when you have time to brace yourself and are hit by something inanimate")
            .details("Ignore first Condition, or reduce number by 1 if multiple Conditions received"),
    ),
    talent(
        "Bodyguard",
        "You can throw yourself in front of allies to protect them.",
        "Roll Scramble to take a hit meant for an ally in Short range.",
        TalentMechanics::new(DamageTransfer)
            .skill(Skill::Scramble)
            .when("when someone in Short range is hit in close combat")
            .details("One or more Successes means you take the hit instead"),
    ),
    talent(
        "Grim Determination",
        "When you clench your jaw and dig deep, nothing can stop you.",
        "Push Strength-based rolls twice instead of once.",
        TalentMechanics::new(DoublePush)
            .attribute(Strength)
            .when("when reaching deep inside to succeed against the odds"),
    ),
    talent(
        "Vital Clue",
        "You have a knack for extracting maximum information from clues.",
        "Ask the GM one question about a clue after a successful Deduce check.",
        TalentMechanics::new(QuestionAbility)
            .skill(Skill::Deduce)
            .when("when you examine an interesting clue and succeed on Deduce")
            .details("Receive a truthful and useful answer"),
    ),
    talent(
        "Wrack Your Brains",
        "You can push your mental faculties to their limits.",
        "Push Wits-based rolls twice instead of once.",
        TalentMechanics::new(DoublePush)
            .attribute(Wits)
            .when("when straining mental faculties to think of a solution or dredge up a memory"),
    ),
    talent(
        "Poultice & Patience",
        "Given time and care, you can fully heal another character.",
        "Remove all Conditions from another character with at least an hour of work.",
        TalentMechanics::new(Healing)
            .skill(Skill::Physick)
            .when("when you have time to prepare and work carefully")
            .details("Takes at least an hour, cannot be used on yourself, must be outside combat, one recipient at a time"),
    ),
    talent(
        "Emergency Patch",
        "You can provide rapid healing in tense situations.",
        "Remove 1 Condition per Success when using Physick in a tense situation.",
        TalentMechanics::new(Healing)
            .skill(Skill::Physick)
            .when("in the midst of a tense situation")
            .details("Can only use once per scene"),
    ),
    talent(
        "I Know A Cove",
        "You always know someone who can help, for a price.",
        "Declare a contact who can help you when desperate.",
        TalentMechanics::new(ContactSummon)
            .when("when desperate for help")
            .details("GM must accept the contact but may determine what they want in return"),
    ),
    talent(
        "Gut Feeling",
        "You have a sixth sense for when trouble is brewing.",
        "Roll Notice using Empathy instead of Wits when detecting impending problems.",
        TalentMechanics::new(AttributeSwap)
            .skill(Skill::Notice)
            .attribute(Wits)
            .replaced_by(Empathy)
            .when("when trying to detect impending problems"),
    ),
    talent(
        "Gone In A Blink",
        "In your element, you can vanish without a trace.",
        "Automatically slip away unnoticed in your chosen urban setting.",
        TalentMechanics::new(AutoEscape)
            .when("when in your element in a chosen urban setting (sewers, crowds, rooftops, backalleys, etc.)")
            .details("Escape must be physically possible; setting must be clear and specific"),
    ),
    talent(
        "Watch the Hands",
        "You can create distractions that give allies openings.",
        "Award an extra fast action to an ally for one round.",
        TalentMechanics::new(AllyBenefit)
            .when("when you are the centre of attention")
            .details("Create compelling distraction for ally of your choice"),
    ),
    talent(
        "Up and at 'em",
        "You are extremely light on your feet and quick to react.",
        "Roll two dice for initiative and use the highest result.",
        TalentMechanics::new(InitiativeBonus)
            .when("when rolling initiative")
            .details("Roll two dice and use highest"),
    ),
    talent(
        "Block Out The Pain",
        "You can keep going when others would fall.",
        "Defer a Condition to next round, but take two Conditions when you do.",
        TalentMechanics::new(ConditionDelay)
            .when("when you have to keep going and can't afford to stop")
            .details("Defer taking a Condition to next round; add a second Condition when you do"),
    ),
    talent(
        "I Saw 'Em Do It",
        "You can declare helpful details about what you witnessed.",
        "Declare a story detail that might aid you after a successful Notice roll.",
        TalentMechanics::new(NarrativeDeclaration)
            .skill(Skill::Notice)
            .when("when trying to get a glimpse of hidden goings on and you succeed")
            .details("Can be a small to medium inanimate object or scene feature; GM may question or tweak"),
    ),
    talent(
        "Catch The Gist",
        "You can pick up on conversations by reading body language.",
        "Roll Notice using Agility instead of Wits when eavesdropping.",
        TalentMechanics::new(AttributeSwap)
            .skill(Skill::Notice)
            .attribute(Wits)
            .replaced_by(Agility)
            .when("when straining to hear a secret conversation"),
    ),
    talent(
        "I Read That Somewhere",
        "Your knowledge of books gives you an edge in deduction.",
        "Add +1 modification to Deduce rolls based on book knowledge.",
        TalentMechanics::new(RollModification)
            .skill(Skill::Deduce)
            .when("when trying to deduce connections by remembering something from books")
            .details("+1 modification to roll"),
    ),
    talent(
        "Lucky For You",
        "Fortune favors you in games of chance.",
        "Special ability related to gambling and games of chance.",
        TalentMechanics::new(Special)
            .when("in games of chance")
            .details("Details to be determined (mentioned in Card Twister archetype)"),
    ),
];

/// Find a talent by its exact name.
pub fn lookup(name: &str) -> Option<&'static TalentDefinition> {
    TALENTS.iter().find(|t| t.name == name)
}

/// Talents whose mechanics mention the given skill.
pub fn for_skill(skill: Skill) -> impl Iterator<Item = &'static TalentDefinition> {
    TALENTS
        .iter()
        .filter(move |t| t.mechanics.skill == Some(skill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert!(lookup("Fast Talk").is_some());
        assert!(lookup("fast talk").is_none());
        assert!(lookup("Nonexistent").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in TALENTS.iter().enumerate() {
            for b in &TALENTS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn swaps_name_both_attributes_and_a_skill() {
        for t in TALENTS.iter().filter(|t| t.mechanics.kind == AttributeSwap) {
            assert!(t.mechanics.skill.is_some(), "{}", t.name);
            assert!(t.mechanics.attribute_from.is_some(), "{}", t.name);
            assert!(t.mechanics.attribute_to.is_some(), "{}", t.name);
        }
    }

    #[test]
    fn swap_source_is_the_skill_attribute() {
        for t in TALENTS.iter().filter(|t| t.mechanics.kind == AttributeSwap) {
            let skill = t.mechanics.skill.unwrap();
            assert_eq!(t.mechanics.attribute_from, Some(skill.attribute()));
        }
    }

    #[test]
    fn notice_talents() {
        let names: Vec<_> = for_skill(Skill::Notice).map(|t| t.name).collect();
        assert_eq!(names, vec!["Gut Feeling", "I Saw 'Em Do It", "Catch The Gist"]);
    }

    #[test]
    fn roll_affecting_kinds() {
        assert!(DoublePush.affects_rolls());
        assert!(!Healing.affects_rolls());
        assert_eq!(AttributeSwap.to_string(), "attribute-swap");
    }
}
