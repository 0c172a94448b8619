//! Character import and export.
//!
//! Exports are versioned JSON documents (`schemaVersion` 1.0,
//! `schemaType` "streetwise-character") carrying the character fields in
//! camelCase. Imports accept that schema and the flat legacy format written
//! by the older character builder. An import runs in three steps:
//!
//! 1. [`Document::detect`] decides which shape the JSON has.
//! 2. Legacy documents are migrated into the current schema.
//! 3. The current-schema document is validated field by field; every problem
//!    is collected and returned together in [`ImportError::Invalid`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::archetype::Archetype;
use crate::attribute::{Attribute, MAX_RATING};
use crate::character::Character;
use crate::condition::{Condition, Conditions};
use crate::skill::Skill;

/// Schema version written on export and accepted on import.
pub const SCHEMA_VERSION: &str = "1.0";
/// Schema type tag written on export and accepted on import.
pub const SCHEMA_TYPE: &str = "streetwise-character";

/// Keys whose presence marks a document as the legacy flat format.
const LEGACY_MARKERS: [&str; 4] = [
    "attribute_strength",
    "skill_burgle",
    "firstname",
    "archetypeid",
];

/// Errors produced by [`import_character`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The input is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON does not describe a valid character.
    #[error("invalid character: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ImportError {
    /// Every human-readable problem found in the input.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Json(e) => vec![e.to_string()],
            Self::Invalid(errors) => errors.clone(),
        }
    }
}

/// A parsed import document, before validation.
#[derive(Debug, Clone)]
pub enum Document {
    /// The current versioned schema.
    Current(Value),
    /// The legacy flat format.
    Legacy(LegacyCharacter),
}

impl Document {
    /// Decide which format a JSON value is in.
    pub fn detect(value: Value) -> Result<Self, ImportError> {
        let is_legacy = value
            .as_object()
            .is_some_and(|obj| LEGACY_MARKERS.iter().any(|k| obj.contains_key(*k)));
        if is_legacy {
            Ok(Self::Legacy(serde_json::from_value(value)?))
        } else {
            Ok(Self::Current(value))
        }
    }

    /// Convert into a current-schema JSON value.
    pub fn into_current(self) -> Value {
        match self {
            Self::Current(value) => value,
            Self::Legacy(legacy) => legacy.migrate(),
        }
    }
}

/// The flat character format written by the older character builder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyCharacter {
    /// Character id, sometimes `#`-prefixed.
    pub id: Option<String>,
    /// First name.
    pub firstname: Option<String>,
    /// Last name.
    pub lastname: Option<String>,
    /// Nickname.
    pub nickname: Option<String>,
    /// Short archetype id ("dodge", "pug", ...).
    pub archetypeid: Option<String>,
    /// Archetype in the current kebab-case form, when present.
    pub archetype: Option<String>,
    /// Strength, number or numeric string.
    pub attribute_strength: Option<Value>,
    /// Agility.
    pub attribute_agility: Option<Value>,
    /// Wits.
    pub attribute_wits: Option<Value>,
    /// Empathy.
    pub attribute_empathy: Option<Value>,
    /// Burgle.
    pub skill_burgle: Option<Value>,
    /// Deduce.
    pub skill_deduce: Option<Value>,
    /// Hoodwink.
    pub skill_hoodwink: Option<Value>,
    /// Notice.
    pub skill_notice: Option<Value>,
    /// Physick.
    pub skill_physick: Option<Value>,
    /// Pinch.
    pub skill_pinch: Option<Value>,
    /// Scramble.
    pub skill_scramble: Option<Value>,
    /// Scrap.
    pub skill_scrap: Option<Value>,
    /// Sneak.
    pub skill_sneak: Option<Value>,
    /// Streetwise.
    pub skill_streetwise: Option<Value>,
    /// Tinker.
    pub skill_tinker: Option<Value>,
    /// First talent.
    pub talent1: Option<String>,
    /// Second talent.
    pub talent2: Option<String>,
    /// First secret, migrated into the backstory list.
    pub secret1: Option<String>,
    /// Second secret, migrated into the backstory list.
    pub secret2: Option<String>,
    /// First quirk.
    pub quirk1: Option<String>,
    /// Second quirk.
    pub quirk2: Option<String>,
    /// Free-text backstory, migrated into the extended notes.
    pub backstory: Option<String>,
    /// Backstory event.
    pub event1: Option<String>,
    /// Backstory event.
    pub event2: Option<String>,
    /// Backstory event.
    pub event3: Option<String>,
    /// Session notes.
    pub notes: Option<String>,
    /// Portrait URL.
    pub image: Option<String>,
}

impl LegacyCharacter {
    /// Migrate into a current-schema JSON document.
    pub fn migrate(&self) -> Value {
        let mut name = text(&self.firstname).to_string();
        let nickname = text(&self.nickname);
        if !nickname.is_empty() {
            name.push_str(&format!(" '{nickname}'"));
        }
        let lastname = text(&self.lastname);
        if !lastname.is_empty() {
            name.push_str(&format!(" {lastname}"));
        }
        let name = match name.trim() {
            "" => "Unnamed Character".to_string(),
            trimmed => trimmed.to_string(),
        };

        let archetype = self
            .archetype
            .as_deref()
            .and_then(|a| Archetype::parse(a).ok())
            .or_else(|| self.archetypeid.as_deref().and_then(Archetype::from_legacy_id))
            .unwrap_or_default();

        let mut attributes = Map::new();
        for (attribute, value) in [
            (Attribute::Strength, &self.attribute_strength),
            (Attribute::Agility, &self.attribute_agility),
            (Attribute::Wits, &self.attribute_wits),
            (Attribute::Empathy, &self.attribute_empathy),
        ] {
            attributes.insert(attribute.id().to_string(), json!(rating(value.as_ref())));
        }

        let mut skills = Map::new();
        for (skill, value) in [
            (Skill::Burgle, &self.skill_burgle),
            (Skill::Deduce, &self.skill_deduce),
            (Skill::Hoodwink, &self.skill_hoodwink),
            (Skill::Notice, &self.skill_notice),
            (Skill::Physick, &self.skill_physick),
            (Skill::Pinch, &self.skill_pinch),
            (Skill::Scramble, &self.skill_scramble),
            (Skill::Scrap, &self.skill_scrap),
            (Skill::Sneak, &self.skill_sneak),
            (Skill::Streetwise, &self.skill_streetwise),
            (Skill::Tinker, &self.skill_tinker),
        ] {
            skills.insert(skill.id().to_string(), json!(rating(value.as_ref())));
        }

        let talents = non_empty(&[&self.talent1, &self.talent2]);
        let quirks = non_empty(&[&self.quirk1, &self.quirk2]);
        let backstory = non_empty(&[
            &self.secret1,
            &self.secret2,
            &self.event1,
            &self.event2,
            &self.event3,
        ]);

        let id = match text(&self.id) {
            "" => format!("char_{}", Utc::now().timestamp_millis()),
            id => match id.strip_prefix('#') {
                Some(rest) => format!("char_{rest}"),
                None => id.to_string(),
            },
        };

        let mut doc = json!({
            "schemaVersion": SCHEMA_VERSION,
            "schemaType": SCHEMA_TYPE,
            "id": id,
            "name": name,
            "archetype": archetype.id(),
            "attributes": attributes,
            "skills": skills,
            "conditions": [],
            "talents": talents,
            "quirks": quirks,
            "backstory": backstory,
            "darkSecret": "",
            "possessions": "",
            "notes": text(&self.notes),
            "extendedNotes": text(&self.backstory),
        });
        let portrait = text(&self.image);
        if !portrait.is_empty() {
            doc["portrait"] = json!(portrait);
        }
        doc
    }
}

fn text(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

fn non_empty(fields: &[&Option<String>]) -> Vec<String> {
    fields
        .iter()
        .map(|f| text(f))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a legacy rating from a number or a numeric string, clamped to 0-10.
fn rating(value: Option<&Value>) -> u32 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0).floor(),
        Some(Value::String(s)) => leading_integer(s) as f64,
        _ => 0.0,
    };
    raw.clamp(0.0, f64::from(MAX_RATING)) as u32
}

/// Parse the leading integer of a string the way a lenient form field would.
fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// Check a current-schema document, collecting every problem found.
pub fn validate(value: &Value) -> Vec<String> {
    let Some(obj) = value.as_object() else {
        return vec!["Invalid JSON: not an object".to_string()];
    };
    let mut errors = Vec::new();

    if let Some(version) = present(obj, "schemaVersion") {
        if version.as_str() != Some(SCHEMA_VERSION) {
            errors.push(format!("Unsupported schema version: {}", display(version)));
        }
    }
    if let Some(kind) = present(obj, "schemaType") {
        if kind.as_str() != Some(SCHEMA_TYPE) {
            errors.push(format!("Invalid schema type: {}", display(kind)));
        }
    }

    if !obj.get("id").and_then(Value::as_str).is_some_and(|s| !s.is_empty()) {
        errors.push("Missing or invalid id".to_string());
    }
    if !obj.get("name").and_then(Value::as_str).is_some_and(|s| !s.is_empty()) {
        errors.push("Missing or invalid name".to_string());
    }
    let archetype = obj.get("archetype");
    if !archetype
        .and_then(Value::as_str)
        .is_some_and(|a| Archetype::parse(a).is_ok())
    {
        errors.push(format!(
            "Invalid archetype: {}",
            archetype.map(display).unwrap_or_else(|| "undefined".to_string())
        ));
    }

    match obj.get("attributes").and_then(Value::as_object) {
        None => errors.push("Missing or invalid attributes object".to_string()),
        Some(attrs) => {
            for attribute in Attribute::ALL {
                if !is_rating(attrs.get(attribute.id())) {
                    errors.push(format!("Invalid {}: must be integer 0-10", attribute.id()));
                }
            }
        }
    }

    match obj.get("skills").and_then(Value::as_object) {
        None => errors.push("Missing or invalid skills object".to_string()),
        Some(skills) => {
            for skill in Skill::ALL {
                if !is_rating(skills.get(skill.id())) {
                    errors.push(format!("Invalid skill {}: must be integer 0-10", skill.id()));
                }
            }
        }
    }

    match obj.get("conditions").and_then(Value::as_array) {
        None => errors.push("Invalid conditions: must be array".to_string()),
        Some(list) => validate_conditions(list, &mut errors),
    }

    if !obj.get("talents").is_some_and(Value::is_array) {
        errors.push("Invalid talents: must be array".to_string());
    }
    for key in ["quirks", "backstory"] {
        if present(obj, key).is_some_and(|v| !v.is_array()) {
            errors.push(format!("Invalid {key}: must be array"));
        }
    }
    for key in ["darkSecret", "possessions", "notes", "extendedNotes", "gender"] {
        if present(obj, key).is_some_and(|v| !v.is_string()) {
            errors.push(format!("Invalid {key}: must be string"));
        }
    }
    if present(obj, "portrait").is_some_and(|v| !v.is_string()) {
        errors.push("Invalid portrait: must be string (URL or data URI)".to_string());
    }
    if present(obj, "sleepDeprived").is_some_and(|v| !v.is_boolean()) {
        errors.push("Invalid sleepDeprived: must be boolean".to_string());
    }

    errors
}

fn validate_conditions(list: &[Value], errors: &mut Vec<String>) {
    if list.len() > 4 {
        errors.push("Invalid conditions: max 4 conditions".to_string());
    }
    let mut stages = Vec::with_capacity(list.len());
    for entry in list {
        match entry.as_str().map(Condition::parse) {
            Some(Ok(condition)) => stages.push(condition),
            _ => errors.push(format!("Invalid condition: {}", display(entry))),
        }
    }
    if stages.len() == list.len()
        && list.len() <= 4
        && Conditions::from_stages(&stages).is_err()
    {
        errors.push(
            "Invalid conditions: must be cumulative (bruised, hurt, injured, broken)".to_string(),
        );
    }
}

/// A field that is present and not null.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn is_rating(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_u64)
        .is_some_and(|n| n <= u64::from(MAX_RATING))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Import a character from JSON text in either supported format.
pub fn import_character(input: &str) -> Result<Character, ImportError> {
    let value: Value = serde_json::from_str(input)?;
    let doc = Document::detect(value)?.into_current();

    let errors = validate(&doc);
    if !errors.is_empty() {
        return Err(ImportError::Invalid(errors));
    }

    serde_json::from_value(doc).map_err(|e| ImportError::Invalid(vec![e.to_string()]))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    schema_version: &'static str,
    schema_type: &'static str,
    #[serde(flatten)]
    character: &'a Character,
}

/// Export a character as pretty-printed current-schema JSON.
pub fn export_character(character: &Character) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportDocument {
        schema_version: SCHEMA_VERSION,
        schema_type: SCHEMA_TYPE,
        character,
    })
}

/// A filesystem-friendly file name for an exported character.
pub fn export_file_name(character: &Character) -> String {
    let stem: String = character
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_character.json")
}
