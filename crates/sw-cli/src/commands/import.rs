use std::path::Path;

use colored::Colorize;
use serde_json::Value;
use sw_core::transfer::{Document, export_character, import_character};

pub fn run(file: &Path, output: Option<&Path>) -> Result<(), String> {
    let text = super::read_file(file)?;
    let legacy = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|value| Document::detect(value).ok())
        .is_some_and(|doc| matches!(doc, Document::Legacy(_)));
    let character = import_character(&text).map_err(|e| super::report_import_error(&e))?;

    println!(
        "  {} {} ({}, {})",
        "Valid".green().bold(),
        character.name,
        character.archetype,
        character.status()
    );
    if legacy {
        println!("  Migrated from the legacy format");
    }

    if let Some(path) = output {
        let json = export_character(&character)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        std::fs::write(path, json)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Written to {}", path.display());
    }
    Ok(())
}
