use std::path::Path;

use sw_core::transfer::{export_character, export_file_name};

pub fn run(file: &Path, dir: &Path) -> Result<(), String> {
    let character = super::load_character(file)?;
    let json =
        export_character(&character).map_err(|e| format!("JSON serialization error: {e}"))?;

    let path = dir.join(export_file_name(&character));
    std::fs::write(&path, json).map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
    println!("  Exported {} to {}", character.name, path.display());
    Ok(())
}
