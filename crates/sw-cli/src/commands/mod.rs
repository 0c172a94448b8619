pub mod d66;
pub mod export;
pub mod import;
pub mod panic;
pub mod pool;
pub mod roll;
pub mod scene;
pub mod talents;

use std::path::Path;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sw_core::Character;
use sw_core::transfer::{ImportError, import_character};

/// A seeded RNG when `seed` is given, the thread RNG otherwise.
fn rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    }
}

/// Read and import a character file, printing every validation error.
fn load_character(path: &Path) -> Result<Character, String> {
    let text = read_file(path)?;
    import_character(&text).map_err(|e| report_import_error(&e))
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn report_import_error(error: &ImportError) -> String {
    let messages = error.messages();
    for message in &messages {
        eprintln!("  - {message}");
    }
    format!(
        "import failed with {} error{}",
        messages.len(),
        if messages.len() == 1 { "" } else { "s" }
    )
}
