use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sw_mechanics::dice::roll_d6;
use sw_mechanics::{ScenePanic, ScenePanicTable};

pub fn run(strain: u32, roll: Option<u32>, seed: Option<u64>) -> Result<(), String> {
    let roll = match roll {
        Some(value @ 1..=6) => value,
        Some(value) => return Err(format!("a d6 shows 1 to 6, not {value}")),
        None => roll_d6(super::rng(seed).as_mut()),
    };
    let panic = ScenePanic::resolve(roll, strain);

    println!("  {}", panic.to_string().red().bold());
    if panic.strain_increase() > 0 {
        println!("  Strain +{}", panic.strain_increase());
    }
    Ok(())
}

pub fn table() {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Total", "Result", "Strain", "Effect"]);
    for entry in ScenePanicTable::ENTRIES {
        let range = match entry.max {
            Some(max) => format!("{}-{max}", entry.min),
            None => format!("{}+", entry.min),
        };
        table.add_row(vec![
            range,
            entry.id.to_string(),
            format!("+{}", entry.strain_increase),
            entry.effect.to_string(),
        ]);
    }
    println!("{table}");
}
