use colored::Colorize;
use serde_json::{Value, json};
use sw_mechanics::dice::{BANE, SUCCESS};
use sw_mechanics::panic::{apply_panic_strain, calculate_new_strain, check_scene_panic};
use sw_mechanics::{DicePool, DiceRoll, RollParameters};

pub struct Options {
    pub attribute: u32,
    pub skill: u32,
    pub modifier: i32,
    pub strain: u32,
    pub pushes: u32,
    pub json: bool,
}

pub fn run(options: Options, seed: Option<u64>) -> Result<(), String> {
    let mut rng = super::rng(seed);
    let params = RollParameters::new(options.attribute, options.skill)
        .with_modifier(options.modifier)
        .with_strain(options.strain);
    let mut roll = DicePool::from_parameters(params).roll(rng.as_mut());
    if !options.json {
        print_roll("Roll", &roll);
    }

    let can_push_twice = options.pushes > 1;
    for n in 0..options.pushes {
        roll = roll
            .push(can_push_twice, rng.as_mut())
            .map_err(|e| e.to_string())?;
        if !options.json {
            print_roll(if n == 0 { "Push" } else { "Second push" }, &roll);
        }
    }

    let outcome = roll.pushed.then(|| {
        let panic = check_scene_panic(&roll, options.strain, rng.as_mut());
        let after = calculate_new_strain(options.strain, &roll);
        (panic, apply_panic_strain(after, panic.as_ref()))
    });

    if options.json {
        let mut value = serde_json::to_value(&roll)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        if let Some((panic, strain)) = outcome {
            value["scenePanic"] = panic.map_or(Value::Null, |p| {
                json!({
                    "roll": p.roll,
                    "total": p.total,
                    "effect": p.effect(),
                    "strainIncrease": p.strain_increase(),
                })
            });
            value["strain"] = json!({ "before": options.strain, "after": strain });
        }
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    if let Some((panic, strain)) = outcome {
        if let Some(panic) = panic {
            println!();
            println!("  {}", panic.to_string().red().bold());
        }
        println!("  Strain: {} -> {}", options.strain, strain.to_string().bold());
    }

    Ok(())
}

fn print_roll(label: &str, roll: &DiceRoll) {
    println!("  {}  {}", label.bold(), roll);
    println!("    regular: {}", faces(&roll.results.regular));
    if !roll.results.strain.is_empty() {
        println!("    strain:  {}", faces(&roll.results.strain));
    }
}

fn faces(values: &[u32]) -> String {
    values
        .iter()
        .map(|&face| match face {
            SUCCESS => face.to_string().green().bold().to_string(),
            BANE => face.to_string().red().to_string(),
            _ => face.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
