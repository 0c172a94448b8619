use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sw_core::{Attribute, Skill};
use sw_mechanics::talents::{self, PoolBreakdown};

pub fn run(
    file: &Path,
    name: &str,
    attribute: bool,
    modifier: i32,
    assistance: u32,
) -> Result<(), String> {
    let character = super::load_character(file)?;

    let (label, breakdown) = if attribute {
        let attribute = Attribute::parse(name).map_err(|e| e.to_string())?;
        (
            attribute.to_string(),
            talents::attribute_pool(&character, attribute, modifier),
        )
    } else {
        let skill = Skill::parse(name).map_err(|e| e.to_string())?;
        let effect = talents::resolve(&character, skill);
        if !effect.is_empty() {
            println!("  {} {}", "Talents:".bold(), effect.description);
        }
        (
            skill.to_string(),
            talents::dice_pool(&character, skill, modifier),
        )
    };

    println!(
        "  {} rolls {} ({})",
        character.name.bold(),
        label,
        character.status().dimmed()
    );
    println!("{}", breakdown_table(&breakdown, assistance));

    let dice = breakdown.parameters(assistance, 0);
    let total = sw_mechanics::DicePool::from_parameters(dice).count();
    println!();
    println!("  {} regular dice", total.to_string().bold());
    Ok(())
}

fn breakdown_table(breakdown: &PoolBreakdown, assistance: u32) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Dice"]);
    table.add_row(vec![
        breakdown.effective_attribute.to_string(),
        breakdown.attribute.to_string(),
    ]);
    table.add_row(vec!["Skill".to_string(), breakdown.skill.to_string()]);
    if breakdown.modifier != 0 {
        table.add_row(vec!["Modifier".to_string(), format!("{:+}", breakdown.modifier)]);
    }
    if breakdown.talent_modifier != 0 {
        table.add_row(vec![
            "Talents".to_string(),
            format!("{:+}", breakdown.talent_modifier),
        ]);
    }
    if breakdown.condition_penalty > 0 {
        table.add_row(vec![
            "Conditions".to_string(),
            format!("-{}", breakdown.condition_penalty),
        ]);
    }
    if assistance > 0 {
        table.add_row(vec!["Assistance".to_string(), format!("+{assistance}")]);
    }
    table
}
