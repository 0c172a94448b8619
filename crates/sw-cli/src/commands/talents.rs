use comfy_table::{ContentArrangement, Table};
use sw_core::Skill;
use sw_core::talent::TALENTS;
use sw_mechanics::talents::talents_for_skill;

pub fn run(skill: Option<&str>) -> Result<(), String> {
    let skill = skill
        .map(Skill::parse)
        .transpose()
        .map_err(|e| e.to_string())?;
    let rolling = skill.map(talents_for_skill).unwrap_or_default();

    let selected: Vec<_> = TALENTS
        .iter()
        .filter(|t| match skill {
            Some(skill) => t.mechanics.skill == Some(skill) || rolling.contains(&t.name),
            None => true,
        })
        .collect();

    if selected.is_empty() {
        println!("  No talents found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Applies to", "Effect"]);
    for talent in &selected {
        let m = &talent.mechanics;
        let applies = match (m.skill, m.attribute_from) {
            (Some(skill), _) => skill.to_string(),
            (None, Some(attribute)) => attribute.to_string(),
            (None, None) => "-".to_string(),
        };
        table.add_row(vec![
            talent.name.to_string(),
            m.kind.to_string(),
            applies,
            talent.effect.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} talents", selected.len());
    Ok(())
}
