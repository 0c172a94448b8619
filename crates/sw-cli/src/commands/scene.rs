use std::sync::Arc;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sw_core::{Archetype, Attribute, Character, Skill};
use sw_scene::host::{BroadcastBus, MemoryRoom, Player, Role};
use sw_scene::session::help;
use sw_scene::{
    BroadcastMessage, NotificationFilter, RollOutcome, RollRequest, RollSession, Scene,
    SceneConfig, SceneResult,
};

struct Seat {
    scene: Scene,
    character: Character,
    skill: Skill,
}

pub fn run(target: u32, turns: u32) -> Result<(), String> {
    if target == 0 {
        return Err("target must be at least 1".into());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("cannot start runtime: {e}"))?;
    runtime.block_on(play(target, turns)).map_err(|e| e.to_string())
}

fn nell() -> Character {
    Character::new("char_nell", "Nell", Archetype::ArtfulDodge)
        .with_attribute(Attribute::Agility, 4)
        .with_attribute(Attribute::Wits, 2)
        .with_skill(Skill::Pinch, 3)
        .with_talent("Light Fingered")
}

fn bert() -> Character {
    Character::new("char_bert", "Bert", Archetype::BrickyardPug)
        .with_attribute(Attribute::Strength, 4)
        .with_skill(Skill::Scrap, 2)
        .with_talent("Grim Determination")
}

async fn play(target: u32, turns: u32) -> SceneResult<()> {
    let config = SceneConfig::default();
    let room = MemoryRoom::new();
    let gm = Scene::new(
        Arc::new(room.join_unlisted(Player::new("gm", "GM", Role::GameMaster))),
        config.clone(),
    );
    let ann = room.join(Player::new("p1", "Ann", Role::Player)).await;
    let bob = room.join(Player::new("p2", "Bob", Role::Player)).await;
    let mut inbox = ann.subscribe(&config.channel).await;

    let seats = [
        Seat {
            scene: Scene::new(Arc::new(ann), config.clone()),
            character: nell(),
            skill: Skill::Pinch,
        },
        Seat {
            scene: Scene::new(Arc::new(bob), config.clone()),
            character: bert(),
            skill: Skill::Scrap,
        },
    ];
    for seat in &seats {
        seat.scene.characters().save(&seat.character).await?;
    }

    let challenge = gm
        .challenge()
        .start(target, Some("Lift the ledger from the counting house".into()))
        .await?;
    println!(
        "  {} {} {}",
        "Scene challenge".bold(),
        challenge.description.unwrap_or_default(),
        format!("(target {target})").dimmed()
    );

    let npc = gm.npcs().add("Peeler Sergeant").await?;
    for seat in &seats {
        let me = seat.scene.current_player().await?;
        seat.scene.initiative().draw(&me.id).await?;
    }
    gm.initiative().draw_for_npc(&npc.id).await?;
    print_initiative(&gm).await?;

    help(&seats[1].scene, "p1").await?;
    println!("  Bert is helping Nell");

    'turns: for turn in 1..=turns {
        if turn > 1 {
            gm.turns().start_new_turn().await?;
        }
        println!();
        println!("  {}", format!("Turn {turn}").bold().underline());
        for seat in &seats {
            let request = RollRequest::skill(&seat.character, seat.skill, 0);
            let mut session = RollSession::new(&seat.scene, request);
            let mut outcome = session.roll().await?;
            print_outcome(&seat.character.name, &outcome);
            while outcome.roll.successes == 0
                && session.can_push()
                && outcome.resolution().is_none()
            {
                outcome = session.push().await?;
                print_outcome(&seat.character.name, &outcome);
            }
            if let Some(resolution) = outcome.resolution() {
                println!();
                println!("  {}", resolution.to_string().green().bold());
                break 'turns;
            }
        }
    }

    println!();
    println!("  {}", "Notifications for Ann".bold().underline());
    let mut filter = NotificationFilter::new("p1", config.dismiss_delay);
    while let Ok(payload) = inbox.try_recv() {
        let notification = BroadcastMessage::decode(payload).and_then(|m| filter.accept(m));
        if let Some(notification) = notification {
            println!("    {}", notification.message);
        }
    }

    let snapshot = gm.snapshot().await?;
    println!();
    println!(
        "  Turn {}, strain {}, challenge {} successes / {} banes of {}",
        snapshot.turn_counter,
        snapshot.strain,
        snapshot.challenge.successes,
        snapshot.challenge.banes,
        snapshot.challenge.target
    );
    gm.challenge().end().await?;
    Ok(())
}

fn print_outcome(name: &str, outcome: &RollOutcome) {
    let verb = if outcome.roll.pushed { "pushes" } else { "rolls" };
    println!("  {name} {verb}: {}", outcome.roll);
    if outcome.assistance_used > 0 {
        println!("    with {} assistance", outcome.assistance_used);
    }
    if let Some(panic) = &outcome.panic {
        println!("    {}", panic.to_string().red().bold());
    }
    if outcome.roll.pushed {
        println!("    strain is now {}", outcome.strain);
    }
}

async fn print_initiative(gm: &Scene) -> SceneResult<()> {
    let names = gm.characters().character_names().await?;
    let mut order: Vec<(u32, String)> = Vec::new();
    for (id, name) in names {
        if let Some(value) = gm.initiative().value_of(&id).await? {
            order.push((value, name));
        }
    }
    for npc in gm.npcs().list().await? {
        if let Some(value) = npc.initiative {
            order.push((value, npc.name));
        }
    }
    order.sort();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Initiative", "Name"]);
    for (value, name) in order {
        table.add_row(vec![value.to_string(), name]);
    }
    println!("{table}");
    Ok(())
}
