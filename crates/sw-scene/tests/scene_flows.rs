//! Scene services driven end to end over the in-memory host.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sw_core::{Archetype, Attribute, Character, Skill};
use sw_mechanics::MechError;
use sw_scene::host::{BroadcastBus, ItemKind, MemoryHost, MemoryRoom, Player, Role, SceneItem};
use sw_scene::session::{help, withdraw_help};
use sw_scene::state::update;
use sw_scene::{
    BroadcastMessage, ChallengeResolution, NotificationFilter, RollRequest, RollSession, Scene,
    SceneConfig, SceneError, TurnActions,
};

struct Table {
    room: MemoryRoom,
    gm: Scene,
    ann: Scene,
    bo: Scene,
    ann_host: MemoryHost,
}

fn scene(host: MemoryHost) -> Scene {
    Scene::new(Arc::new(host), SceneConfig::default())
}

/// A room with an unlisted GM and two listed players.
async fn table() -> Table {
    let room = MemoryRoom::new();
    let gm = room.join_unlisted(Player::new("gm", "Gail", Role::GameMaster));
    let ann = room.join(Player::new("ann", "Ann", Role::Player)).await;
    let bo = room.join(Player::new("bo", "Bo", Role::Player)).await;
    Table {
        room,
        gm: scene(gm),
        ann: scene(ann.clone()),
        bo: scene(bo),
        ann_host: ann,
    }
}

fn nell() -> Character {
    Character::new("c-nell", "Nell", Archetype::ArtfulDodge)
        .with_attribute(Attribute::Agility, 3)
        .with_skill(Skill::Pinch, 2)
}

// Initiative

#[tokio::test]
async fn start_fills_pool_and_clears_assignments() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    t.ann.initiative().draw("ann").await.unwrap().unwrap();

    t.gm.initiative().start().await.unwrap();
    let round = t.gm.initiative().round().await.unwrap();
    assert!(round.active);
    assert_eq!(round.pool, (1..=10).collect::<Vec<_>>());
    assert_eq!(t.gm.initiative().value_of("ann").await.unwrap(), None);
    assert_eq!(t.gm.turns().turn_counter().await.unwrap(), 1);
}

#[tokio::test]
async fn draw_from_empty_pool_returns_none() {
    let t = table().await;
    assert_eq!(t.ann.initiative().draw("ann").await.unwrap(), None);
    assert!(!t.ann.initiative().has_drawn("ann").await.unwrap());
}

#[tokio::test]
async fn draws_are_unique_and_leave_the_pool() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let npc = t.gm.npcs().add("Peeler").await.unwrap();

    let mut drawn = HashSet::new();
    drawn.insert(t.gm.initiative().draw("gm").await.unwrap().unwrap());
    drawn.insert(t.ann.initiative().draw("ann").await.unwrap().unwrap());
    drawn.insert(t.bo.initiative().draw("bo").await.unwrap().unwrap());
    drawn.insert(t.gm.initiative().draw_for_npc(&npc.id).await.unwrap().unwrap());
    assert_eq!(drawn.len(), 4);

    let pool = t.gm.initiative().round().await.unwrap().pool;
    assert_eq!(pool.len(), 6);
    assert!(pool.iter().all(|v| !drawn.contains(v)));

    let stored = t.gm.npcs().get(&npc.id).await.unwrap().unwrap();
    assert!(stored.initiative.is_some_and(|v| drawn.contains(&v)));
}

#[tokio::test]
async fn drawing_twice_keeps_the_first_value() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let npc = t.gm.npcs().add("Peeler").await.unwrap();

    let first = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    assert_eq!(t.ann.initiative().draw("ann").await.unwrap(), Some(first));
    let npc_first = t.gm.initiative().draw_for_npc(&npc.id).await.unwrap().unwrap();
    assert_eq!(
        t.gm.initiative().draw_for_npc(&npc.id).await.unwrap(),
        Some(npc_first)
    );

    let pool = t.gm.initiative().round().await.unwrap().pool;
    assert_eq!(pool.len(), 8);
    assert!(!pool.contains(&first));
    assert_eq!(t.gm.initiative().value_of("ann").await.unwrap(), Some(first));
}

#[tokio::test]
async fn drawing_for_unknown_npc_leaves_the_pool() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    assert!(matches!(
        t.gm.initiative().draw_for_npc("npc_missing").await,
        Err(SceneError::NpcNotFound(_))
    ));
    let pool = t.gm.initiative().round().await.unwrap().pool;
    assert_eq!(pool, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn swap_exchanges_values_without_touching_pool() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let a = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    let b = t.bo.initiative().draw("bo").await.unwrap().unwrap();
    let pool_before = t.ann.initiative().round().await.unwrap().pool;

    assert!(t.ann.initiative().swap("ann", "bo").await.unwrap());
    assert_eq!(t.ann.initiative().value_of("ann").await.unwrap(), Some(b));
    assert_eq!(t.ann.initiative().value_of("bo").await.unwrap(), Some(a));
    assert_eq!(t.ann.initiative().round().await.unwrap().pool, pool_before);
}

#[tokio::test]
async fn swap_with_undrawn_side_does_nothing() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let a = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    assert!(!t.ann.initiative().swap("ann", "bo").await.unwrap());
    assert_eq!(t.ann.initiative().value_of("ann").await.unwrap(), Some(a));
}

#[tokio::test]
async fn swap_with_npc() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let npc = t.gm.npcs().add("Peeler").await.unwrap();
    let mine = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    let theirs = t.gm.initiative().draw_for_npc(&npc.id).await.unwrap().unwrap();

    assert!(t.ann.initiative().swap("ann", &npc.id).await.unwrap());
    assert_eq!(t.ann.initiative().value_of("ann").await.unwrap(), Some(theirs));
    assert_eq!(t.ann.initiative().value_of(&npc.id).await.unwrap(), Some(mine));
}

#[tokio::test]
async fn swap_candidates_are_strictly_higher() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let mine = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    let bo = t.bo.initiative().draw("bo").await.unwrap().unwrap();
    let gm = t.gm.initiative().draw("gm").await.unwrap().unwrap();

    let candidates = t.ann.initiative().swap_candidates("ann").await.unwrap();
    let expected = [bo, gm].iter().filter(|&&v| v > mine).count();
    assert_eq!(candidates.len(), expected);
    assert!(candidates.iter().all(|(id, v)| id != "ann" && *v > mine));
    assert!(candidates.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[tokio::test]
async fn reset_one_returns_value_sorted() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let value = t.ann.initiative().draw("ann").await.unwrap().unwrap();

    let refused = t.bo.initiative().reset_one("ann").await;
    assert!(matches!(refused, Err(SceneError::NotGameMaster(_))));

    t.gm.initiative().reset_one("ann").await.unwrap();
    let pool = t.gm.initiative().round().await.unwrap().pool;
    assert_eq!(pool, (1..=10).collect::<Vec<_>>());
    assert!(pool.contains(&value));
    assert_eq!(t.gm.initiative().value_of("ann").await.unwrap(), None);
}

#[tokio::test]
async fn end_keeps_drawn_values() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let value = t.ann.initiative().draw("ann").await.unwrap().unwrap();
    t.gm.initiative().end().await.unwrap();
    assert!(!t.ann.initiative().round().await.unwrap().active);
    assert_eq!(t.ann.initiative().value_of("ann").await.unwrap(), Some(value));
}

#[tokio::test]
async fn players_cannot_start_rounds() {
    let t = table().await;
    let result = t.ann.initiative().start().await;
    assert!(matches!(result, Err(SceneError::NotGameMaster(_))));
    assert!(t.room.metadata().await.is_empty());
}

// NPCs

#[tokio::test]
async fn removing_npc_returns_its_value() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let npc = t.gm.npcs().add("Peeler").await.unwrap();
    assert!(npc.id.starts_with("npc_"));
    t.gm.initiative().draw_for_npc(&npc.id).await.unwrap().unwrap();

    let removed = t.gm.npcs().remove(&npc.id).await.unwrap();
    assert_eq!(removed.name, "Peeler");
    assert!(t.gm.npcs().list().await.unwrap().is_empty());
    let pool = t.gm.initiative().round().await.unwrap().pool;
    assert_eq!(pool, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn npc_changes_are_gm_only() {
    let t = table().await;
    assert!(matches!(
        t.ann.npcs().add("Peeler").await,
        Err(SceneError::NotGameMaster(_))
    ));
    assert!(matches!(
        t.gm.npcs().remove("npc_missing").await,
        Err(SceneError::NpcNotFound(_))
    ));
    assert!(matches!(
        t.gm.npcs().update_initiative("npc_missing", Some(3)).await,
        Err(SceneError::NpcNotFound(_))
    ));
}

#[tokio::test]
async fn npc_updates_and_clear() {
    let t = table().await;
    let npc = t.gm.npcs().add("Peeler").await.unwrap();
    t.gm.npcs().add("Crusher").await.unwrap();

    let updated = t.gm.npcs().update_initiative(&npc.id, Some(4)).await.unwrap();
    assert_eq!(updated.initiative, Some(4));
    let actions = TurnActions {
        quick: [true, false],
        slow: false,
    };
    t.gm.npcs().update_turn_actions(&npc.id, actions).await.unwrap();
    assert_eq!(
        t.gm.npcs().get(&npc.id).await.unwrap().unwrap().turn_actions,
        actions
    );

    t.gm.npcs().clear().await.unwrap();
    assert!(t.gm.npcs().list().await.unwrap().is_empty());
}

// Turns

#[tokio::test]
async fn new_turn_clears_everyone_in_one_write() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    let npc = t.gm.npcs().add("Peeler").await.unwrap();
    let used = TurnActions {
        quick: [true, true],
        slow: false,
    };
    t.ann.turns().set_actions("ann", used).await.unwrap();
    t.gm.turns().set_actions("gm", used).await.unwrap();
    t.gm.turns().set_actions(&npc.id, used).await.unwrap();

    let turn = t.gm.turns().start_new_turn().await.unwrap();
    assert_eq!(turn, 2);

    assert_eq!(t.ann.turns().actions("ann").await.unwrap(), TurnActions::default());
    assert_eq!(t.gm.turns().actions("gm").await.unwrap(), TurnActions::default());
    let stored = t.gm.npcs().get(&npc.id).await.unwrap().unwrap();
    assert_eq!(stored.turn_actions, TurnActions::default());
}

#[tokio::test]
async fn new_turn_counts_from_zero_when_unset() {
    let t = table().await;
    assert_eq!(t.gm.turns().start_new_turn().await.unwrap(), 1);
    t.gm.turns().reset_counter().await.unwrap();
    assert_eq!(t.gm.turns().turn_counter().await.unwrap(), 0);
}

#[tokio::test]
async fn players_only_set_their_own_actions() {
    let t = table().await;
    let result = t.ann.turns().set_actions("bo", TurnActions::default()).await;
    assert!(matches!(result, Err(SceneError::NotOwner { .. })));
    assert!(matches!(
        t.ann.turns().start_new_turn().await,
        Err(SceneError::NotGameMaster(_))
    ));
}

#[tokio::test]
async fn turn_actions_over_budget_are_rejected() {
    let t = table().await;
    let npc = t.gm.npcs().add("Peeler").await.unwrap();
    let everything = TurnActions {
        quick: [true, true],
        slow: true,
    };
    assert!(matches!(
        t.ann.turns().set_actions("ann", everything).await,
        Err(SceneError::ActionBudgetExceeded { used: 3, .. })
    ));
    assert!(matches!(
        t.gm.npcs().update_turn_actions(&npc.id, everything).await,
        Err(SceneError::ActionBudgetExceeded { .. })
    ));
    assert!(matches!(
        t.gm.turns().set_actions(&npc.id, everything).await,
        Err(SceneError::ActionBudgetExceeded { .. })
    ));
    assert_eq!(t.ann.turns().actions("ann").await.unwrap(), TurnActions::default());
    let stored = t.gm.npcs().get(&npc.id).await.unwrap().unwrap();
    assert_eq!(stored.turn_actions, TurnActions::default());
}

// Scene challenge

#[tokio::test]
async fn starting_a_challenge_starts_a_new_scene() {
    let t = table().await;
    t.gm.initiative().start().await.unwrap();
    t.ann.initiative().draw("ann").await.unwrap().unwrap();
    t.gm.npcs().add("Peeler").await.unwrap();
    t.gm.turns().start_new_turn().await.unwrap();
    t.gm.strain().set(4).await.unwrap();

    let challenge = t
        .gm
        .challenge()
        .start(6, Some("Escape the rookery".to_string()))
        .await
        .unwrap();
    assert!(challenge.active);

    let snap = t.ann.snapshot().await.unwrap();
    assert_eq!(snap.strain, 0);
    assert_eq!(snap.initiative, None);
    assert_eq!(snap.round.pool, (1..=10).collect::<Vec<_>>());
    assert!(snap.round.active);
    assert!(snap.npcs.is_empty());
    assert_eq!(snap.turn_counter, 1);
    assert_eq!(snap.challenge.target, 6);
    assert_eq!(snap.challenge.description.as_deref(), Some("Escape the rookery"));
}

#[tokio::test]
async fn challenge_accumulates_and_resolves() {
    let t = table().await;
    assert_eq!(t.ann.challenge().add_result(3, 1).await.unwrap(), None);

    t.gm.challenge().start(6, None).await.unwrap();
    let after_one = t.ann.challenge().add_result(4, 1).await.unwrap().unwrap();
    assert_eq!(after_one.resolution(), None);
    let after_two = t.bo.challenge().add_result(2, 1).await.unwrap().unwrap();
    assert_eq!(after_two.successes, 6);
    assert_eq!(after_two.banes, 2);
    assert_eq!(after_two.resolution(), Some(ChallengeResolution::Success));

    t.gm.strain().set(3).await.unwrap();
    t.gm.challenge().end().await.unwrap();
    let ended = t.ann.challenge().get().await.unwrap();
    assert!(!ended.active);
    assert_eq!(ended.successes, 0);
    assert_eq!(t.ann.strain().get().await.unwrap(), 0);
    assert_eq!(t.ann.challenge().add_result(1, 0).await.unwrap(), None);
}

#[tokio::test]
async fn challenge_and_strain_reset_are_gm_only() {
    let t = table().await;
    assert!(matches!(
        t.ann.challenge().start(6, None).await,
        Err(SceneError::NotGameMaster(_))
    ));
    assert!(matches!(
        t.ann.strain().reset().await,
        Err(SceneError::NotGameMaster(_))
    ));
}

// Assistance

#[tokio::test]
async fn help_and_withdraw() {
    let t = table().await;
    help(&t.ann, "bo").await.unwrap();

    let record = t.bo.assistance().record("bo").await.unwrap();
    assert_eq!(record.count, 1);
    assert_eq!(record.helpers, vec!["ann".to_string()]);
    let pointer = t.ann.assistance().helping("ann").await.unwrap().unwrap();
    assert_eq!(pointer.target_player_id, "bo");
    assert_eq!(pointer.target_player_name, "Bo");

    assert!(withdraw_help(&t.ann).await.unwrap());
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 0);
    assert!(t.ann.assistance().helping("ann").await.unwrap().is_none());
    assert!(!withdraw_help(&t.ann).await.unwrap());
}

#[tokio::test]
async fn help_rejects_self_and_strangers() {
    let t = table().await;
    assert!(matches!(help(&t.ann, "ann").await, Err(SceneError::SelfAssistance)));
    assert!(matches!(
        help(&t.ann, "nobody").await,
        Err(SceneError::PlayerNotFound(_))
    ));
}

#[tokio::test]
async fn clear_releases_every_helper() {
    let t = table().await;
    help(&t.ann, "bo").await.unwrap();
    help(&t.gm, "bo").await.unwrap();
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 2);

    assert_eq!(t.bo.assistance().clear("bo").await.unwrap(), 2);
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 0);
    assert!(t.ann.assistance().helping("ann").await.unwrap().is_none());
    assert!(t.gm.assistance().helping("gm").await.unwrap().is_none());
}

#[tokio::test]
async fn legacy_assistance_count_is_read() {
    let t = table().await;
    t.ann
        .write(update([("streetwise.assistance.bo", json!(2))]))
        .await
        .unwrap();
    let record = t.bo.assistance().record("bo").await.unwrap();
    assert_eq!(record.count, 2);
    assert!(record.helpers.is_empty());
}

#[tokio::test]
async fn dangling_helping_pointer_heals_on_withdraw() {
    let t = table().await;
    // A torn bundle: the pointer landed, the target's record did not.
    t.ann
        .write(update([(
            "streetwise.helping.ann",
            json!({"targetPlayerId": "bo", "targetPlayerName": "Bo"}),
        )]))
        .await
        .unwrap();

    assert!(withdraw_help(&t.ann).await.unwrap());
    let record = t.bo.assistance().record("bo").await.unwrap();
    assert_eq!(record.count, 0);
    assert!(record.helpers.is_empty());
    assert!(t.ann.assistance().helping("ann").await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_write_leaves_state_readable() {
    let t = table().await;
    t.room.fail_next_writes(1).await;
    let result = help(&t.ann, "bo").await;
    assert!(matches!(result, Err(SceneError::Host(_))));
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 0);

    help(&t.ann, "bo").await.unwrap();
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 1);
}

#[tokio::test]
async fn malformed_values_fall_back_to_defaults() {
    let t = table().await;
    t.gm.write(update([
        ("streetwise.strain", json!("high")),
        ("streetwise.npcs", json!({"not": "a list"})),
        ("streetwise.initiativeRound.pool", json!([1, "two"])),
    ]))
    .await
    .unwrap();
    let snap = t.ann.snapshot().await.unwrap();
    assert_eq!(snap.strain, 0);
    assert!(snap.npcs.is_empty());
    assert!(snap.round.pool.is_empty());

    t.gm.initiative().start().await.unwrap();
    assert_eq!(t.ann.snapshot().await.unwrap().round.pool.len(), 10);
}

#[tokio::test]
async fn broadcast_failure_is_swallowed() {
    let t = table().await;
    t.room.fail_next_broadcasts(1).await;
    help(&t.ann, "bo").await.unwrap();
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 1);
}

// Rolls

#[tokio::test]
async fn roll_consumes_assistance_and_broadcasts() {
    let t = table().await;
    let mut rolls = t.ann_host.subscribe("com.streetwise/rolls").await;
    t.gm.strain().set(2).await.unwrap();
    help(&t.ann, "bo").await.unwrap();
    // The assistance announcement.
    rolls.recv().await.unwrap();

    let request = RollRequest::skill(&nell(), Skill::Pinch, 0).with_contribution(false);
    let base = request.breakdown.total;
    let mut session = RollSession::new(&t.bo, request);
    let outcome = session.roll().await.unwrap();

    assert_eq!(outcome.assistance_used, 1);
    assert_eq!(outcome.roll.regular_dice, base + 1);
    assert_eq!(outcome.roll.strain_dice, 2);
    assert_eq!(outcome.strain, 2);
    assert!(outcome.challenge.is_none());
    assert_eq!(t.bo.assistance().get("bo").await.unwrap(), 0);
    assert!(t.ann.assistance().helping("ann").await.unwrap().is_none());

    let payload = rolls.recv().await.unwrap();
    let message = BroadcastMessage::decode(payload).unwrap();
    let BroadcastMessage::Roll(roll) = &message else {
        panic!("expected a roll message, got {message:?}");
    };
    assert_eq!(roll.player_id, "bo");
    assert_eq!(roll.character_name, "Nell");
    assert_eq!(roll.skill_name, "Pinch");
    assert_eq!(roll.results.successes, outcome.roll.successes);

    let mut for_ann = NotificationFilter::new("ann", Duration::from_secs(5));
    let mut for_bo = NotificationFilter::new("bo", Duration::from_secs(5));
    assert!(for_bo.accept(message.clone()).is_none());
    assert!(for_ann.accept(message.clone()).is_some());
    assert!(for_ann.accept(message).is_none());
}

#[tokio::test]
async fn push_before_roll_fails() {
    let t = table().await;
    let mut session = RollSession::new(&t.ann, RollRequest::skill(&nell(), Skill::Pinch, 0));
    assert!(matches!(session.push().await, Err(SceneError::NoRoll)));
    assert!(!session.can_push());
}

#[tokio::test]
async fn push_adds_strain_and_contributes_its_final_dice() {
    let t = table().await;
    t.gm.challenge().start(100, None).await.unwrap();
    t.gm.strain().set(3).await.unwrap();

    let mut session = RollSession::new(&t.ann, RollRequest::skill(&nell(), Skill::Pinch, 0));
    let first = session.roll().await.unwrap().roll;
    assert!(session.can_push());
    let outcome = session.push().await.unwrap();

    let pushed = &outcome.roll;
    assert!(pushed.pushed);
    let panic_increase = outcome.panic.map_or(0, |p| p.strain_increase());
    assert_eq!(outcome.strain, 3 + pushed.total_banes + panic_increase);
    assert_eq!(t.ann.strain().get().await.unwrap(), outcome.strain);
    assert_eq!(outcome.panic.is_some(), pushed.strain_banes > 0);

    let challenge = outcome.challenge.unwrap();
    assert_eq!(challenge.successes, first.successes + pushed.successes);
    assert_eq!(
        challenge.banes,
        first.total_banes + pushed.regular_banes + pushed.strain_banes
    );

    let again = session.push().await;
    assert!(matches!(again, Err(SceneError::Rules(MechError::NotPushable))));
}

#[tokio::test]
async fn other_players_see_both_the_push_and_its_panic() {
    let t = table().await;
    let mut rolls = t.ann_host.subscribe("com.streetwise/rolls").await;
    let mut filter = NotificationFilter::new("bo", Duration::from_secs(5));

    // Heavy strain makes a strain bane on the push all but certain.
    let mut shown = Vec::new();
    for _ in 0..20 {
        t.gm.strain().set(40).await.unwrap();
        let mut session = RollSession::new(&t.ann, RollRequest::skill(&nell(), Skill::Pinch, 0));
        session.roll().await.unwrap();
        let outcome = session.push().await.unwrap();
        shown.clear();
        while let Ok(payload) = rolls.try_recv() {
            if let Some(n) = BroadcastMessage::decode(payload).and_then(|m| filter.accept(m)) {
                shown.push(n.message);
            }
        }
        if outcome.panic.is_some() {
            break;
        }
    }

    let kinds: Vec<&str> = shown.iter().map(BroadcastMessage::kind).collect();
    assert_eq!(kinds, ["STREETWISE_ROLL", "STREETWISE_ROLL", "SCENE_PANIC"]);
    assert!(matches!(&shown[1], BroadcastMessage::Roll(m) if m.pushed));
    assert!(matches!(&shown[2], BroadcastMessage::ScenePanic(m) if m.player_id == "ann"));
}

#[tokio::test]
async fn attribute_roll_names_the_attribute() {
    let t = table().await;
    let request = RollRequest::attribute(&nell(), Attribute::Agility, 1);
    assert_eq!(request.skill_name, "Agility");
    assert_eq!(request.breakdown.total, 4);
    assert!(!request.can_push_twice);
    let mut session = RollSession::new(&t.ann, request);
    let outcome = session.roll().await.unwrap();
    assert_eq!(outcome.roll.regular_dice, 4);
    assert_eq!(outcome.roll.strain_dice, 0);
}

// Characters and tokens

#[tokio::test]
async fn characters_are_saved_per_player() {
    let t = table().await;
    let mut watch = t.gm.characters().watch("ann").await;
    t.ann.characters().save(&nell()).await.unwrap();

    assert_eq!(t.gm.characters().load("ann").await.unwrap(), Some(nell()));
    assert_eq!(t.ann.characters().load_current().await.unwrap(), Some(nell()));
    assert_eq!(watch.changed().await, Some(Some(nell())));

    let names = t.ann.characters().character_names().await.unwrap();
    assert_eq!(names["ann"], "Nell");
    assert_eq!(names["bo"], "Bo");

    let result = t.ann.characters().save_for("bo", &nell()).await;
    assert!(matches!(result, Err(SceneError::NotOwner { .. })));
}

#[tokio::test]
async fn token_linking_checks_the_selection() {
    let t = table().await;
    let linker = t.ann.tokens();
    assert!(matches!(
        linker.link(&nell()).await,
        Err(SceneError::NoTokenSelected)
    ));

    t.room
        .add_item(SceneItem::new("tok-1", "Nell", ItemKind::Image))
        .await;
    t.room
        .add_item(SceneItem::new("shape-1", "", ItemKind::Shape))
        .await;

    t.ann_host.select(&["tok-1", "shape-1"]).await;
    assert!(matches!(
        linker.link(&nell()).await,
        Err(SceneError::MultipleTokensSelected)
    ));

    t.ann_host.select(&["shape-1"]).await;
    assert!(matches!(linker.link(&nell()).await, Err(SceneError::NotAToken)));

    t.ann_host.select(&["gone"]).await;
    assert!(matches!(
        linker.link(&nell()).await,
        Err(SceneError::TokenNotFound(_))
    ));

    t.ann_host.select(&["tok-1"]).await;
    assert_eq!(linker.link(&nell()).await.unwrap(), "tok-1");
    let item = t.room.item("tok-1").await.unwrap();
    assert_eq!(item.metadata["streetwise.characterId"], json!("c-nell"));
    assert_eq!(item.metadata["streetwise.characterName"], json!("Nell"));

    linker.unlink("tok-1").await.unwrap();
    let item = t.room.item("tok-1").await.unwrap();
    assert!(item.metadata.is_empty());
    assert!(matches!(
        linker.unlink("gone").await,
        Err(SceneError::TokenNotFound(_))
    ));
}

#[tokio::test]
async fn token_names_fall_back() {
    let t = table().await;
    t.room
        .add_item(SceneItem::new("tok-1", "", ItemKind::Image))
        .await;
    assert!(t.ann.tokens().exists("tok-1").await.unwrap());
    assert_eq!(t.ann.tokens().token_name("tok-1").await.unwrap(), "Token");
    assert!(!t.ann.tokens().exists("gone").await.unwrap());
    assert_eq!(t.ann.tokens().token_name("gone").await.unwrap(), "Token");
}
