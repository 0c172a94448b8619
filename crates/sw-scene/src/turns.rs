//! Turn counter and per-turn actions.

use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{SceneError, SceneResult};
use crate::keys::is_npc_id;
use crate::scene::{Scene, encode};
use crate::state::{TurnActions, read_count, read_key, read_npcs, update};

/// Tracks turns and the actions each player and NPC has used.
pub struct TurnTracker<'a> {
    scene: &'a Scene,
}

impl<'a> TurnTracker<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// The current turn; 0 before any round starts.
    pub async fn turn_counter(&self) -> SceneResult<u32> {
        let meta = self.scene.metadata().await?;
        Ok(read_count(&meta, &self.scene.keys().turn_counter()).unwrap_or(0))
    }

    /// Actions a player has used this turn.
    pub async fn actions(&self, player_id: &str) -> SceneResult<TurnActions> {
        let meta = self.scene.metadata().await?;
        Ok(read_key(&meta, &self.scene.keys().turn_actions(player_id)).unwrap_or_default())
    }

    /// Record a player's actions. Players may only set their own; the GM may
    /// set anyone's. NPC ids are routed to the NPC list. More than two used
    /// actions is rejected.
    #[instrument(skip(self))]
    pub async fn set_actions(&self, player_id: &str, actions: TurnActions) -> SceneResult<()> {
        let actions = actions.checked()?;
        if is_npc_id(player_id) {
            self.scene.npcs().update_turn_actions(player_id, actions).await?;
            return Ok(());
        }
        let me = self.scene.current_player().await?;
        if me.id != player_id && !me.is_gm() {
            return Err(SceneError::NotOwner {
                player: me.id,
                owner: player_id.to_string(),
            });
        }
        let key = self.scene.keys().turn_actions(player_id);
        let value = encode(&key, &actions)?;
        self.scene.write(update([(key, value)])).await
    }

    /// Advance the turn counter and clear every player's and NPC's actions,
    /// in one write. GM only. Returns the new turn number.
    #[instrument(skip(self))]
    pub async fn start_new_turn(&self) -> SceneResult<u32> {
        self.scene.require_gm("start a new turn").await?;
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let turn = read_count(&meta, &keys.turn_counter()).unwrap_or(0) + 1;

        let no_actions = encode("turnActions", &TurnActions::default())?;
        let mut changes = update([(keys.turn_counter(), Value::from(turn))]);
        for player in self.scene.party().await? {
            changes.insert(keys.turn_actions(&player.id), no_actions.clone());
        }
        let npcs: Vec<_> = read_npcs(&meta, keys)
            .into_iter()
            .map(|mut npc| {
                npc.turn_actions = TurnActions::default();
                npc
            })
            .collect();
        if !npcs.is_empty() {
            changes.insert(keys.npcs(), encode(&keys.npcs(), &npcs)?);
        }
        self.scene.write(changes).await?;
        info!(turn, "new turn");
        Ok(turn)
    }

    /// Set the turn counter back to 0. GM only.
    pub async fn reset_counter(&self) -> SceneResult<()> {
        self.scene.require_gm("reset the turn counter").await?;
        self.scene
            .write(update([(self.scene.keys().turn_counter(), Value::from(0))]))
            .await
    }
}
