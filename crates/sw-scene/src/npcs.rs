//! GM-controlled characters in the initiative order.

use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{SceneError, SceneResult};
use crate::keys::NPC_ID_PREFIX;
use crate::scene::{Scene, encode};
use crate::state::{InitiativeRound, Npc, TurnActions, read_npcs, update};

/// The shared NPC list. Every change is GM only.
pub struct NpcRegistry<'a> {
    scene: &'a Scene,
}

impl<'a> NpcRegistry<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// Every NPC, in insertion order.
    pub async fn list(&self) -> SceneResult<Vec<Npc>> {
        let meta = self.scene.metadata().await?;
        Ok(read_npcs(&meta, self.scene.keys()))
    }

    /// An NPC by id.
    pub async fn get(&self, id: &str) -> SceneResult<Option<Npc>> {
        Ok(self.list().await?.into_iter().find(|npc| npc.id == id))
    }

    async fn store(&self, npcs: &[Npc]) -> SceneResult<()> {
        let key = self.scene.keys().npcs();
        let value = encode(&key, &npcs)?;
        self.scene.write(update([(key, value)])).await
    }

    /// Add an NPC with no initiative. Returns it.
    #[instrument(skip(self))]
    pub async fn add(&self, name: &str) -> SceneResult<Npc> {
        self.scene.require_gm("add NPCs").await?;
        let mut npcs = self.list().await?;
        let npc = Npc {
            id: format!("{NPC_ID_PREFIX}{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            initiative: None,
            turn_actions: TurnActions::default(),
        };
        npcs.push(npc.clone());
        self.store(&npcs).await?;
        info!(id = %npc.id, "NPC added");
        Ok(npc)
    }

    /// Remove an NPC, returning its drawn value to the pool in the same write.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> SceneResult<Npc> {
        self.scene.require_gm("remove NPCs").await?;
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let mut npcs = read_npcs(&meta, keys);
        let index = npcs
            .iter()
            .position(|npc| npc.id == id)
            .ok_or_else(|| SceneError::NpcNotFound(id.to_string()))?;
        let removed = npcs.remove(index);

        let npcs_key = keys.npcs();
        let mut changes = update([(npcs_key.clone(), encode(&npcs_key, &npcs)?)]);
        if let Some(value) = removed.initiative {
            let mut pool = InitiativeRound::read(&meta, keys).pool;
            pool.push(value);
            pool.sort_unstable();
            changes.insert(keys.round_pool(), Value::from(pool));
        }
        self.scene.write(changes).await?;
        info!(id, "NPC removed");
        Ok(removed)
    }

    async fn modify(&self, id: &str, change: impl FnOnce(&mut Npc)) -> SceneResult<Npc> {
        let mut npcs = self.list().await?;
        let npc = npcs
            .iter_mut()
            .find(|npc| npc.id == id)
            .ok_or_else(|| SceneError::NpcNotFound(id.to_string()))?;
        change(npc);
        let updated = npc.clone();
        self.store(&npcs).await?;
        Ok(updated)
    }

    /// Set an NPC's initiative directly, bypassing the pool.
    #[instrument(skip(self))]
    pub async fn update_initiative(&self, id: &str, initiative: Option<u32>) -> SceneResult<Npc> {
        self.scene.require_gm("update NPCs").await?;
        self.modify(id, |npc| npc.initiative = initiative).await
    }

    /// Set an NPC's turn actions.
    #[instrument(skip(self))]
    pub async fn update_turn_actions(&self, id: &str, actions: TurnActions) -> SceneResult<Npc> {
        self.scene.require_gm("update NPCs").await?;
        let actions = actions.checked()?;
        self.modify(id, |npc| npc.turn_actions = actions).await
    }

    /// Remove every NPC.
    pub async fn clear(&self) -> SceneResult<()> {
        self.scene.require_gm("clear NPCs").await?;
        self.store(&[]).await
    }
}
