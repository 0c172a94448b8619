//! The shared initiative pool.
//!
//! A round starts with the values 1 to 10 in a pool. Each player or NPC
//! draws one value at random, which leaves the pool. Swapping trades two
//! drawn values without touching the pool. Resetting one identity puts its
//! value back.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{SceneError, SceneResult};
use crate::host::{Metadata, Player};
use crate::keys::is_npc_id;
use crate::scene::{Scene, encode};
use crate::state::{InitiativeRound, Npc, TurnActions, read_count, read_npcs, update};

/// Draws, swaps, and resets initiative.
pub struct InitiativePool<'a> {
    scene: &'a Scene,
}

impl<'a> InitiativePool<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// The updates that open a fresh round for `players`: full pool, round
    /// active, no NPCs, turn 1, and every player undrawn with no actions.
    pub(crate) fn fresh_round(&self, players: &[Player]) -> SceneResult<Metadata> {
        let keys = self.scene.keys();
        let no_actions = encode("turnActions", &TurnActions::default())?;
        let mut changes = update([
            (keys.round_pool(), Value::from(self.scene.config().fresh_pool())),
            (keys.round_active(), Value::Bool(true)),
            (keys.npcs(), Value::Array(Vec::new())),
            (keys.turn_counter(), Value::from(1)),
        ]);
        for player in players {
            changes.insert(keys.initiative(&player.id), Value::Null);
            changes.insert(keys.turn_actions(&player.id), no_actions.clone());
        }
        Ok(changes)
    }

    /// Start a round. GM only.
    #[instrument(skip(self))]
    pub async fn start(&self) -> SceneResult<()> {
        self.scene.require_gm("start an initiative round").await?;
        let players = self.scene.party().await?;
        let changes = self.fresh_round(&players)?;
        self.scene.write(changes).await?;
        info!(players = players.len(), "initiative round started");
        Ok(())
    }

    /// End the round. Drawn values stay visible. GM only.
    #[instrument(skip(self))]
    pub async fn end(&self) -> SceneResult<()> {
        self.scene.require_gm("end an initiative round").await?;
        self.scene
            .write(update([(self.scene.keys().round_active(), Value::Bool(false))]))
            .await?;
        info!("initiative round ended");
        Ok(())
    }

    /// The round record.
    pub async fn round(&self) -> SceneResult<InitiativeRound> {
        let meta = self.scene.metadata().await?;
        Ok(InitiativeRound::read(&meta, self.scene.keys()))
    }

    /// The drawn value of a player or NPC.
    pub async fn value_of(&self, id: &str) -> SceneResult<Option<u32>> {
        let meta = self.scene.metadata().await?;
        Ok(self.read_value(&meta, id))
    }

    /// Returns true if the player has drawn this round.
    pub async fn has_drawn(&self, player_id: &str) -> SceneResult<bool> {
        Ok(self.value_of(player_id).await?.is_some())
    }

    fn read_value(&self, meta: &Metadata, id: &str) -> Option<u32> {
        if is_npc_id(id) {
            read_npcs(meta, self.scene.keys())
                .into_iter()
                .find(|npc| npc.id == id)
                .and_then(|npc| npc.initiative)
        } else {
            read_count(meta, &self.scene.keys().initiative(id))
        }
    }

    /// Draw a value for a player. Returns `None` if the pool is empty.
    ///
    /// A player who already holds a value gets it back and the pool is left
    /// alone; [`reset_one`](Self::reset_one) frees a value for a redraw.
    pub async fn draw(&self, player_id: &str) -> SceneResult<Option<u32>> {
        let meta = self.scene.metadata().await?;
        if let Some(held) = self.read_value(&meta, player_id) {
            return Ok(Some(held));
        }
        let round = InitiativeRound::read(&meta, self.scene.keys());
        let Some((value, pool)) = take_random(round.pool, &mut rand::rng()) else {
            return Ok(None);
        };
        self.write_player_draw(player_id, value, pool).await
    }

    /// Draw a value for a player with a caller-supplied RNG.
    pub async fn draw_with<R: Rng + Send + ?Sized>(
        &self,
        player_id: &str,
        rng: &mut R,
    ) -> SceneResult<Option<u32>> {
        let meta = self.scene.metadata().await?;
        if let Some(held) = self.read_value(&meta, player_id) {
            return Ok(Some(held));
        }
        let round = InitiativeRound::read(&meta, self.scene.keys());
        let Some((value, pool)) = take_random(round.pool, rng) else {
            return Ok(None);
        };
        self.write_player_draw(player_id, value, pool).await
    }

    async fn write_player_draw(
        &self,
        player_id: &str,
        value: u32,
        pool: Vec<u32>,
    ) -> SceneResult<Option<u32>> {
        let keys = self.scene.keys();
        self.scene
            .write(update([
                (keys.round_pool(), Value::from(pool)),
                (keys.initiative(player_id), Value::from(value)),
            ]))
            .await?;
        debug!(player = player_id, value, "drew initiative");
        Ok(Some(value))
    }

    /// Draw a value for an NPC. Returns `None` if the pool is empty.
    ///
    /// Like [`draw`](Self::draw), an NPC that already holds a value gets it
    /// back.
    pub async fn draw_for_npc(&self, npc_id: &str) -> SceneResult<Option<u32>> {
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let mut npcs: Vec<Npc> = read_npcs(&meta, keys);
        let Some(npc) = npcs.iter_mut().find(|npc| npc.id == npc_id) else {
            return Err(SceneError::NpcNotFound(npc_id.to_string()));
        };
        if let Some(held) = npc.initiative {
            return Ok(Some(held));
        }
        let round = InitiativeRound::read(&meta, keys);
        let Some((value, pool)) = take_random(round.pool, &mut rand::rng()) else {
            return Ok(None);
        };
        npc.initiative = Some(value);
        let npcs_key = keys.npcs();
        let npcs_value = encode(&npcs_key, &npcs)?;
        self.scene
            .write(update([
                (keys.round_pool(), Value::from(pool)),
                (npcs_key, npcs_value),
            ]))
            .await?;
        debug!(npc = npc_id, value, "drew initiative");
        Ok(Some(value))
    }

    /// Return an identity's value to the pool so it can draw again. GM only.
    #[instrument(skip(self))]
    pub async fn reset_one(&self, id: &str) -> SceneResult<()> {
        self.scene.require_gm("reset initiative").await?;
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let Some(value) = self.read_value(&meta, id) else {
            return Ok(());
        };
        let mut pool = InitiativeRound::read(&meta, keys).pool;
        pool.push(value);
        pool.sort_unstable();

        let mut changes = update([(keys.round_pool(), Value::from(pool))]);
        if is_npc_id(id) {
            let npcs: Vec<Npc> = read_npcs(&meta, keys)
                .into_iter()
                .map(|mut npc| {
                    if npc.id == id {
                        npc.initiative = None;
                    }
                    npc
                })
                .collect();
            changes.insert(keys.npcs(), encode(&keys.npcs(), &npcs)?);
        } else {
            changes.insert(keys.initiative(id), Value::Null);
        }
        self.scene.write(changes).await
    }

    /// Trade the drawn values of two identities (players or NPCs).
    ///
    /// Any two drawn values may be swapped; callers that only allow trading
    /// up should offer [`swap_candidates`](Self::swap_candidates). Does
    /// nothing if either side has not drawn.
    #[instrument(skip(self))]
    pub async fn swap(&self, a: &str, b: &str) -> SceneResult<bool> {
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let (Some(value_a), Some(value_b)) = (self.read_value(&meta, a), self.read_value(&meta, b))
        else {
            return Ok(false);
        };

        let mut changes = Metadata::new();
        let mut npcs = read_npcs(&meta, keys);
        let mut npcs_changed = false;
        for (id, value) in [(a, value_b), (b, value_a)] {
            if is_npc_id(id) {
                if let Some(npc) = npcs.iter_mut().find(|npc| npc.id == id) {
                    npc.initiative = Some(value);
                    npcs_changed = true;
                }
            } else {
                changes.insert(keys.initiative(id), Value::from(value));
            }
        }
        if npcs_changed {
            changes.insert(keys.npcs(), encode(&keys.npcs(), &npcs)?);
        }
        self.scene.write(changes).await?;
        debug!(a, b, value_a, value_b, "swapped initiative");
        Ok(true)
    }

    /// Identities holding a strictly higher value than `id`, best first.
    pub async fn swap_candidates(&self, id: &str) -> SceneResult<Vec<(String, u32)>> {
        let meta = self.scene.metadata().await?;
        let Some(own) = self.read_value(&meta, id) else {
            return Ok(Vec::new());
        };
        let mut candidates: Vec<(String, u32)> = self
            .scene
            .party()
            .await?
            .into_iter()
            .filter_map(|p| read_count(&meta, &self.scene.keys().initiative(&p.id)).map(|v| (p.id, v)))
            .chain(
                read_npcs(&meta, self.scene.keys())
                    .into_iter()
                    .filter_map(|npc| npc.initiative.map(|v| (npc.id, v))),
            )
            .filter(|(other, value)| other != id && *value > own)
            .collect();
        candidates.sort_by(|x, y| y.1.cmp(&x.1));
        Ok(candidates)
    }
}

/// Remove a uniformly random element from `pool`.
fn take_random<R: Rng + ?Sized>(mut pool: Vec<u32>, rng: &mut R) -> Option<(u32, Vec<u32>)> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.random_range(0..pool.len());
    let value = pool.remove(index);
    Some((value, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn take_random_removes_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let (value, pool) = take_random((1..=10).collect(), &mut rng).unwrap();
        assert_eq!(pool.len(), 9);
        assert!(!pool.contains(&value));
        assert!((1..=10).contains(&value));
    }

    #[test]
    fn take_random_empty() {
        assert!(take_random(Vec::new(), &mut StdRng::seed_from_u64(1)).is_none());
    }
}
