//! Assistance: one player grants another a bonus die for their next roll.
//!
//! Each grant touches two keys, the target's record and the helper's
//! pointer, in a single write that the host does not make atomic. A pointer
//! left without a matching helper entry (or the reverse) is harmless: the
//! next add, withdraw, or clear rewrites both from what it reads.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::SceneResult;
use crate::scene::{Scene, encode};
use crate::state::{Assistance, HelpingInfo, read_key, update};

/// Reads and writes assistance records.
pub struct AssistanceService<'a> {
    scene: &'a Scene,
}

impl<'a> AssistanceService<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// Bonus dice waiting for `player_id`.
    pub async fn get(&self, player_id: &str) -> SceneResult<u32> {
        Ok(self.record(player_id).await?.count)
    }

    /// The full assistance record for `player_id`.
    pub async fn record(&self, player_id: &str) -> SceneResult<Assistance> {
        let meta = self.scene.metadata().await?;
        Ok(Assistance::read(&meta, self.scene.keys(), player_id))
    }

    /// Who `player_id` is helping, if anyone.
    pub async fn helping(&self, player_id: &str) -> SceneResult<Option<HelpingInfo>> {
        let meta = self.scene.metadata().await?;
        Ok(read_key(&meta, &self.scene.keys().helping(player_id)))
    }

    /// `from` grants `to` `bonus_dice` extra dice.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        from: &str,
        to: &str,
        to_name: &str,
        bonus_dice: u32,
    ) -> SceneResult<()> {
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let mut record = Assistance::read(&meta, keys, to);
        record.count += bonus_dice;
        if !record.helpers.iter().any(|h| h == from) {
            record.helpers.push(from.to_string());
        }
        let helping = HelpingInfo {
            target_player_id: to.to_string(),
            target_player_name: to_name.to_string(),
        };

        let record_key = keys.assistance(to);
        let helping_key = keys.helping(from);
        let record_value = encode(&record_key, &record)?;
        let helping_value = encode(&helping_key, &helping)?;
        self.scene
            .write(update([(record_key, record_value), (helping_key, helping_value)]))
            .await
    }

    /// `from` takes back their help. Returns false if they were not helping.
    #[instrument(skip(self))]
    pub async fn withdraw(&self, from: &str) -> SceneResult<bool> {
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let Some(helping) = read_key::<HelpingInfo>(&meta, &keys.helping(from)) else {
            return Ok(false);
        };

        let mut record = Assistance::read(&meta, keys, &helping.target_player_id);
        record.count = record.count.saturating_sub(1);
        record.helpers.retain(|h| h != from);

        let record_key = keys.assistance(&helping.target_player_id);
        let record_value = encode(&record_key, &record)?;
        self.scene
            .write(update([
                (record_key, record_value),
                (keys.helping(from), Value::Null),
            ]))
            .await?;
        Ok(true)
    }

    /// Consume all of `player_id`'s assistance and release their helpers.
    /// Returns the number of dice cleared.
    #[instrument(skip(self))]
    pub async fn clear(&self, player_id: &str) -> SceneResult<u32> {
        let keys = self.scene.keys();
        let meta = self.scene.metadata().await?;
        let record = Assistance::read(&meta, keys, player_id);

        let record_key = keys.assistance(player_id);
        let cleared = encode(&record_key, &Assistance::default())?;
        let mut changes = update([(record_key, cleared)]);
        for helper in &record.helpers {
            changes.insert(keys.helping(helper), Value::Null);
        }
        debug!(count = record.count, helpers = record.helpers.len(), "clearing assistance");
        self.scene.write(changes).await?;
        Ok(record.count)
    }
}
