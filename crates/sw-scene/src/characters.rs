//! Character sheets stored in room metadata, one key per player.

use std::collections::BTreeMap;

use sw_core::Character;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument, warn};

use crate::error::{SceneError, SceneResult};
use crate::host::{MetadataStream, RoomMetadata};
use crate::scene::{Scene, encode};
use crate::state::{read_key, update};

/// Loads and saves character sheets.
pub struct CharacterStore<'a> {
    scene: &'a Scene,
}

impl<'a> CharacterStore<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// The character saved by `player_id`.
    pub async fn load(&self, player_id: &str) -> SceneResult<Option<Character>> {
        let meta = self.scene.metadata().await?;
        Ok(read_key(&meta, &self.scene.keys().character(player_id)))
    }

    /// The current player's character.
    pub async fn load_current(&self) -> SceneResult<Option<Character>> {
        let me = self.scene.current_player().await?;
        self.load(&me.id).await
    }

    /// Save `character` as the current player's sheet.
    #[instrument(skip(self, character), fields(character = %character.name))]
    pub async fn save(&self, character: &Character) -> SceneResult<()> {
        let me = self.scene.current_player().await?;
        let key = self.scene.keys().character(&me.id);
        let value = encode(&key, character)?;
        self.scene.write(update([(key, value)])).await
    }

    /// Save `character` under `owner`. Only the owner may write their sheet.
    pub async fn save_for(&self, owner: &str, character: &Character) -> SceneResult<()> {
        let me = self.scene.current_player().await?;
        if me.id != owner {
            return Err(SceneError::NotOwner {
                player: me.id,
                owner: owner.to_string(),
            });
        }
        self.save(character).await
    }

    /// Character names for every party member, keyed by player id. Players
    /// without a sheet are listed under their player name.
    pub async fn character_names(&self) -> SceneResult<BTreeMap<String, String>> {
        let meta = self.scene.metadata().await?;
        let names = self
            .scene
            .party()
            .await?
            .into_iter()
            .map(|player| {
                let name = read_key::<Character>(&meta, &self.scene.keys().character(&player.id))
                    .map(|c| c.name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(player.name);
                (player.id, name)
            })
            .collect();
        Ok(names)
    }

    /// Follow `player_id`'s sheet as the room changes.
    pub async fn watch(&self, player_id: &str) -> CharacterWatch {
        CharacterWatch {
            changes: self.scene.host().subscribe_metadata().await,
            key: self.scene.keys().character(player_id),
        }
    }
}

/// Decodes one player's sheet from each room change.
pub struct CharacterWatch {
    changes: MetadataStream,
    key: String,
}

impl CharacterWatch {
    /// Wait for the next room change and decode the sheet from it.
    ///
    /// Yields `Some(None)` when the change leaves no sheet, and `None` once
    /// the room is gone.
    pub async fn changed(&mut self) -> Option<Option<Character>> {
        loop {
            match self.changes.recv().await {
                Ok(meta) => return Some(read_key(&meta, &self.key)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "character watch fell behind");
                }
                Err(RecvError::Closed) => {
                    debug!(key = %self.key, "character watch closed");
                    return None;
                }
            }
        }
    }
}
