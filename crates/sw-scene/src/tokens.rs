//! Links between character sheets and map tokens.

use serde_json::Value;
use sw_core::Character;
use tracing::{info, instrument};

use crate::error::{SceneError, SceneResult};
use crate::host::{ItemKind, SceneItem, SceneItems};
use crate::scene::Scene;

/// Name shown for a token that has none.
const UNNAMED_TOKEN: &str = "Token";

/// Stamps character ids onto map tokens.
pub struct TokenLinker<'a> {
    scene: &'a Scene,
}

impl<'a> TokenLinker<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    async fn find(&self, token_id: &str) -> SceneResult<Option<SceneItem>> {
        let items = self.scene.host().items(&[token_id.to_string()]).await?;
        Ok(items.into_iter().next())
    }

    /// Link `character` to the one selected image token. Returns the token id
    /// for the caller to record on the sheet.
    #[instrument(skip(self, character), fields(character = %character.name))]
    pub async fn link(&self, character: &Character) -> SceneResult<String> {
        let selection = self.scene.host().selection().await?;
        let token_id = match selection.as_slice() {
            [] => return Err(SceneError::NoTokenSelected),
            [id] => id.clone(),
            _ => return Err(SceneError::MultipleTokensSelected),
        };
        let item = self
            .find(&token_id)
            .await?
            .ok_or_else(|| SceneError::TokenNotFound(token_id.clone()))?;
        if item.kind != ItemKind::Image {
            return Err(SceneError::NotAToken);
        }

        let keys = self.scene.keys();
        let mut metadata = item.metadata;
        metadata.insert(keys.token_character_id(), Value::from(character.id.clone()));
        metadata.insert(keys.token_character_name(), Value::from(character.name.clone()));
        self.scene.host().set_item_metadata(&token_id, metadata).await?;
        info!(token = %token_id, "token linked");
        Ok(token_id)
    }

    /// Remove the character stamp from a token.
    #[instrument(skip(self))]
    pub async fn unlink(&self, token_id: &str) -> SceneResult<()> {
        let item = self
            .find(token_id)
            .await?
            .ok_or_else(|| SceneError::TokenNotFound(token_id.to_string()))?;
        let keys = self.scene.keys();
        let mut metadata = item.metadata;
        metadata.remove(&keys.token_character_id());
        metadata.remove(&keys.token_character_name());
        self.scene.host().set_item_metadata(token_id, metadata).await?;
        Ok(())
    }

    /// Returns true if the token is still on the map.
    pub async fn exists(&self, token_id: &str) -> SceneResult<bool> {
        Ok(self.find(token_id).await?.is_some())
    }

    /// The token's name, or a placeholder if it has none or is gone.
    pub async fn token_name(&self, token_id: &str) -> SceneResult<String> {
        Ok(self
            .find(token_id)
            .await?
            .map(|item| item.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNNAMED_TOKEN.to_string()))
    }
}
