//! The scene context shared by every service.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::assistance::AssistanceService;
use crate::challenge::ChallengeService;
use crate::characters::CharacterStore;
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::host::{BroadcastBus, Host, Metadata, Party, Player, RoomMetadata};
use crate::initiative::InitiativePool;
use crate::keys::Keys;
use crate::messages::BroadcastMessage;
use crate::npcs::NpcRegistry;
use crate::state::SceneSnapshot;
use crate::strain::StrainTracker;
use crate::tokens::TokenLinker;
use crate::turns::TurnTracker;

/// A host connection plus configuration. Services borrow it.
#[derive(Clone)]
pub struct Scene {
    host: Arc<dyn Host>,
    config: SceneConfig,
    keys: Keys,
}

impl Scene {
    /// A scene on `host` with `config`.
    pub fn new(host: Arc<dyn Host>, config: SceneConfig) -> Self {
        let keys = config.keys();
        Self { host, config, keys }
    }

    /// The host.
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// The configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The metadata key layout.
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// The player this client belongs to.
    pub async fn current_player(&self) -> SceneResult<Player> {
        Ok(self.host.current_player().await?)
    }

    /// Every player, always including the current one even when the host
    /// leaves them out of the party list.
    pub async fn party(&self) -> SceneResult<Vec<Player>> {
        let mut players = self.host.party_players().await?;
        let me = self.host.current_player().await?;
        if !players.iter().any(|p| p.id == me.id) {
            players.push(me);
        }
        Ok(players)
    }

    /// Fail with [`SceneError::NotGameMaster`] unless the current player is the GM.
    pub async fn require_gm(&self, action: &'static str) -> SceneResult<Player> {
        let me = self.current_player().await?;
        if me.is_gm() {
            Ok(me)
        } else {
            Err(SceneError::NotGameMaster(action))
        }
    }

    /// Read the whole room store.
    pub async fn metadata(&self) -> SceneResult<Metadata> {
        Ok(self.host.get_metadata().await?)
    }

    /// Merge `update` into the room store as one best-effort write.
    pub async fn write(&self, update: Metadata) -> SceneResult<()> {
        debug!(keys = ?update.keys().collect::<Vec<_>>(), "writing room metadata");
        self.host.set_metadata(update).await?;
        Ok(())
    }

    /// Decode this client's view of the scene.
    pub async fn snapshot(&self) -> SceneResult<SceneSnapshot> {
        let meta = self.metadata().await?;
        let me = self.current_player().await?;
        Ok(SceneSnapshot::read(&meta, &self.keys, &me.id))
    }

    /// Send a message on the rolls channel. Failures are logged and dropped.
    pub async fn broadcast(&self, message: &BroadcastMessage) {
        let payload = match message.encode() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to encode broadcast");
                return;
            }
        };
        if let Err(err) = self.host.send(&self.config.channel, payload).await {
            warn!(error = %err, "broadcast failed");
        }
    }

    /// Scene strain.
    pub fn strain(&self) -> StrainTracker<'_> {
        StrainTracker::new(self)
    }

    /// Assistance dice.
    pub fn assistance(&self) -> AssistanceService<'_> {
        AssistanceService::new(self)
    }

    /// The initiative pool.
    pub fn initiative(&self) -> InitiativePool<'_> {
        InitiativePool::new(self)
    }

    /// The NPC list.
    pub fn npcs(&self) -> NpcRegistry<'_> {
        NpcRegistry::new(self)
    }

    /// Turns and turn actions.
    pub fn turns(&self) -> TurnTracker<'_> {
        TurnTracker::new(self)
    }

    /// The scene challenge.
    pub fn challenge(&self) -> ChallengeService<'_> {
        ChallengeService::new(self)
    }

    /// Character sheets.
    pub fn characters(&self) -> CharacterStore<'_> {
        CharacterStore::new(self)
    }

    /// Token links.
    pub fn tokens(&self) -> TokenLinker<'_> {
        TokenLinker::new(self)
    }
}

/// Encode `value` for `key`.
pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> SceneResult<Value> {
    serde_json::to_value(value).map_err(|source| SceneError::Encode {
        key: key.to_string(),
        source,
    })
}
