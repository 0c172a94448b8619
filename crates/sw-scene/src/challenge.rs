//! Scene challenges.
//!
//! Starting a challenge starts a new scene: the same write opens a fresh
//! initiative round and zeroes strain.

use serde_json::Value;
use tracing::{info, instrument};

use crate::error::SceneResult;
use crate::scene::{Scene, encode};
use crate::state::{SceneChallenge, read_key, update};

/// Starts, feeds, and ends the scene challenge.
pub struct ChallengeService<'a> {
    scene: &'a Scene,
}

impl<'a> ChallengeService<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// The challenge record; inactive if none was ever started.
    pub async fn get(&self) -> SceneResult<SceneChallenge> {
        let meta = self.scene.metadata().await?;
        Ok(read_key(&meta, &self.scene.keys().scene_challenge()).unwrap_or_default())
    }

    async fn store(&self, challenge: &SceneChallenge) -> SceneResult<()> {
        let key = self.scene.keys().scene_challenge();
        let value = encode(&key, challenge)?;
        self.scene.write(update([(key, value)])).await
    }

    /// Start a challenge. GM only.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        target: u32,
        description: Option<String>,
    ) -> SceneResult<SceneChallenge> {
        self.scene.require_gm("start a scene challenge").await?;
        let keys = self.scene.keys();
        let challenge = SceneChallenge::started(target, description);
        let players = self.scene.party().await?;

        let mut changes = self.scene.initiative().fresh_round(&players)?;
        changes.insert(keys.scene_challenge(), encode(&keys.scene_challenge(), &challenge)?);
        changes.insert(keys.strain(), Value::from(0));
        self.scene.write(changes).await?;
        info!(target, "scene challenge started");
        Ok(challenge)
    }

    /// End the challenge and zero strain. GM only.
    #[instrument(skip(self))]
    pub async fn end(&self) -> SceneResult<()> {
        self.scene.require_gm("end a scene challenge").await?;
        let keys = self.scene.keys();
        let ended = SceneChallenge::default();
        self.scene
            .write(update([
                (keys.scene_challenge(), encode(&keys.scene_challenge(), &ended)?),
                (keys.strain(), Value::from(0)),
            ]))
            .await?;
        info!("scene challenge ended");
        Ok(())
    }

    /// Add a roll's successes and banes. Returns the updated challenge, or
    /// `None` without writing if no challenge is active.
    #[instrument(skip(self))]
    pub async fn add_result(
        &self,
        successes: u32,
        banes: u32,
    ) -> SceneResult<Option<SceneChallenge>> {
        let mut challenge = self.get().await?;
        if !challenge.active {
            return Ok(None);
        }
        challenge.successes += successes;
        challenge.banes += banes;
        self.store(&challenge).await?;
        if let Some(resolution) = challenge.resolution() {
            info!(%resolution, "scene challenge resolved");
        }
        Ok(Some(challenge))
    }
}
