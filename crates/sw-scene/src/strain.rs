//! Scene strain.

use serde_json::Value;
use sw_mechanics::panic::{apply_panic_strain, calculate_new_strain};
use sw_mechanics::{DiceRoll, ScenePanic};
use tracing::{info, instrument};

use crate::error::SceneResult;
use crate::scene::Scene;
use crate::state::{read_count, update};

/// Reads and writes the shared strain counter.
pub struct StrainTracker<'a> {
    scene: &'a Scene,
}

impl<'a> StrainTracker<'a> {
    pub(crate) fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    /// Current strain; 0 if unset.
    pub async fn get(&self) -> SceneResult<u32> {
        let meta = self.scene.metadata().await?;
        Ok(read_count(&meta, &self.scene.keys().strain()).unwrap_or(0))
    }

    /// Set strain.
    #[instrument(skip(self))]
    pub async fn set(&self, value: u32) -> SceneResult<()> {
        self.scene
            .write(update([(self.scene.keys().strain(), Value::from(value))]))
            .await
    }

    /// Reset strain to 0. GM only.
    pub async fn reset(&self) -> SceneResult<()> {
        self.scene.require_gm("reset strain").await?;
        info!("strain reset");
        self.set(0).await
    }

    /// Apply a pushed roll: every bane adds a point, then any panic increase,
    /// written once. `strain_before` is the strain the roll was made against.
    /// Returns the new strain.
    pub async fn apply_push(
        &self,
        strain_before: u32,
        roll: &DiceRoll,
        panic: Option<&ScenePanic>,
    ) -> SceneResult<u32> {
        let after_banes = calculate_new_strain(strain_before, roll);
        let strain = apply_panic_strain(after_banes, panic);
        info!(from = strain_before, to = strain, "strain after push");
        self.set(strain).await?;
        Ok(strain)
    }
}
