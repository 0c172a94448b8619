//! One player's roll flow against the shared scene.
//!
//! A roll reads the scene, sizes the pool from the sheet plus any assistance
//! and the current strain, consumes the assistance, announces the result,
//! and optionally feeds the scene challenge. A push rerolls, raises strain
//! by the banes shown plus any panic, and announces both.

use sw_core::{Attribute, Character, Skill};
use sw_mechanics::panic::check_scene_panic;
use sw_mechanics::talents::{self, PoolBreakdown};
use sw_mechanics::{DicePool, DiceRoll, ScenePanic};
use tracing::{debug, info, instrument};

use crate::error::{SceneError, SceneResult};
use crate::messages::{AssistanceMessage, BroadcastMessage, RollMessage, ScenePanicMessage};
use crate::scene::Scene;
use crate::state::{ChallengeResolution, SceneChallenge};

/// What to roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    /// Character shown in the broadcast.
    pub character_name: String,
    /// Skill or attribute shown in the broadcast.
    pub skill_name: String,
    /// Regular pool before assistance.
    pub breakdown: PoolBreakdown,
    /// Whether a talent allows a second push.
    pub can_push_twice: bool,
    /// Whether results count toward an active scene challenge.
    pub contribute: bool,
}

impl RollRequest {
    /// A skill roll, with talents applied.
    pub fn skill(character: &Character, skill: Skill, extra_modifier: i32) -> Self {
        Self {
            character_name: character.name.clone(),
            skill_name: skill.name().to_string(),
            breakdown: talents::dice_pool(character, skill, extra_modifier),
            can_push_twice: talents::can_push_twice(character, skill),
            contribute: true,
        }
    }

    /// A raw attribute roll.
    pub fn attribute(character: &Character, attribute: Attribute, modifier: i32) -> Self {
        Self {
            character_name: character.name.clone(),
            skill_name: attribute.to_string(),
            breakdown: talents::attribute_pool(character, attribute, modifier),
            can_push_twice: false,
            contribute: true,
        }
    }

    /// Choose whether results count toward the scene challenge.
    pub fn with_contribution(mut self, contribute: bool) -> Self {
        self.contribute = contribute;
        self
    }
}

/// The result of a roll or push after the scene was updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    /// The dice.
    pub roll: DiceRoll,
    /// Assistance dice the roll consumed.
    pub assistance_used: u32,
    /// Scene panic, on a push that showed a strain bane.
    pub panic: Option<ScenePanic>,
    /// Scene strain after the roll.
    pub strain: u32,
    /// The challenge after contributing, if one is active and the request
    /// contributes.
    pub challenge: Option<SceneChallenge>,
}

impl RollOutcome {
    /// How the contribution left the challenge, if it resolved it.
    pub fn resolution(&self) -> Option<ChallengeResolution> {
        self.challenge.as_ref().and_then(SceneChallenge::resolution)
    }
}

/// Rolls and pushes for the current player.
pub struct RollSession<'a> {
    scene: &'a Scene,
    request: RollRequest,
    current: Option<DiceRoll>,
}

impl<'a> RollSession<'a> {
    /// A session that will roll `request`.
    pub fn new(scene: &'a Scene, request: RollRequest) -> Self {
        Self {
            scene,
            request,
            current: None,
        }
    }

    /// The most recent roll or push.
    pub fn current(&self) -> Option<&DiceRoll> {
        self.current.as_ref()
    }

    /// Returns true if the current roll may be pushed.
    pub fn can_push(&self) -> bool {
        self.current.as_ref().is_some_and(|roll| roll.can_push)
    }

    /// Roll the pool.
    #[instrument(skip(self), fields(skill = %self.request.skill_name))]
    pub async fn roll(&mut self) -> SceneResult<RollOutcome> {
        let me = self.scene.current_player().await?;
        let snapshot = self.scene.snapshot().await?;
        let assistance = snapshot.assistance.count;
        let params = self.request.breakdown.parameters(assistance, snapshot.strain);
        let roll = DicePool::from_parameters(params).roll(&mut rand::rng());
        debug!(%roll, assistance, "rolled");

        if assistance > 0 {
            self.scene.assistance().clear(&me.id).await?;
        }
        self.announce(&me.id, &me.name, &roll).await;
        let challenge = self.contribute(roll.successes, roll.total_banes).await?;

        self.current = Some(roll.clone());
        Ok(RollOutcome {
            roll,
            assistance_used: assistance,
            panic: None,
            strain: snapshot.strain,
            challenge,
        })
    }

    /// Push the current roll. Fails with [`SceneError::NoRoll`] before any
    /// roll, and with a rules error once no pushes remain.
    #[instrument(skip(self), fields(skill = %self.request.skill_name))]
    pub async fn push(&mut self) -> SceneResult<RollOutcome> {
        let previous = self.current.as_ref().ok_or(SceneError::NoRoll)?;
        let pushed = previous.push(self.request.can_push_twice, &mut rand::rng())?;
        let me = self.scene.current_player().await?;

        let strain_before = self.scene.strain().get().await?;
        let panic = check_scene_panic(&pushed, strain_before, &mut rand::rng());
        let strain = self
            .scene
            .strain()
            .apply_push(strain_before, &pushed, panic.as_ref())
            .await?;

        self.announce(&me.id, &me.name, &pushed).await;
        if let Some(panic) = &panic {
            let message = ScenePanicMessage::new(&me.id, &self.request.character_name, panic);
            self.scene.broadcast(&BroadcastMessage::ScenePanic(message)).await;
        }
        // A push counts in full, on top of what the first roll contributed.
        let challenge = self
            .contribute(pushed.successes, pushed.regular_banes + pushed.strain_banes)
            .await?;

        self.current = Some(pushed.clone());
        Ok(RollOutcome {
            roll: pushed,
            assistance_used: 0,
            panic,
            strain,
            challenge,
        })
    }

    async fn announce(&self, player_id: &str, player_name: &str, roll: &DiceRoll) {
        let message = RollMessage::new(
            player_id,
            player_name,
            &self.request.character_name,
            &self.request.skill_name,
            roll,
        );
        self.scene.broadcast(&BroadcastMessage::Roll(message)).await;
    }

    async fn contribute(&self, successes: u32, banes: u32) -> SceneResult<Option<SceneChallenge>> {
        if !self.request.contribute {
            return Ok(None);
        }
        self.scene.challenge().add_result(successes, banes).await
    }
}

/// The current player grants `target_id` one bonus die and announces it.
#[instrument(skip(scene))]
pub async fn help(scene: &Scene, target_id: &str) -> SceneResult<()> {
    let me = scene.current_player().await?;
    if me.id == target_id {
        return Err(SceneError::SelfAssistance);
    }
    let target = scene
        .party()
        .await?
        .into_iter()
        .find(|p| p.id == target_id)
        .ok_or_else(|| SceneError::PlayerNotFound(target_id.to_string()))?;

    scene.assistance().add(&me.id, &target.id, &target.name, 1).await?;

    let names = scene.characters().character_names().await?;
    let character_of = |id: &str, fallback: &str| {
        names.get(id).cloned().unwrap_or_else(|| fallback.to_string())
    };
    let message = AssistanceMessage {
        from_character_name: character_of(&me.id, &me.name),
        from_player_id: me.id.clone(),
        from_player_name: me.name.clone(),
        to_character_name: character_of(&target.id, &target.name),
        to_player_id: target.id.clone(),
        to_player_name: target.name.clone(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    scene.broadcast(&BroadcastMessage::Assistance(message)).await;
    info!(from = %me.id, to = %target.id, "assistance granted");
    Ok(())
}

/// The current player takes back their help. Returns false if they were not
/// helping anyone.
pub async fn withdraw_help(scene: &Scene) -> SceneResult<bool> {
    let me = scene.current_player().await?;
    scene.assistance().withdraw(&me.id).await
}
