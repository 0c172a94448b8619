//! Room metadata key layout.

/// Prefix that marks an initiative identity as an NPC.
pub const NPC_ID_PREFIX: &str = "npc_";

/// Builds the metadata keys for one namespace and plugin id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    namespace: String,
    plugin_id: String,
}

impl Keys {
    /// Keys under `namespace`, with characters stored under `plugin_id`.
    pub fn new(namespace: &str, plugin_id: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            plugin_id: plugin_id.to_string(),
        }
    }

    /// Scene strain (number).
    pub fn strain(&self) -> String {
        format!("{}.strain", self.namespace)
    }

    /// Assistance received by a player.
    pub fn assistance(&self, player_id: &str) -> String {
        format!("{}.assistance.{player_id}", self.namespace)
    }

    /// Who a player is helping.
    pub fn helping(&self, player_id: &str) -> String {
        format!("{}.helping.{player_id}", self.namespace)
    }

    /// A player's drawn initiative.
    pub fn initiative(&self, player_id: &str) -> String {
        format!("{}.initiative.{player_id}", self.namespace)
    }

    /// A player's turn actions.
    pub fn turn_actions(&self, player_id: &str) -> String {
        format!("{}.turnActions.{player_id}", self.namespace)
    }

    /// Whether an initiative round is running.
    pub fn round_active(&self) -> String {
        format!("{}.initiativeRound.active", self.namespace)
    }

    /// Undrawn initiative values.
    pub fn round_pool(&self) -> String {
        format!("{}.initiativeRound.pool", self.namespace)
    }

    /// The NPC list.
    pub fn npcs(&self) -> String {
        format!("{}.npcs", self.namespace)
    }

    /// The turn counter.
    pub fn turn_counter(&self) -> String {
        format!("{}.turnCounter", self.namespace)
    }

    /// The scene challenge record.
    pub fn scene_challenge(&self) -> String {
        format!("{}.sceneChallenge", self.namespace)
    }

    /// A player's character sheet.
    pub fn character(&self, player_id: &str) -> String {
        format!("{}/character/{player_id}", self.plugin_id)
    }

    /// Token metadata key holding the linked character id.
    pub fn token_character_id(&self) -> String {
        format!("{}.characterId", self.namespace)
    }

    /// Token metadata key holding the linked character name.
    pub fn token_character_name(&self) -> String {
        format!("{}.characterName", self.namespace)
    }
}

/// Returns true if an initiative identity names an NPC.
pub fn is_npc_id(id: &str) -> bool {
    id.starts_with(NPC_ID_PREFIX)
}
