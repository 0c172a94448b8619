//! Scene configuration.

use std::time::Duration;

use crate::keys::Keys;

/// Configuration shared by every scene service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    /// Prefix for scene metadata keys.
    pub namespace: String,
    /// Plugin id that prefixes character keys.
    pub plugin_id: String,
    /// Broadcast channel for rolls, panics, and assistance.
    pub channel: String,
    /// Number of initiative values in a fresh pool (1..=pool_size).
    pub pool_size: u32,
    /// How long a notification stays up before it is dismissed.
    pub dismiss_delay: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            namespace: "streetwise".to_string(),
            plugin_id: "com.streetwise.character-sheet".to_string(),
            channel: "com.streetwise/rolls".to_string(),
            pool_size: 10,
            dismiss_delay: Duration::from_secs(5),
        }
    }
}

impl SceneConfig {
    /// Set the metadata key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the character plugin id.
    pub fn with_plugin_id(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_id = plugin_id.into();
        self
    }

    /// Set the broadcast channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the initiative pool size (at least 1).
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Set the notification dismiss delay.
    pub fn with_dismiss_delay(mut self, delay: Duration) -> Self {
        self.dismiss_delay = delay;
        self
    }

    /// A fresh initiative pool, sorted ascending.
    pub fn fresh_pool(&self) -> Vec<u32> {
        (1..=self.pool_size).collect()
    }

    /// Metadata key builder for this configuration.
    pub fn keys(&self) -> Keys {
        Keys::new(&self.namespace, &self.plugin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.namespace, "streetwise");
        assert_eq!(cfg.channel, "com.streetwise/rolls");
        assert_eq!(cfg.fresh_pool(), (1..=10).collect::<Vec<_>>());
        assert_eq!(cfg.dismiss_delay, Duration::from_secs(5));
    }

    #[test]
    fn builder_overrides() {
        let cfg = SceneConfig::default()
            .with_namespace("test")
            .with_channel("test/rolls")
            .with_pool_size(0);
        assert_eq!(cfg.namespace, "test");
        assert_eq!(cfg.channel, "test/rolls");
        assert_eq!(cfg.fresh_pool(), vec![1]);
    }
}
