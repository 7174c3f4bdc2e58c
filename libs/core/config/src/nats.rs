use crate::{env_or_default, ConfigError, FromEnv};

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
pub const DEFAULT_CONNECTION_NAME: &str = "event-scheduler";

/// NATS connection configuration
#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub url: String,
    pub connection_name: String,
}

impl NatsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_name: DEFAULT_CONNECTION_NAME.to_string(),
        }
    }

    pub fn with_connection_name(mut self, name: impl Into<String>) -> Self {
        self.connection_name = name.into();
        self
    }
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NATS_URL)
    }
}

impl FromEnv for NatsConfig {
    /// Reads NATS_URL and NATS_CONNECTION_NAME, both optional
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("NATS_URL", DEFAULT_NATS_URL),
            connection_name: env_or_default("NATS_CONNECTION_NAME", DEFAULT_CONNECTION_NAME),
        })
    }
}
