//! Exchange settings for the JetStream backend.

use core_config::{env_flag, env_or_default, ConfigError, FromEnv};

pub const DEFAULT_STREAM_NAME: &str = "EVENTS";
pub const DEFAULT_SUBJECT_PREFIX: &str = "events";

/// How the exchange maps onto JetStream.
///
/// The exchange is one stream capturing `<prefix>.>`; a routing key `k`
/// becomes the subject `<prefix>.k` and a queue becomes a durable pull
/// consumer filtered on that subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub stream_name: String,
    pub subject_prefix: String,
    /// Attach `Nats-TTL` headers. The stream must allow per-message TTLs
    /// (NATS 2.11+), otherwise the server rejects those publishes.
    pub message_ttl: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            message_ttl: false,
        }
    }
}

impl ExchangeConfig {
    pub fn new(stream_name: impl Into<String>, subject_prefix: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            subject_prefix: subject_prefix.into(),
            message_ttl: false,
        }
    }

    pub fn with_message_ttl(mut self, enabled: bool) -> Self {
        self.message_ttl = enabled;
        self
    }

    /// Subject a routing key is published on
    pub fn subject_for(&self, routing_key: &str) -> String {
        format!("{}.{}", self.subject_prefix, routing_key)
    }

    /// Wildcard the stream captures
    pub fn stream_subjects(&self) -> String {
        format!("{}.>", self.subject_prefix)
    }
}

impl FromEnv for ExchangeConfig {
    /// Reads EVENTS_STREAM, EVENTS_SUBJECT_PREFIX and EVENTS_MESSAGE_TTL
    fn from_env() -> Result<Self, ConfigError> {
        let subject_prefix = env_or_default("EVENTS_SUBJECT_PREFIX", DEFAULT_SUBJECT_PREFIX);
        let has_wildcard = subject_prefix.contains(|c: char| matches!(c, '*' | '>' | ' '));
        if subject_prefix.is_empty() || has_wildcard {
            return Err(ConfigError::ParseError {
                key: "EVENTS_SUBJECT_PREFIX".to_string(),
                details: format!("'{}' is not a literal subject token", subject_prefix),
            });
        }

        Ok(Self {
            stream_name: env_or_default("EVENTS_STREAM", DEFAULT_STREAM_NAME),
            subject_prefix,
            message_ttl: env_flag("EVENTS_MESSAGE_TTL", false),
        })
    }
}
