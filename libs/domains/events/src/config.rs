use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_flag, env_parse};

pub const DEFAULT_TICK_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interval between sweeps for due events
    pub tick: Duration,
    /// `None` leaves the registry unbounded
    pub max_pending_events: Option<usize>,
    /// Publish an expiring announcement when an event is created
    pub announce_on_create: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            max_pending_events: None,
            announce_on_create: true,
        }
    }
}

impl SchedulerConfig {
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_max_pending_events(mut self, limit: usize) -> Self {
        self.max_pending_events = (limit > 0).then_some(limit);
        self
    }

    pub fn with_announce_on_create(mut self, enabled: bool) -> Self {
        self.announce_on_create = enabled;
        self
    }
}

impl FromEnv for SchedulerConfig {
    /// Reads SCHEDULER_TICK_MS, SCHEDULER_MAX_PENDING_EVENTS (0 = unbounded)
    /// and SCHEDULER_ANNOUNCE_ON_CREATE
    fn from_env() -> Result<Self, ConfigError> {
        let tick_ms: u64 = env_parse("SCHEDULER_TICK_MS", DEFAULT_TICK_MS)?;
        if tick_ms == 0 {
            return Err(ConfigError::ParseError {
                key: "SCHEDULER_TICK_MS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        let max_pending: usize = env_parse("SCHEDULER_MAX_PENDING_EVENTS", 0)?;

        Ok(Self::default()
            .with_tick(Duration::from_millis(tick_ms))
            .with_max_pending_events(max_pending)
            .with_announce_on_create(env_flag("SCHEDULER_ANNOUNCE_ON_CREATE", true)))
    }
}
