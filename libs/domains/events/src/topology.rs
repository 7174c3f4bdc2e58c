//! Exchange and per-sender queue declarations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use messaging::Broker;
use tracing::{debug, info, instrument};

use crate::error::EventResult;
use crate::models::SenderId;

/// Upper bound on remembered senders. Any caller can claim any id, so the
/// cache is cleared when full; the next call per sender just re-declares.
pub const MAX_REMEMBERED_SENDERS: usize = 10_000;

/// Makes sure a sender's queue exists and is bound before anything is
/// published for it.
///
/// Declarations are idempotent on the broker side; senders already declared
/// by this process are remembered so repeat calls skip the round trip.
pub struct TopologyManager {
    broker: Arc<dyn Broker>,
    declared: Mutex<HashSet<SenderId>>,
    max_remembered: usize,
}

impl TopologyManager {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self::with_cache_limit(broker, MAX_REMEMBERED_SENDERS)
    }

    pub fn with_cache_limit(broker: Arc<dyn Broker>, max_remembered: usize) -> Self {
        Self {
            broker,
            declared: Mutex::default(),
            max_remembered: max_remembered.max(1),
        }
    }

    /// Declare the shared exchange. Called once at startup.
    pub async fn ensure_exchange(&self) -> EventResult<()> {
        self.broker.declare_exchange().await?;
        info!("Exchange declared");
        Ok(())
    }

    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn ensure_sender(&self, sender_id: SenderId) -> EventResult<()> {
        if self.is_declared(sender_id) {
            debug!("Sender queue already declared");
            return Ok(());
        }

        self.broker
            .declare_queue(&sender_id.queue_name(), &sender_id.routing_key())
            .await?;

        {
            let mut declared = self
                .declared
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if declared.len() >= self.max_remembered {
                debug!(remembered = declared.len(), "Sender cache full, clearing");
                declared.clear();
            }
            declared.insert(sender_id);
        }
        info!(queue = %sender_id.queue_name(), "Sender queue bound");
        Ok(())
    }

    pub fn is_declared(&self, sender_id: SenderId) -> bool {
        self.declared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&sender_id)
    }
}
