use std::sync::Arc;

use messaging::Broker;
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::error::EventResult;
use crate::store::EventStore;
use crate::topology::TopologyManager;

/// Everything the request handlers and the scheduler share.
///
/// Built once at startup and handed around as `Arc<SchedulerContext>`.
/// Dropping the last reference drops the broker handle.
pub struct SchedulerContext {
    pub store: EventStore,
    pub topology: TopologyManager,
    pub broker: Arc<dyn Broker>,
    pub config: SchedulerConfig,
    /// Unique per context. Event ids restart at 1 on every boot while the
    /// broker's de-duplication window outlives the process, so message ids
    /// carry this too.
    pub instance_id: Uuid,
}

impl SchedulerContext {
    pub fn new(broker: Arc<dyn Broker>, config: SchedulerConfig) -> Arc<Self> {
        Arc::new(Self {
            store: EventStore::with_capacity_limit(config.max_pending_events),
            topology: TopologyManager::new(Arc::clone(&broker)),
            broker,
            config,
            instance_id: Uuid::now_v7(),
        })
    }

    /// Declare the shared exchange; must succeed before serving requests.
    pub async fn init(&self) -> EventResult<()> {
        self.topology.ensure_exchange().await
    }
}
