//! Single-slot agent cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::Result;
use crate::orchestrator::Connect;

/// Holds at most one connected agent.
///
/// The first [`get_or_connect`](Self::get_or_connect) builds the agent; later
/// calls reuse it until [`invalidate`](Self::invalidate). Concurrent first
/// calls wait on the slot lock, so only one build happens.
pub struct AgentCache<C: Connect> {
    connector: C,
    slot: Mutex<Option<Arc<C::Agent>>>,
    builds: AtomicUsize,
}

impl<C: Connect> AgentCache<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            slot: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    /// Return the cached agent, building it first if the slot is empty.
    pub async fn get_or_connect(&self) -> Result<Arc<C::Agent>> {
        let mut slot = self.slot.lock().await;
        if let Some(agent) = slot.as_ref() {
            return Ok(Arc::clone(agent));
        }

        let agent = Arc::new(self.connector.connect().await?);
        let builds = self.builds.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(builds, "agent connected");
        *slot = Some(Arc::clone(&agent));
        Ok(agent)
    }

    /// The cached agent, without building one.
    pub async fn cached(&self) -> Option<Arc<C::Agent>> {
        self.slot.lock().await.clone()
    }

    /// Drop the cached agent. The next `get_or_connect` rebuilds.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    /// How many times an agent has been built.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingConnector;

    #[tokio::test]
    async fn builds_once_until_invalidated() {
        let cache = AgentCache::new(CountingConnector::default());
        assert!(cache.cached().await.is_none());

        let first = cache.get_or_connect().await.unwrap();
        let second = cache.get_or_connect().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);

        cache.invalidate().await;
        assert!(cache.cached().await.is_none());

        let third = cache.get_or_connect().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.builds(), 2);
    }

    #[tokio::test]
    async fn concurrent_first_access_builds_once() {
        let cache = AgentCache::new(CountingConnector::default());
        let (a, b) = tokio::join!(cache.get_or_connect(), cache.get_or_connect());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(cache.builds(), 1);
    }

    #[tokio::test]
    async fn failed_build_leaves_slot_empty() {
        let cache = AgentCache::new(CountingConnector::failing());
        assert!(cache.get_or_connect().await.is_err());
        assert!(cache.cached().await.is_none());
        assert_eq!(cache.builds(), 0);
    }
}
