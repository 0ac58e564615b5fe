//! Connection pool registry.
//!
//! One registry is shared by every worker's switching engine. Pools are
//! keyed by an owner name derived from the target's physical identity, so
//! tenants on the same host share one pool and a switch between them never
//! reconnects. Entries are established lazily and removed only by an
//! explicit reconnect.

use crate::config::TenantConfig;
use crate::driver::DatabaseDriver;
use crate::error::DriverError;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Owner-name keyed map of live connection pools.
///
/// Establishment is idempotent under concurrent callers: at most one pool
/// per owner name, first caller wins, the rest reuse it.
pub struct PoolRegistry<D: DatabaseDriver> {
    pools: DashMap<String, Arc<OnceCell<Arc<D::Pool>>>>,
}

impl<D: DatabaseDriver> PoolRegistry<D> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
        }
    }

    /// Get the pool for `owner_name`, establishing it on first use.
    ///
    /// Concurrent callers for the same owner name race on a per-owner cell;
    /// exactly one runs the driver connect, the others wait and reuse the
    /// winner's pool. A failed establishment leaves the entry empty so a
    /// later call can retry.
    pub async fn establish(
        &self,
        driver: &D,
        config: &TenantConfig,
        owner_name: &str,
    ) -> Result<Arc<D::Pool>, DriverError> {
        let cell = self.pools.entry(owner_name.to_string()).or_default().clone();

        let pool = cell
            .get_or_try_init(|| async {
                debug!(owner = owner_name, "Establishing connection pool");
                driver.establish_pool(config, owner_name).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(pool))
    }

    /// The established pool for `owner_name`, if any.
    pub fn retrieve(&self, owner_name: &str) -> Option<Arc<D::Pool>> {
        self.pools
            .get(owner_name)
            .and_then(|cell| cell.get().cloned())
    }

    /// Drop the entry for `owner_name` so the next establish reconnects.
    ///
    /// Returns whether an entry was present. Workers holding the old pool
    /// keep it alive until they re-fetch.
    pub fn remove(&self, owner_name: &str) -> bool {
        let removed = self.pools.remove(owner_name).is_some();
        if removed {
            debug!(owner = owner_name, "Removed connection pool");
        }
        removed
    }

    /// Whether an established pool exists for `owner_name`.
    pub fn contains(&self, owner_name: &str) -> bool {
        self.retrieve(owner_name).is_some()
    }

    /// Number of established pools.
    pub fn len(&self) -> usize {
        self.pools
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Whether no pool has been established.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owner names with an established pool, in no particular order.
    pub fn owner_names(&self) -> Vec<String> {
        self.pools
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl<D: DatabaseDriver> Default for PoolRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
