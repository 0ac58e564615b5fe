//! Driver-specific switching hooks.
//!
//! The engine owns state, diffing, and failure recovery; everything that
//! depends on the database engine's dialect goes through [`DriverAdapter`].
//! Supporting a new engine means implementing this trait, nothing else.

use crate::config::{Difference, TenantConfig};
use crate::driver::DatabaseDriver;
use crate::error::DriverError;
use crate::tenant::TenantRef;
use async_trait::async_trait;
use thiserror::Error;

/// How a switch should reach its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStrategy {
    /// Bind the worker to the pool for the target's owner name.
    FullReconnect,
    /// Issue a "use database" statement on the already-bound pool.
    Lightweight,
}

/// Failure classification for the lightweight switch primitive.
#[derive(Error, Debug)]
pub enum UseDatabaseError {
    /// The target database does not exist.
    #[error("Target database absent: {0}")]
    Missing(String),

    /// The pool is stale or broken; worth one reconnect-and-retry.
    #[error("Connection unusable: {0}")]
    Broken(#[source] DriverError),
}

/// Driver-specific hook contract the engine is generic over.
#[async_trait]
pub trait DriverAdapter<D: DatabaseDriver>: Send + Sync + 'static {
    /// Pick the cheapest valid strategy for the given difference.
    fn select_switch_strategy(&self, difference: &Difference) -> SwitchStrategy;

    /// Pool registry key for a config.
    ///
    /// Must be a pure function of the parts of the config relevant to
    /// physical connectivity, so every tenant on one host derives the same
    /// key. With `pool_per_config` the key covers the whole config and
    /// tenants share a pool only when their configs match exactly.
    fn derive_pool_owner_name(&self, config: &TenantConfig, pool_per_config: bool) -> String;

    /// Guard against identifier injection before any physical operation.
    fn validate_tenant_identifier(&self, tenant: &TenantRef) -> bool;

    /// Physically create the tenant's database/schema.
    async fn create_tenant_storage(
        &self,
        driver: &D,
        pool: &D::Pool,
        config: &TenantConfig,
    ) -> Result<(), DriverError>;

    /// The lightweight per-request switch primitive.
    ///
    /// Implementations decide, on failure, whether the target database is
    /// truly absent ([`UseDatabaseError::Missing`]) or the pool is unusable
    /// and worth a reconnect ([`UseDatabaseError::Broken`]).
    async fn issue_use_database(
        &self,
        driver: &D,
        pool: &D::Pool,
        config: &TenantConfig,
    ) -> Result<(), UseDatabaseError>;

    /// Whether the named database exists.
    async fn database_exists(
        &self,
        driver: &D,
        pool: &D::Pool,
        database: &str,
    ) -> Result<bool, DriverError>;
}
