//! MySQL adapter.
//!
//! Strategy rule: a host (or URL) change is the only trigger for a full
//! reconnect; any other change, schema search path included, is satisfied
//! by a lightweight `USE` on the shared host pool.

use crate::adapter::{DriverAdapter, SwitchStrategy, UseDatabaseError};
use crate::config::{Difference, TenantConfig};
use crate::driver::DatabaseDriver;
use crate::error::DriverError;
use crate::tenant::TenantRef;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Registry key prefix, keeping owner names out of application key space.
const OWNER_PREFIX: &str = "_commutator";

/// MySQL's identifier length limit for database names.
const MAX_DATABASE_NAME_BYTES: usize = 64;

/// MySQL implementation of the switching hooks.
pub struct MysqlAdapter;

impl MysqlAdapter {
    /// Create a new adapter.
    pub fn new() -> Self {
        Self
    }

    fn host_digest(config: &TenantConfig) -> String {
        let identity = config
            .host
            .as_deref()
            .or(config.url.as_deref())
            .unwrap_or("127.0.0.1");
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn config_digest(config: &TenantConfig) -> String {
        let mut hasher = Sha256::new();
        // Fixed field order, NUL separators, options in BTreeMap order:
        // equal configs always hash identically.
        for part in [
            &config.adapter,
            &config.host,
            &config.username,
            &config.password,
            &config.database,
            &config.schema_search_path,
            &config.url,
        ] {
            hasher.update(part.as_deref().unwrap_or("").as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(config.port.unwrap_or(0).to_be_bytes());
        for (key, value) in &config.options {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            hasher.update(value.to_string().as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    fn valid_database_name(name: &str) -> bool {
        !name.is_empty() && name.len() <= MAX_DATABASE_NAME_BYTES && !name.contains(['/', '\\'])
    }
}

impl Default for MysqlAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: DatabaseDriver> DriverAdapter<D> for MysqlAdapter {
    fn select_switch_strategy(&self, difference: &Difference) -> SwitchStrategy {
        if difference.host_changed() {
            SwitchStrategy::FullReconnect
        } else {
            SwitchStrategy::Lightweight
        }
    }

    fn derive_pool_owner_name(&self, config: &TenantConfig, pool_per_config: bool) -> String {
        if pool_per_config {
            let digest = Self::config_digest(config);
            format!("{OWNER_PREFIX}_{}", &digest[..12])
        } else {
            let digest = Self::host_digest(config);
            let adapter = config.adapter.as_deref().unwrap_or("mysql");
            format!("{OWNER_PREFIX}_{}_{}", &digest[..12], adapter)
        }
    }

    fn validate_tenant_identifier(&self, tenant: &TenantRef) -> bool {
        match tenant {
            TenantRef::Named(name) => Self::valid_database_name(name),
            TenantRef::Config(config) => config
                .database
                .as_deref()
                .map(Self::valid_database_name)
                .unwrap_or(false),
        }
    }

    async fn create_tenant_storage(
        &self,
        driver: &D,
        pool: &D::Pool,
        config: &TenantConfig,
    ) -> Result<(), DriverError> {
        let database = config.database.as_deref().ok_or_else(|| {
            DriverError::Statement("Cannot create tenant storage without a database name".to_string())
        })?;
        driver.create_database(pool, database, config).await
    }

    async fn issue_use_database(
        &self,
        driver: &D,
        pool: &D::Pool,
        config: &TenantConfig,
    ) -> Result<(), UseDatabaseError> {
        let Some(database) = config.database.as_deref() else {
            // Host-scoped config; MySQL has no schema search path to apply.
            return Ok(());
        };

        match driver.execute(pool, &format!("USE `{database}`")).await {
            Ok(()) => Ok(()),
            Err(DriverError::UnknownDatabase(_)) => {
                Err(UseDatabaseError::Missing(database.to_string()))
            }
            Err(other) => Err(UseDatabaseError::Broken(other)),
        }
    }

    async fn database_exists(
        &self,
        driver: &D,
        pool: &D::Pool,
        database: &str,
    ) -> Result<bool, DriverError> {
        driver.database_exists(pool, database).await
    }
}
