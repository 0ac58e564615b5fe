//! Database driver capability interface.
//!
//! The switching engine never embeds driver logic; everything physical goes
//! through this trait. Implement it with your database client of choice and
//! hand the implementation to the engine.
//!
//! ```rust,ignore
//! use commutator::{DatabaseDriver, DriverError, TenantConfig};
//!
//! struct MysqlDriver {
//!     // your client handle
//! }
//!
//! #[async_trait::async_trait]
//! impl DatabaseDriver for MysqlDriver {
//!     type Pool = mysql_async::Pool;
//!
//!     async fn establish_pool(
//!         &self,
//!         config: &TenantConfig,
//!         owner_name: &str,
//!     ) -> Result<Self::Pool, DriverError> {
//!         // connect using config.host / config.url / credentials
//!     }
//!
//!     // ... remaining primitives
//! }
//! ```

use crate::config::TenantConfig;
use crate::error::DriverError;
use async_trait::async_trait;

/// Primitive operations a database backend must supply.
///
/// Pool storage and reuse (retrieve/remove by owner name) live in the
/// engine-owned [`PoolRegistry`](crate::registry::PoolRegistry); the driver
/// only knows how to physically connect and execute.
#[async_trait]
pub trait DatabaseDriver: Send + Sync + 'static {
    /// The connection pool type (e.g. `mysql_async::Pool`, `sqlx::MySqlPool`).
    type Pool: Send + Sync + 'static;

    /// Physically connect a pool for the given config.
    ///
    /// `owner_name` identifies the registry entry this pool will live under;
    /// drivers may use it for connection labeling.
    async fn establish_pool(
        &self,
        config: &TenantConfig,
        owner_name: &str,
    ) -> Result<Self::Pool, DriverError>;

    /// Execute a statement, discarding any result set.
    async fn execute(&self, pool: &Self::Pool, statement: &str) -> Result<(), DriverError>;

    /// Create a database.
    async fn create_database(
        &self,
        pool: &Self::Pool,
        database: &str,
        config: &TenantConfig,
    ) -> Result<(), DriverError>;

    /// Drop a database.
    async fn drop_database(&self, pool: &Self::Pool, database: &str) -> Result<(), DriverError>;

    /// Check whether a database exists.
    async fn database_exists(
        &self,
        pool: &Self::Pool,
        database: &str,
    ) -> Result<bool, DriverError>;

    /// Clear any statement/query cache attached to the pool.
    ///
    /// Backends without one can keep the default no-op.
    async fn clear_query_cache(&self, pool: &Self::Pool) -> Result<(), DriverError> {
        let _ = pool;
        Ok(())
    }
}
