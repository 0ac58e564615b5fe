//! Multi-Tenant Database Switching and Provisioning
//!
//! `commutator` routes database operations to the right tenant: it resolves a
//! logical tenant name to a physical connection target, switches to it over the
//! cheapest valid strategy, and restores the previous target afterward. It also
//! orchestrates tenant lifecycle operations: provisioning a new tenant's
//! storage (create database, load base schema, seed data) and tearing one down.
//!
//! # Features
//!
//! - 🔀 **Strategy Selection** - Lightweight `USE` vs. full reconnect, chosen per config diff
//! - 🧭 **Scoped Switches** - Run a closure inside a tenant, restore afterwards
//! - 🏊 **Shared Pooling** - One pool per host, reused across every tenant on it
//! - 🏗️ **Tenant Provisioning** - Create database, import schema, seed data
//! - 🗑️ **Tenant Teardown** - Drop a tenant's storage, previous tenant restored
//! - 🛟 **Failure Recovery** - Retry-with-reconnect, layered restoration fallbacks
//! - 🔔 **Lifecycle Hooks** - Before/after notifications around switch and create
//! - 🔌 **Pluggable Drivers** - Bring your own database client and resolver
//!
//! # Quick Start
//!
//! ## 1. Implement the Driver (with your database client)
//!
//! ```rust,ignore
//! use commutator::*;
//!
//! struct MyDriver {
//!     // your client handle
//! }
//!
//! #[async_trait]
//! impl DatabaseDriver for MyDriver {
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
//!     // ... implement the remaining primitives
//! }
//! ```
//!
//! ## 2. Set Up the Switching Engine
//!
//! ```rust,ignore
//! use commutator::*;
//!
//! // Tenants resolve from a base config; "acme" becomes database `acme`
//! let resolver = StaticTenantResolver::new(
//!     TenantConfig::new().with_adapter("mysql").with_host("db.internal"),
//! );
//!
//! let switcher = TenantSwitcher::new(
//!     Arc::new(MyDriver::new()),
//!     Arc::new(MysqlAdapter::new()),
//!     Arc::new(resolver),
//!     SwitcherConfig::new("primary"),
//! );
//! switcher.init().await;
//! ```
//!
//! ## 3. Switch Between Tenants
//!
//! ```rust,ignore
//! // Unconditional switch; the pool now serves the tenant
//! let pool = switcher.switch("acme").await?;
//!
//! // Scoped switch: restored even if the body fails
//! switcher
//!     .with_tenant("acme", |pool| async move {
//!         // queries against pool run inside the acme tenant
//!     })
//!     .await?;
//! ```
//!
//! ## 4. Provision and Tear Down Tenants
//!
//! ```rust,ignore
//! let config = SwitcherConfig::new("primary")
//!     .with_schema_file("db/schema.sql")
//!     .with_seed_file("db/seeds.sql")
//!     .with_seed_after_create(true);
//!
//! // Creates the database, loads schema and seeds, switches back
//! switcher.create("acme").await?;
//!
//! // Drops the database; dropping an unknown tenant is an error
//! switcher.drop("acme").await?;
//! ```
//!
//! ## 5. Observe Lifecycle Events
//!
//! ```rust,ignore
//! struct AuditTrail;
//!
//! #[async_trait]
//! impl LifecycleObserver for AuditTrail {
//!     async fn on_event(&self, event: &LifecycleEvent) {
//!         println!("{:?} {:?} tenant={}", event.phase, event.operation, event.tenant);
//!     }
//! }
//!
//! switcher.hooks().register(Arc::new(AuditTrail));
//! ```
//!
//! # Concurrency Model
//!
//! Each logical worker owns one [`TenantSwitcher`] (its own current tenant and
//! pool binding); the [`PoolRegistry`] is the one structure genuinely shared
//! between workers:
//!
//! ```rust,ignore
//! let registry = Arc::new(PoolRegistry::new());
//!
//! let worker_a = TenantSwitcher::new(driver.clone(), adapter.clone(), resolver.clone(), cfg.clone())
//!     .with_registry(registry.clone());
//! let worker_b = TenantSwitcher::new(driver, adapter, resolver, cfg)
//!     .with_registry(registry);
//! ```

pub mod adapter;
pub mod config;
pub mod driver;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod mysql;
pub mod registry;
pub mod resolver;
pub mod switcher;
pub mod tenant;

pub use adapter::{DriverAdapter, SwitchStrategy, UseDatabaseError};
pub use config::{ConfigField, Difference, TenantConfig};
pub use driver::DatabaseDriver;
pub use error::{DriverError, LoaderError, TenantError, TenantResult};
pub use hooks::{
    LifecycleEvent, LifecycleHooks, LifecycleObserver, LifecycleOperation, LifecyclePhase,
};
pub use loader::{SchemaLoader, SqlFileLoader};
pub use mysql::MysqlAdapter;
pub use registry::PoolRegistry;
pub use resolver::{StaticTenantResolver, TenantResolver};
pub use switcher::{CurrentTenant, SwitcherConfig, TenantSwitcher};
pub use tenant::TenantRef;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::{DriverAdapter, SwitchStrategy, UseDatabaseError};
    pub use crate::config::{ConfigField, Difference, TenantConfig};
    pub use crate::driver::DatabaseDriver;
    pub use crate::error::{DriverError, TenantError, TenantResult};
    pub use crate::hooks::{LifecycleEvent, LifecycleHooks, LifecycleObserver};
    pub use crate::loader::{SchemaLoader, SqlFileLoader};
    pub use crate::mysql::MysqlAdapter;
    pub use crate::registry::PoolRegistry;
    pub use crate::resolver::{StaticTenantResolver, TenantResolver};
    pub use crate::switcher::{SwitcherConfig, TenantSwitcher};
    pub use crate::tenant::TenantRef;
}
