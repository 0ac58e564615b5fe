//! The tenant switching engine.
//!
//! A [`TenantSwitcher`] owns one worker's view of "which tenant am I on"
//! and orchestrates switches, scoped switches, and tenant provisioning
//! through a [`DatabaseDriver`] and a [`DriverAdapter`]. Workers each hold
//! their own switcher; the [`PoolRegistry`] is the one piece genuinely
//! shared between them.

use crate::adapter::{DriverAdapter, SwitchStrategy, UseDatabaseError};
use crate::config::{ConfigField, Difference, TenantConfig};
use crate::driver::DatabaseDriver;
use crate::error::{DriverError, TenantError, TenantResult};
use crate::hooks::{LifecycleEvent, LifecycleHooks, LifecycleOperation, LifecyclePhase};
use crate::loader::{SchemaLoader, SqlFileLoader};
use crate::registry::PoolRegistry;
use crate::resolver::TenantResolver;
use crate::tenant::TenantRef;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Engine configuration.
///
/// # Examples
///
/// ```rust,ignore
/// let config = SwitcherConfig::new("primary")
///     .with_schema_file("db/schema.sql")
///     .with_seed_file("db/seeds.sql")
///     .with_seed_after_create(true);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitcherConfig {
    /// Tenant `reset()` switches to; also the last-resort restoration target.
    #[serde(default = "default_tenant_name")]
    pub default_tenant: String,

    /// Route every switch through the full-reconnect path instead of
    /// trusting the currently bound pool.
    #[serde(default)]
    pub force_reconnect_on_switch: bool,

    /// Key pools by exact config identity instead of host identity.
    ///
    /// Each distinct tenant config then gets its own registry entry, and
    /// every switch takes the reconnect path.
    #[serde(default)]
    pub pool_per_config: bool,

    /// Load the seed data file at the end of `create`.
    #[serde(default)]
    pub seed_after_create: bool,

    /// Base schema loaded into every newly created tenant.
    #[serde(default)]
    pub database_schema_file: Option<PathBuf>,

    /// Seed data for [`TenantSwitcher::seed`] and post-create seeding.
    #[serde(default)]
    pub seed_data_file: Option<PathBuf>,
}

fn default_tenant_name() -> String {
    "public".to_string()
}

impl SwitcherConfig {
    /// Create a configuration with the given default tenant.
    pub fn new(default_tenant: impl Into<String>) -> Self {
        Self {
            default_tenant: default_tenant.into(),
            force_reconnect_on_switch: false,
            pool_per_config: false,
            seed_after_create: false,
            database_schema_file: None,
            seed_data_file: None,
        }
    }

    /// Route every switch through the full-reconnect path.
    pub fn with_force_reconnect(mut self, force: bool) -> Self {
        self.force_reconnect_on_switch = force;
        self
    }

    /// Key pools by exact config identity.
    pub fn with_pool_per_config(mut self, per_config: bool) -> Self {
        self.pool_per_config = per_config;
        self
    }

    /// Load seed data at the end of `create`.
    pub fn with_seed_after_create(mut self, seed: bool) -> Self {
        self.seed_after_create = seed;
        self
    }

    /// Set the base schema file.
    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_schema_file = Some(path.into());
        self
    }

    /// Set the seed data file.
    pub fn with_seed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_data_file = Some(path.into());
        self
    }
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self::new(default_tenant_name())
    }
}

/// The engine's record of the last successfully committed switch.
#[derive(Debug, Clone)]
pub struct CurrentTenant {
    tenant: TenantRef,
    config: TenantConfig,
}

impl CurrentTenant {
    /// The tenant that was switched to.
    pub fn tenant(&self) -> &TenantRef {
        &self.tenant
    }

    /// The resolved config the switch committed.
    pub fn config(&self) -> &TenantConfig {
        &self.config
    }
}

/// One worker's switching state. Critical sections stay short and never
/// span an await.
#[derive(Debug, Clone, Default)]
struct WorkerState {
    current: Option<CurrentTenant>,
    active_owner: Option<String>,
}

type StateSnapshot = (Option<CurrentTenant>, Option<String>);

/// The tenant switching engine.
///
/// # Examples
///
/// ```rust,ignore
/// use commutator::{
///     MysqlAdapter, StaticTenantResolver, SwitcherConfig, TenantConfig, TenantSwitcher,
/// };
///
/// let resolver = StaticTenantResolver::new(
///     TenantConfig::new().with_host("db.internal").with_adapter("mysql"),
/// );
/// let switcher = TenantSwitcher::new(
///     Arc::new(driver),
///     Arc::new(MysqlAdapter::new()),
///     Arc::new(resolver),
///     SwitcherConfig::new("primary"),
/// );
/// switcher.init().await;
///
/// switcher
///     .with_tenant("acme", |pool| async move {
///         // queries against pool run inside the acme tenant
///     })
///     .await?;
/// ```
pub struct TenantSwitcher<D: DatabaseDriver, A: DriverAdapter<D>> {
    driver: Arc<D>,
    adapter: Arc<A>,
    resolver: Arc<dyn TenantResolver>,
    loader: Arc<dyn SchemaLoader<D>>,
    registry: Arc<PoolRegistry<D>>,
    hooks: Arc<LifecycleHooks>,
    config: SwitcherConfig,
    state: Mutex<WorkerState>,
}

impl<D: DatabaseDriver, A: DriverAdapter<D>> TenantSwitcher<D, A> {
    /// Create an engine with its own pool registry, a [`SqlFileLoader`],
    /// and no observers.
    pub fn new(
        driver: Arc<D>,
        adapter: Arc<A>,
        resolver: Arc<dyn TenantResolver>,
        config: SwitcherConfig,
    ) -> Self {
        Self {
            driver,
            adapter,
            resolver,
            loader: Arc::new(SqlFileLoader::new()),
            registry: Arc::new(PoolRegistry::new()),
            hooks: Arc::new(LifecycleHooks::new()),
            config,
            state: Mutex::new(WorkerState::default()),
        }
    }

    /// Share a pool registry with other workers' engines.
    pub fn with_registry(mut self, registry: Arc<PoolRegistry<D>>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the schema/seed loader.
    pub fn with_loader(mut self, loader: Arc<dyn SchemaLoader<D>>) -> Self {
        self.loader = loader;
        self
    }

    /// Share a lifecycle observer registry.
    pub fn with_hooks(mut self, hooks: Arc<LifecycleHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The active tenant, if any.
    pub fn current(&self) -> Option<TenantRef> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|current| current.tenant.clone())
    }

    /// The full record of the active tenant, if any.
    pub fn current_tenant(&self) -> Option<CurrentTenant> {
        self.state.lock().current.clone()
    }

    /// The shared pool registry.
    pub fn registry(&self) -> Arc<PoolRegistry<D>> {
        Arc::clone(&self.registry)
    }

    /// The lifecycle observer registry.
    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// The engine configuration.
    pub fn config(&self) -> &SwitcherConfig {
        &self.config
    }

    /// Connect to the default tenant.
    ///
    /// An unreachable default tenant is downgraded to a warning so a worker
    /// can come up before its database does; the engine stays unusable
    /// until the first successful switch.
    pub async fn init(&self) {
        if let Err(e) = self.reset().await {
            warn!(
                "Unable to connect to default tenant '{}': {}",
                self.config.default_tenant, e
            );
        }
    }

    /// Switch to the default tenant.
    pub async fn reset(&self) -> TenantResult<Arc<D::Pool>> {
        self.switch(self.config.default_tenant.clone()).await
    }

    /// Switch the active tenant unconditionally.
    ///
    /// Returns the pool now serving the tenant. On failure the previous
    /// tenant stays committed and bound.
    pub async fn switch(&self, tenant: impl Into<TenantRef>) -> TenantResult<Arc<D::Pool>> {
        self.switch_ref(tenant.into()).await
    }

    async fn switch_ref(&self, tenant: TenantRef) -> TenantResult<Arc<D::Pool>> {
        self.notify(
            LifecycleOperation::Switch,
            LifecyclePhase::Before,
            tenant.display_name(),
        )
        .await;

        if !self.adapter.validate_tenant_identifier(&tenant) {
            return Err(TenantError::InvalidIdentifier(
                tenant.display_name().to_string(),
            ));
        }

        let config = self.resolve(&tenant).await?;

        let (difference, bound_owner) = {
            let state = self.state.lock();
            (
                Difference::between(state.current.as_ref().map(|c| &c.config), &config),
                state.active_owner.clone(),
            )
        };

        // Per-config pooling never shares a bound pool across configs, so
        // every switch takes the reconnect path.
        let strategy = if self.config.force_reconnect_on_switch || self.config.pool_per_config {
            SwitchStrategy::FullReconnect
        } else {
            self.adapter.select_switch_strategy(&difference)
        };
        debug!(
            "Switching to tenant '{}' via {:?} ({} field(s) changed)",
            tenant,
            strategy,
            difference.len()
        );

        let switched = match strategy {
            SwitchStrategy::FullReconnect => self.full_reconnect_switch(&config).await,
            SwitchStrategy::Lightweight => self.lightweight_switch(&config).await,
        };
        let switched = match switched {
            Ok(pool) => self
                .driver
                .clear_query_cache(&pool)
                .await
                .map_err(|source| TenantError::SwitchFailure {
                    target: switch_target(&config),
                    source,
                })
                .map(|()| pool),
            Err(e) => Err(e),
        };

        let pool = match switched {
            Ok(pool) => pool,
            Err(e) => {
                // Leave the worker bound to whatever it was using before
                // the failed attempt.
                self.state.lock().active_owner = bound_owner;
                return Err(e);
            }
        };

        {
            let mut state = self.state.lock();
            state.current = Some(CurrentTenant {
                tenant: tenant.clone(),
                config,
            });
        }

        self.notify(
            LifecycleOperation::Switch,
            LifecyclePhase::After,
            tenant.display_name(),
        )
        .await;
        Ok(pool)
    }

    /// Run `body` switched into `tenant`, then restore the previous tenant.
    ///
    /// Restoration runs whether `body` returns, panics, or its future is
    /// dropped before completion. If restoring the previous tenant fails,
    /// the engine falls back to the default tenant; if that also fails the
    /// tenant state is cleared and the failure logged, never raised, so
    /// `body`'s own outcome stays visible.
    pub async fn with_tenant<T, F, Fut>(
        &self,
        tenant: impl Into<TenantRef>,
        body: F,
    ) -> TenantResult<T>
    where
        F: FnOnce(Arc<D::Pool>) -> Fut,
        Fut: Future<Output = T>,
    {
        let tenant = tenant.into();
        let snapshot: StateSnapshot = {
            let state = self.state.lock();
            (state.current.clone(), state.active_owner.clone())
        };
        let previous = snapshot.0.as_ref().map(|current| current.tenant.clone());

        let guard = RestoreGuard::new(self, snapshot);

        let pool = match self.switch_ref(tenant).await {
            Ok(pool) => pool,
            Err(e) => {
                // The failed switch left state untouched.
                guard.disarm();
                return Err(e);
            }
        };

        let outcome = AssertUnwindSafe(body(pool)).catch_unwind().await;

        self.restore_previous(previous).await;
        guard.disarm();

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Run `body` once per tenant inside a scoped switch, in order.
    ///
    /// The first error, from a switch or from `body`, aborts the iteration
    /// and propagates.
    pub async fn for_each<I, T, F, Fut>(&self, tenants: I, mut body: F) -> TenantResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantRef>,
        F: FnMut(TenantRef, Arc<D::Pool>) -> Fut,
        Fut: Future<Output = TenantResult<()>>,
    {
        for tenant in tenants {
            let tenant = tenant.into();
            self.with_tenant(tenant.clone(), |pool| body(tenant.clone(), pool))
                .await??;
        }
        Ok(())
    }

    /// Provision a new tenant.
    ///
    /// Creates the physical storage, loads the configured schema file (and
    /// seed file when `seed_after_create` is set), then restores the
    /// previous tenant. Provisioning errors propagate after restoration.
    pub async fn create(&self, tenant: impl Into<TenantRef>) -> TenantResult<()> {
        self.create_with(tenant, |_pool| std::future::ready(TenantResult::Ok(())))
            .await
    }

    /// Provision a new tenant and run `init` while switched into it.
    pub async fn create_with<F, Fut>(
        &self,
        tenant: impl Into<TenantRef>,
        init: F,
    ) -> TenantResult<()>
    where
        F: FnOnce(Arc<D::Pool>) -> Fut,
        Fut: Future<Output = TenantResult<()>>,
    {
        let tenant = tenant.into();
        self.notify(
            LifecycleOperation::Create,
            LifecyclePhase::Before,
            tenant.display_name(),
        )
        .await;

        let previous = self.current();
        let config = self.resolve(&tenant).await?;

        info!("Creating tenant '{}'", tenant);
        let outcome = self.provision(&tenant, &config, init).await;
        self.restore_previous(previous).await;
        outcome?;

        info!("Tenant '{}' created", tenant);
        self.notify(
            LifecycleOperation::Create,
            LifecyclePhase::After,
            tenant.display_name(),
        )
        .await;
        Ok(())
    }

    /// Destroy a tenant's physical storage.
    ///
    /// Dropping a tenant that does not exist fails with
    /// [`TenantError::NotFound`]; it is not a no-op.
    pub async fn drop(&self, tenant: impl Into<TenantRef>) -> TenantResult<()> {
        let tenant = tenant.into();
        let previous = self.current();
        let config = self.resolve(&tenant).await?;

        info!("Dropping tenant '{}'", tenant);
        let outcome = self.drop_storage(&tenant, &config).await;
        self.restore_previous(previous).await;
        outcome
    }

    /// Load the configured seed data file into the active tenant.
    pub async fn seed(&self) -> TenantResult<()> {
        let Some(path) = self.config.seed_data_file.clone() else {
            debug!("No seed data file configured");
            return Ok(());
        };

        let (current, owner) = {
            let state = self.state.lock();
            (state.current.clone(), state.active_owner.clone())
        };
        let Some(current) = current else {
            return Err(TenantError::ProvisioningFailure {
                tenant: "<none>".to_string(),
                reason: "no active tenant to seed".to_string(),
            });
        };
        let pool = owner
            .and_then(|owner| self.registry.retrieve(&owner))
            .ok_or_else(|| TenantError::ProvisioningFailure {
                tenant: current.tenant.display_name().to_string(),
                reason: "no connection pool bound to the active tenant".to_string(),
            })?;

        self.load_into(&current.tenant, pool.as_ref(), &path).await
    }

    async fn resolve(&self, tenant: &TenantRef) -> TenantResult<TenantConfig> {
        match tenant {
            TenantRef::Named(name) => self.resolver.resolve(name).await,
            TenantRef::Config(config) => Ok(config.clone()),
        }
    }

    /// Establish (or reuse) the pool for `config`'s owner name and bind the
    /// worker to it. The physical connection is host-scoped: database and
    /// schema search path are stripped before the driver connects.
    ///
    /// With `reconnect` the existing entry is discarded first.
    async fn establish_and_bind(
        &self,
        config: &TenantConfig,
        reconnect: bool,
    ) -> TenantResult<Arc<D::Pool>> {
        let owner = self
            .adapter
            .derive_pool_owner_name(config, self.config.pool_per_config);
        let neutral = config.without(&[ConfigField::Database, ConfigField::SchemaSearchPath]);

        if reconnect {
            self.registry.remove(&owner);
        }

        let pool = self
            .registry
            .establish(self.driver.as_ref(), &neutral, &owner)
            .await
            .map_err(|source| TenantError::SwitchFailure {
                target: switch_target(config),
                source,
            })?;

        self.state.lock().active_owner = Some(owner);
        Ok(pool)
    }

    /// Issue the "use database" primitive, reconnecting once on a fresh
    /// pool when the adapter reports the current one broken.
    ///
    /// Returns the pool the statement finally succeeded on; callers must
    /// use it instead of the one they passed in.
    async fn use_database(
        &self,
        pool: Arc<D::Pool>,
        config: &TenantConfig,
    ) -> TenantResult<Arc<D::Pool>> {
        let first = self
            .adapter
            .issue_use_database(self.driver.as_ref(), pool.as_ref(), config)
            .await;

        let source = match first {
            Ok(()) => return Ok(pool),
            Err(UseDatabaseError::Missing(database)) => {
                return Err(TenantError::NotFound(database));
            }
            Err(UseDatabaseError::Broken(source)) => source,
        };

        warn!(
            "Connection pool unusable while switching to '{}' ({}), reconnecting",
            switch_target(config),
            source
        );

        let fresh = self.establish_and_bind(config, true).await?;
        match self
            .adapter
            .issue_use_database(self.driver.as_ref(), fresh.as_ref(), config)
            .await
        {
            Ok(()) => Ok(fresh),
            Err(UseDatabaseError::Missing(database)) => Err(TenantError::NotFound(database)),
            Err(UseDatabaseError::Broken(source)) => Err(TenantError::SwitchFailure {
                target: switch_target(config),
                source,
            }),
        }
    }

    /// Bind the worker to the target's pool, then point the session at the
    /// target database when the config still names one.
    async fn full_reconnect_switch(&self, config: &TenantConfig) -> TenantResult<Arc<D::Pool>> {
        let pool = self.establish_and_bind(config, false).await?;

        if !config.targets_database() {
            return Ok(pool);
        }
        self.use_database(pool, config).await
    }

    /// Issue "use database" on the pool the worker is bound to, falling
    /// back to a full reconnect when nothing is bound yet.
    async fn lightweight_switch(&self, config: &TenantConfig) -> TenantResult<Arc<D::Pool>> {
        let bound = {
            let owner = self.state.lock().active_owner.clone();
            owner.and_then(|owner| self.registry.retrieve(&owner))
        };

        match bound {
            Some(pool) => self.use_database(pool, config).await,
            None => {
                debug!("No bound pool for a lightweight switch, reconnecting");
                self.full_reconnect_switch(config).await
            }
        }
    }

    /// Pool for host-level operations (create/drop), connecting to the
    /// target host first when the difference demands it or nothing is
    /// bound yet. `strip` names the fields excluded from the owner name.
    async fn host_pool(
        &self,
        config: &TenantConfig,
        strip: &[ConfigField],
    ) -> TenantResult<Arc<D::Pool>> {
        let (difference, bound_owner) = {
            let state = self.state.lock();
            (
                Difference::between(state.current.as_ref().map(|c| &c.config), config),
                state.active_owner.clone(),
            )
        };

        if !difference.host_changed()
            && let Some(pool) = bound_owner.and_then(|owner| self.registry.retrieve(&owner))
        {
            return Ok(pool);
        }

        self.establish_and_bind(&config.without(strip), false).await
    }

    async fn provision<F, Fut>(
        &self,
        tenant: &TenantRef,
        config: &TenantConfig,
        init: F,
    ) -> TenantResult<()>
    where
        F: FnOnce(Arc<D::Pool>) -> Fut,
        Fut: Future<Output = TenantResult<()>>,
    {
        let pool = self
            .host_pool(
                config,
                &[ConfigField::Database, ConfigField::SchemaSearchPath],
            )
            .await?;

        self.adapter
            .create_tenant_storage(self.driver.as_ref(), pool.as_ref(), config)
            .await
            .map_err(|e| TenantError::ProvisioningFailure {
                tenant: tenant.display_name().to_string(),
                reason: e.to_string(),
            })?;

        // Work inside the new tenant for schema import, seeding, and init.
        let pool = self.use_database(pool, config).await?;
        {
            let mut state = self.state.lock();
            state.current = Some(CurrentTenant {
                tenant: tenant.clone(),
                config: config.clone(),
            });
        }

        if let Some(schema_file) = self.config.database_schema_file.clone() {
            self.load_into(tenant, pool.as_ref(), &schema_file).await?;
        }

        if self.config.seed_after_create
            && let Some(seed_file) = self.config.seed_data_file.clone()
        {
            self.load_into(tenant, pool.as_ref(), &seed_file).await?;
        }

        init(pool).await?;
        Ok(())
    }

    async fn drop_storage(&self, tenant: &TenantRef, config: &TenantConfig) -> TenantResult<()> {
        let pool = self.host_pool(config, &[ConfigField::Database]).await?;

        let database = config
            .database
            .as_deref()
            .ok_or_else(|| TenantError::NotFound(tenant.display_name().to_string()))?;

        let exists = self
            .adapter
            .database_exists(self.driver.as_ref(), pool.as_ref(), database)
            .await
            .map_err(|source| TenantError::SwitchFailure {
                target: database.to_string(),
                source,
            })?;
        if !exists {
            return Err(TenantError::NotFound(database.to_string()));
        }

        self.driver
            .drop_database(pool.as_ref(), database)
            .await
            .map_err(|source| match source {
                DriverError::UnknownDatabase(name) => TenantError::NotFound(name),
                source => TenantError::SwitchFailure {
                    target: database.to_string(),
                    source,
                },
            })?;

        // Transiently committed; the caller restores right after.
        {
            let mut state = self.state.lock();
            state.current = Some(CurrentTenant {
                tenant: tenant.clone(),
                config: config.clone(),
            });
        }

        info!("Tenant '{}' dropped", tenant);
        Ok(())
    }

    /// Switch back to what was active before a scoped operation, falling
    /// back to the default tenant and, as a last resort, clearing the
    /// tenant state. Never raises, so the operation's own outcome stays
    /// visible.
    async fn restore_previous(&self, previous: Option<TenantRef>) {
        let target =
            previous.unwrap_or_else(|| TenantRef::from(self.config.default_tenant.clone()));

        if let Err(restore_err) = self.switch_ref(target.clone()).await {
            error!("Failed to restore tenant '{}': {}", target, restore_err);
            if let Err(reset_err) = self.reset().await {
                error!(
                    "Failed to reset to default tenant '{}': {}; tenant state is no longer reliable",
                    self.config.default_tenant, reset_err
                );
                let mut state = self.state.lock();
                state.current = None;
                state.active_owner = None;
            }
        }
    }

    async fn load_into(
        &self,
        tenant: &TenantRef,
        pool: &D::Pool,
        path: &Path,
    ) -> TenantResult<()> {
        self.loader
            .load(self.driver.as_ref(), pool, path)
            .await
            .map_err(|e| TenantError::ProvisioningFailure {
                tenant: tenant.display_name().to_string(),
                reason: e.to_string(),
            })
    }

    async fn notify(&self, operation: LifecycleOperation, phase: LifecyclePhase, tenant: &str) {
        self.hooks
            .notify(&LifecycleEvent::new(operation, phase, tenant))
            .await;
    }
}

/// What a switch failure should name: the most specific part of the target
/// the caller will recognize.
fn switch_target(config: &TenantConfig) -> String {
    config
        .database
        .as_deref()
        .or(config.schema_search_path.as_deref())
        .or(config.host.as_deref())
        .unwrap_or("<unnamed>")
        .to_string()
}

/// Restores a worker's tenant state when a scoped switch is dropped before
/// its ordinary restoration ran (the future was cancelled mid-scope).
struct RestoreGuard<'a, D: DatabaseDriver, A: DriverAdapter<D>> {
    switcher: &'a TenantSwitcher<D, A>,
    snapshot: Option<StateSnapshot>,
}

impl<'a, D: DatabaseDriver, A: DriverAdapter<D>> RestoreGuard<'a, D, A> {
    fn new(switcher: &'a TenantSwitcher<D, A>, snapshot: StateSnapshot) -> Self {
        Self {
            switcher,
            snapshot: Some(snapshot),
        }
    }

    fn disarm(mut self) {
        self.snapshot = None;
    }
}

impl<D: DatabaseDriver, A: DriverAdapter<D>> Drop for RestoreGuard<'_, D, A> {
    fn drop(&mut self) {
        let Some((current, active_owner)) = self.snapshot.take() else {
            return;
        };

        let config = current.as_ref().map(|c| c.config.clone());
        {
            let mut state = self.switcher.state.lock();
            state.current = current;
            state.active_owner = active_owner.clone();
        }

        // `Drop` cannot await, so the physical part of the restoration runs
        // on a detached task. The logical state above is already correct;
        // the session itself stays on the scope's database until that task
        // has issued its "use database".
        let Some(config) = config else { return };
        let Some(owner) = active_owner else { return };
        if !config.targets_database() {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available to restore the physical tenant after cancellation");
            return;
        };

        let driver = Arc::clone(&self.switcher.driver);
        let adapter = Arc::clone(&self.switcher.adapter);
        let registry = Arc::clone(&self.switcher.registry);
        handle.spawn(async move {
            let Some(pool) = registry.retrieve(&owner) else {
                return;
            };
            if let Err(e) = adapter
                .issue_use_database(driver.as_ref(), pool.as_ref(), &config)
                .await
            {
                error!(
                    "Failed to restore physical tenant '{}' after cancellation: {}",
                    switch_target(&config),
                    e
                );
            }
        });
    }
}
