//! Lifecycle notifications around tenant operations
//!
//! Observers receive before/after events for `switch` and `create`. They
//! are invoked sequentially in registration order and cannot alter engine
//! behavior; a restoration switch notifies observers like any other switch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Engine operation a lifecycle event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleOperation {
    /// Active tenant changed (or was restored)
    Switch,

    /// New tenant storage provisioned
    Create,
}

/// Whether the event fired before or after its operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// Emitted before the operation starts, even if it later fails
    Before,

    /// Emitted only after the operation succeeded
    After,
}

/// Notification emitted around a tenant lifecycle operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Timestamp when the event was created
    pub occurred_at: DateTime<Utc>,

    /// Operation the event describes
    pub operation: LifecycleOperation,

    /// Phase relative to the operation
    pub phase: LifecyclePhase,

    /// Tenant the operation targets
    pub tenant: String,
}

impl LifecycleEvent {
    /// Create a new event stamped with the current time
    pub fn new(
        operation: LifecycleOperation,
        phase: LifecyclePhase,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            operation,
            phase,
            tenant: tenant.into(),
        }
    }
}

/// Observer of tenant lifecycle events
#[async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Receive a lifecycle event
    async fn on_event(&self, event: &LifecycleEvent);
}

/// Ordered registry of lifecycle observers
///
/// # Examples
///
/// ```rust,ignore
/// let hooks = LifecycleHooks::new();
/// hooks.register(Arc::new(AuditTrail::new()));
///
/// hooks
///     .notify(&LifecycleEvent::new(
///         LifecycleOperation::Switch,
///         LifecyclePhase::Before,
///         "acme",
///     ))
///     .await;
/// ```
pub struct LifecycleHooks {
    observers: RwLock<Vec<Arc<dyn LifecycleObserver>>>,
}

impl LifecycleHooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer
    ///
    /// Observers are notified in the order they were registered.
    pub fn register(&self, observer: Arc<dyn LifecycleObserver>) {
        let mut observers = self.observers.write();
        observers.push(observer);
        debug!("Registered lifecycle observer ({} total)", observers.len());
    }

    /// Notify all observers of an event
    pub async fn notify(&self, event: &LifecycleEvent) {
        let observers: Vec<Arc<dyn LifecycleObserver>> =
            self.observers.read().iter().cloned().collect();

        if observers.is_empty() {
            return;
        }

        debug!(
            "Notifying {} observer(s): {:?} {:?} for tenant '{}'",
            observers.len(),
            event.phase,
            event.operation,
            event.tenant
        );

        for observer in observers {
            observer.on_event(event).await;
        }
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl Default for LifecycleHooks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct RecordingObserver {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LifecycleObserver for RecordingObserver {
        async fn on_event(&self, event: &LifecycleEvent) {
            self.log
                .lock()
                .push(format!("{}:{}", self.label, event.tenant));
        }
    }

    #[test]
    fn test_event_carries_identity_and_target() {
        let event = LifecycleEvent::new(
            LifecycleOperation::Create,
            LifecyclePhase::Before,
            "acme",
        );

        assert_eq!(event.operation, LifecycleOperation::Create);
        assert_eq!(event.phase, LifecyclePhase::Before);
        assert_eq!(event.tenant, "acme");

        let other = LifecycleEvent::new(
            LifecycleOperation::Create,
            LifecyclePhase::Before,
            "acme",
        );
        assert_ne!(event.id, other.id);
    }

    #[tokio::test]
    async fn test_notify_runs_observers_in_registration_order() {
        let hooks = LifecycleHooks::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        hooks.register(Arc::new(RecordingObserver {
            label: "first",
            log: log.clone(),
        }));
        hooks.register(Arc::new(RecordingObserver {
            label: "second",
            log: log.clone(),
        }));

        let event = LifecycleEvent::new(
            LifecycleOperation::Switch,
            LifecyclePhase::After,
            "acme",
        );
        hooks.notify(&event).await;

        assert_eq!(
            *log.lock(),
            vec!["first:acme".to_string(), "second:acme".to_string()]
        );
    }

    #[tokio::test]
    async fn test_notify_without_observers_is_a_no_op() {
        let hooks = LifecycleHooks::new();
        assert_eq!(hooks.observer_count(), 0);

        let event = LifecycleEvent::new(
            LifecycleOperation::Switch,
            LifecyclePhase::Before,
            "acme",
        );
        hooks.notify(&event).await;
    }
}
