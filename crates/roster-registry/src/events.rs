//! Registry change events and the in-process event hub.
//!
//! Delivery is synchronous, in registration order, best-effort. Each
//! listener is isolated: a panicking listener is logged and the
//! remaining listeners (and the caller) carry on.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use roster_model::{Application, StatusInfo};

/// Something changed in the application directory.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A new or refreshed registration was stored.
    Registered(Application),
    /// An application was removed from the directory.
    Deregistered(Application),
    /// A health probe observed a different status tag.
    StatusChanged {
        application: Application,
        from: StatusInfo,
        to: StatusInfo,
    },
}

/// Callback invoked for every published registry event.
pub type RegistryListener = Arc<dyn Fn(&RegistryEvent) + Send + Sync>;

/// Fan-out point for registry events.
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<RwLock<Vec<RegistryListener>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are invoked in registration order.
    pub fn subscribe(&self, listener: RegistryListener) {
        let mut listeners = self.listeners.write().expect("listeners lock");
        listeners.push(listener);
    }

    /// Deliver an event to every listener.
    ///
    /// A listener that panics does not prevent delivery to the rest.
    pub fn publish(&self, event: &RegistryEvent) {
        let listeners = self.listeners.read().expect("listeners lock").clone();
        debug!(count = listeners.len(), event = ?event_kind(event), "publishing registry event");
        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!(event = ?event_kind(event), "registry listener panicked");
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().expect("listeners lock").len()
    }
}

fn event_kind(event: &RegistryEvent) -> &'static str {
    match event {
        RegistryEvent::Registered(_) => "registered",
        RegistryEvent::Deregistered(_) => "deregistered",
        RegistryEvent::StatusChanged { .. } => "status_changed",
    }
}
