//! ApplicationStore — the in-memory application directory.
//!
//! Keyed by application id, de-duplicated by health URL. All mutations
//! replace whole records under a single write lock; reads take snapshots,
//! so later mutations never retroactively change a returned sequence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use tracing::debug;

use roster_model::Application;

use crate::error::StoreError;

/// Thread-safe, cheaply-cloneable handle to the application directory.
#[derive(Clone, Default)]
pub struct ApplicationStore {
    apps: Arc<RwLock<HashMap<String, Application>>>,
}

impl ApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update an application.
    ///
    /// If an entry with the same health URL already exists it is
    /// replaced and keeps its id. Otherwise the record is inserted under
    /// its own id, or under a freshly derived one when the caller
    /// supplied none. Returns the stored record.
    pub fn save(&self, app: Application) -> Result<Application, StoreError> {
        let mut apps = self.apps.write().expect("store lock");

        // healthUrl is the de-duplication key: a re-registration of the
        // same client keeps the originally assigned id.
        let existing_id = apps
            .values()
            .find(|a| a.health_url() == app.health_url())
            .and_then(|a| a.id())
            .map(str::to_string);

        let id = existing_id
            .or_else(|| app.id().map(str::to_string))
            .unwrap_or_else(|| derive_id(&app));

        let stored = Application::rebuild(&app).with_id(&id).build()?;
        apps.insert(id.clone(), stored.clone());
        debug!(%id, name = stored.name(), "application stored");
        Ok(stored)
    }

    /// Look up an application by id.
    pub fn find(&self, id: &str) -> Option<Application> {
        let apps = self.apps.read().expect("store lock");
        apps.get(id).cloned()
    }

    /// Snapshot of all applications at call time. Iteration order is
    /// unspecified.
    pub fn find_all(&self) -> Vec<Application> {
        let apps = self.apps.read().expect("store lock");
        apps.values().cloned().collect()
    }

    /// Remove an application, returning the prior value if present.
    pub fn delete(&self, id: &str) -> Option<Application> {
        let mut apps = self.apps.write().expect("store lock");
        let removed = apps.remove(id);
        if removed.is_some() {
            debug!(%id, "application removed");
        }
        removed
    }

    /// Number of registered applications.
    pub fn len(&self) -> usize {
        let apps = self.apps.read().expect("store lock");
        apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive a stable id from the application's identity fields.
///
/// The same name + serviceUrl + healthUrl always produces the same id,
/// so a client re-registering after a restart gets its old id back.
fn derive_id(app: &Application) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app.name().as_bytes());
    hasher.update(b"|");
    hasher.update(app.service_url().as_bytes());
    hasher.update(b"|");
    hasher.update(app.health_url().as_bytes());
    hex::encode(&hasher.finalize()[..6])
}
