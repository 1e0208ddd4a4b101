//! RouteLocator — projects registry contents into proxy routes.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use roster_registry::events::RegistryListener;
use roster_registry::store::ApplicationStore;

use crate::routes::{ProxyRoute, RouteTable};

const DEFAULT_PROXY_PREFIX: &str = "/proxied";
const DEFAULT_REGISTRY_PATH: &str = "/api/applications";

/// Derives and publishes the route table for the current registry
/// contents.
pub struct RouteLocator {
    store: ApplicationStore,
    /// Prefix all derived routes live under.
    proxy_prefix: String,
    /// The registry's own API path, never proxied through itself.
    registry_path: String,
    add_proxy_headers: bool,
    /// Currently published table. Replaced wholesale on refresh, so
    /// readers holding the Arc keep a coherent snapshot.
    table: RwLock<Arc<RouteTable>>,
}

impl RouteLocator {
    pub fn new(store: ApplicationStore) -> Self {
        Self {
            store,
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
            registry_path: DEFAULT_REGISTRY_PATH.to_string(),
            add_proxy_headers: true,
            table: RwLock::new(Arc::new(RouteTable::default())),
        }
    }

    pub fn with_proxy_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.proxy_prefix = prefix.into();
        self
    }

    pub fn with_registry_path(mut self, path: impl Into<String>) -> Self {
        self.registry_path = path.into();
        self
    }

    pub fn with_proxy_headers(mut self, add: bool) -> Self {
        self.add_proxy_headers = add;
        self
    }

    /// The currently published route table snapshot.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.table.read().expect("route table lock").clone()
    }

    /// Recompute the table from the current store snapshot and publish
    /// it with a single swap.
    pub fn refresh(&self) {
        let applications = self.store.find_all();
        let mut routes = Vec::with_capacity(applications.len());

        for app in &applications {
            let Some(id) = app.id() else {
                continue;
            };
            let target = if app.management_url().is_empty() {
                app.service_url()
            } else {
                app.management_url()
            };
            if target.is_empty() {
                debug!(%id, "application has no routable url, skipping");
                continue;
            }

            let path_prefix = format!("{}/{id}", self.proxy_prefix.trim_end_matches('/'));
            if self.shadows_registry(&path_prefix) {
                debug!(%id, %path_prefix, "route would shadow the registry itself, skipping");
                continue;
            }

            routes.push(ProxyRoute {
                id: id.to_string(),
                path_prefix,
                target_url: target.to_string(),
            });
        }

        let table = Arc::new(RouteTable {
            routes,
            add_proxy_headers: self.add_proxy_headers,
        });

        let mut published = self.table.write().expect("route table lock");
        *published = table;
        info!(routes = published.len(), "route table refreshed");
    }

    /// Would a route under this prefix capture requests meant for the
    /// registry's own API?
    fn shadows_registry(&self, path_prefix: &str) -> bool {
        path_prefix == self.registry_path
            || self
                .registry_path
                .strip_prefix(path_prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// An event-hub callback that refreshes the table on every registry
    /// change (registration, deregistration, status change).
    pub fn listener(self: &Arc<Self>) -> RegistryListener {
        let locator = Arc::clone(self);
        Arc::new(move |_event| locator.refresh())
    }
}
