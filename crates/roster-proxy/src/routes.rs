//! The route table consumed by the proxy transport.

use serde::{Deserialize, Serialize};

/// One forwarding rule: requests under `path_prefix` go to `target_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRoute {
    /// Id of the application this route belongs to.
    pub id: String,
    /// Path prefix the proxy matches on, e.g. `/proxied/abc123`.
    pub path_prefix: String,
    /// Base URL requests are forwarded to.
    pub target_url: String,
}

/// A complete, immutable set of routes derived from one registry
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub routes: Vec<ProxyRoute>,
    /// Whether the transport should add forwarding headers
    /// (X-Forwarded-*) to proxied requests.
    pub add_proxy_headers: bool,
}

impl RouteTable {
    /// Resolve a request path to a route. The longest matching prefix
    /// wins, and a prefix only matches on a path-segment boundary.
    pub fn resolve(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes
            .iter()
            .filter(|route| {
                path == route.path_prefix
                    || path
                        .strip_prefix(&route.path_prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|route| route.path_prefix.len())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
