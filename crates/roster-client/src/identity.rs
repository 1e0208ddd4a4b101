//! Self-identity resolution — which URLs does this process register?
//!
//! The three URLs can each be configured outright (the Docker/NAT case,
//! where the locally derived address is not what the registry should
//! dial). Otherwise they are derived: the service URL from the bound
//! server port, the management URL from the management port (falling
//! back to the service URL plus a context path), and the health URL from
//! the management URL plus the health endpoint id.
//!
//! Until [`ClientProperties::mark_ready`] reports the server listener
//! bound, derived URLs are unresolvable and registration must not go out
//! — publishing an unreachable service URL is worse than registering a
//! tick later.

use std::sync::Mutex;

use crate::error::ClientError;

/// Static configuration for the registering client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Name to register with. Not required to be unique.
    pub name: String,
    /// Scheme for derived URLs.
    pub scheme: String,
    /// Hostname used in derived URLs when `prefer_ip` is off.
    pub host: String,
    /// Register with the configured `ip` instead of `host`.
    pub prefer_ip: bool,
    /// Address used when `prefer_ip` is set.
    pub ip: Option<String>,
    /// Separate management port, when the management endpoints are not
    /// served from the main server port.
    pub management_port: Option<u16>,
    /// Context path appended to the management base URL.
    pub management_context_path: String,
    /// Path of the health endpoint below the management URL.
    pub health_endpoint: String,
    /// Explicit overrides — each wins over derivation when set.
    pub service_url: Option<String>,
    pub management_url: Option<String>,
    pub health_url: Option<String>,
}

impl ClientConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            prefer_ip: false,
            ip: None,
            management_port: None,
            management_context_path: String::new(),
            health_endpoint: "health".to_string(),
            service_url: None,
            management_url: None,
            health_url: None,
        }
    }
}

/// Runtime identity of the embedding process.
pub struct ClientProperties {
    config: ClientConfig,
    /// Bound server port, known only after the listener is up.
    server_port: Mutex<Option<u16>>,
}

impl ClientProperties {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            server_port: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Report the server listener bound on the given port.
    pub fn mark_ready(&self, port: u16) {
        let mut server_port = self.server_port.lock().expect("port lock");
        *server_port = Some(port);
    }

    /// Whether registration can produce a resolvable payload.
    ///
    /// True once the server listener is bound, or immediately when the
    /// service URL is configured outright.
    pub fn is_ready(&self) -> bool {
        self.config.service_url.is_some()
            || self.server_port.lock().expect("port lock").is_some()
    }

    /// The URL under which this process serves its actual traffic.
    pub fn service_url(&self) -> Result<String, ClientError> {
        if let Some(url) = &self.config.service_url {
            return Ok(url.clone());
        }
        let port = self
            .server_port
            .lock()
            .expect("port lock")
            .ok_or(ClientError::ServerNotInitialized)?;
        self.local_uri(port)
    }

    /// The base URL of this process's management endpoints.
    pub fn management_url(&self) -> Result<String, ClientError> {
        if let Some(url) = &self.config.management_url {
            return Ok(url.clone());
        }
        let base = match self.config.management_port {
            Some(port) => self.local_uri(port)?,
            None => self.service_url()?,
        };
        Ok(append(&base, &self.config.management_context_path))
    }

    /// The health endpoint URL, unique per instance in the registry.
    pub fn health_url(&self) -> Result<String, ClientError> {
        if let Some(url) = &self.config.health_url {
            return Ok(url.clone());
        }
        Ok(append(&self.management_url()?, &self.config.health_endpoint))
    }

    fn local_uri(&self, port: u16) -> Result<String, ClientError> {
        let host = if self.config.prefer_ip {
            self.config.ip.as_deref().ok_or(ClientError::MissingAddress)?
        } else {
            self.config.host.as_str()
        };
        Ok(format!("{}://{host}:{port}", self.config.scheme))
    }
}

/// Join a base URL and a path, normalizing duplicate slashes.
fn append(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
