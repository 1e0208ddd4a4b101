//! ApplicationRegistrator — announces this process to the registry.
//!
//! `register()` is an idempotent upsert: the registry de-duplicates by
//! health URL, so re-posting the same payload refreshes the existing
//! entry. The id learned from the first successful registration is
//! cached (set-once) for deregistration at shutdown. All failures are
//! logged and reported as `false`, never propagated — a client must not
//! crash because its registry is down.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use roster_model::Application;

use crate::error::ClientError;
use crate::http_client::{HttpResponse, send_json};
use crate::identity::ClientProperties;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Registers the embedding application with a Roster registry.
pub struct ApplicationRegistrator {
    props: Arc<ClientProperties>,
    /// Base URL of the registry, e.g. `http://admin:8080`.
    registry_url: String,
    request_timeout: Duration,
    /// Id assigned by the registry; set once, cleared on deregister.
    registered_id: Mutex<Option<String>>,
}

impl ApplicationRegistrator {
    pub fn new(registry_url: impl Into<String>, props: Arc<ClientProperties>) -> Self {
        Self {
            props,
            registry_url: registry_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            registered_id: Mutex::new(None),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The id the registry assigned to this client, once learned.
    pub fn registered_id(&self) -> Option<String> {
        self.registered_id.lock().expect("id lock").clone()
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/api/applications",
            self.registry_url.trim_end_matches('/')
        )
    }

    /// Announce this process to the registry.
    ///
    /// Returns `true` on a created/refreshed registration. An unresolved
    /// identity fails before any network contact.
    pub async fn register(&self) -> bool {
        let application = match self.self_application() {
            Ok(app) => app,
            Err(e) => {
                warn!(error = %e, "cannot register, identity unresolved");
                return false;
            }
        };
        let payload = match serde_json::to_vec(&application) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                warn!(error = %e, "cannot serialize registration payload");
                return false;
            }
        };

        let url = self.collection_url();
        match send_json(http::Method::POST, &url, Some(payload), self.request_timeout).await {
            Ok(resp) if resp.status == http::StatusCode::CREATED => {
                self.cache_assigned_id(&resp);
                true
            }
            Ok(resp) => {
                warn!(
                    status = %resp.status,
                    url,
                    name = application.name(),
                    "registry rejected registration"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, url, name = application.name(), "failed to register");
                false
            }
        }
    }

    /// Remember the assigned id. Only the first learned id sticks; a
    /// refresh response never replaces it.
    fn cache_assigned_id(&self, resp: &HttpResponse) {
        let assigned = serde_json::from_slice::<serde_json::Value>(&resp.body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str().map(str::to_string)));

        let Some(assigned) = assigned else {
            warn!("registration response carried no id");
            return;
        };

        let mut cached = self.registered_id.lock().expect("id lock");
        match cached.as_ref() {
            None => {
                info!(id = %assigned, "application registered");
                *cached = Some(assigned);
            }
            Some(_) => {
                debug!(id = %assigned, "application registration refreshed");
            }
        }
    }

    /// Remove this process from the registry, if it ever registered.
    ///
    /// Best effort: the cached id is cleared only on success, so a
    /// failed deregistration can be retried.
    pub async fn deregister(&self) {
        let Some(id) = self.registered_id() else {
            return;
        };
        let url = format!("{}/{id}", self.collection_url());

        match send_json(http::Method::DELETE, &url, None, self.request_timeout).await {
            Ok(resp) if resp.status.is_success() => {
                let mut cached = self.registered_id.lock().expect("id lock");
                *cached = None;
                info!(%id, "application deregistered");
            }
            Ok(resp) => {
                warn!(%id, status = %resp.status, url, "failed to deregister");
            }
            Err(e) => {
                warn!(%id, error = %e, url, "failed to deregister");
            }
        }
    }

    /// Fixed-delay registration loop, active once the embedding server
    /// reports ready. Each tick is independent; a failure is simply
    /// retried on the next one.
    pub async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            period_ms = period.as_millis() as u64,
            registry = %self.registry_url,
            "registrator started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(period) => {
                    if self.props.is_ready() {
                        let _ = self.register().await;
                    } else {
                        debug!("server not initialized yet, skipping registration");
                    }
                }
                _ = shutdown.changed() => {
                    info!("registrator shutting down");
                    break;
                }
            }
        }
    }

    /// Build the registration payload from the resolved identity.
    fn self_application(&self) -> Result<Application, ClientError> {
        Ok(Application::create(self.props.name())
            .with_service_url(self.props.service_url()?)
            .with_management_url(self.props.management_url()?)
            .with_health_url(self.props.health_url()?)
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ClientConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A canned registry endpoint: counts connections and answers every
    /// request with the given status line and body.
    async fn canned_registry(
        status_line: &'static str,
        body_for: impl Fn(usize) -> String + Send + 'static,
    ) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let n = hits_counter.fetch_add(1, Ordering::SeqCst);
                let body = body_for(n);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}"), hits)
    }

    /// Read a full request (head plus content-length body) so the
    /// client never sees the connection close mid-write.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let Ok(n) = socket.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..head_end]);
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn ready_props() -> Arc<ClientProperties> {
        let props = ClientProperties::new(ClientConfig::new("orders"));
        props.mark_ready(8080);
        Arc::new(props)
    }

    fn registrator(registry_url: &str) -> ApplicationRegistrator {
        ApplicationRegistrator::new(registry_url, ready_props())
            .with_request_timeout(Duration::from_millis(500))
    }

    #[tokio::test]
    async fn register_caches_assigned_id() {
        let (url, _) = canned_registry("201 Created", |_| r#"{"id":"abc123"}"#.to_string()).await;
        let reg = registrator(&url);

        assert!(reg.register().await);
        assert_eq!(reg.registered_id().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn refresh_keeps_first_assigned_id() {
        let (url, hits) =
            canned_registry("201 Created", |n| format!(r#"{{"id":"id-{n}"}}"#)).await;
        let reg = registrator(&url);

        assert!(reg.register().await);
        assert!(reg.register().await);
        // Two POSTs went out, but only the first id was cached.
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(reg.registered_id().as_deref(), Some("id-0"));
    }

    #[tokio::test]
    async fn rejected_registration_reports_failure() {
        let (url, _) =
            canned_registry("400 Bad Request", |_| r#"{"error":"bad"}"#.to_string()).await;
        let reg = registrator(&url);

        assert!(!reg.register().await);
        assert!(reg.registered_id().is_none());
    }

    #[tokio::test]
    async fn unreachable_registry_reports_failure() {
        let reg = registrator("http://127.0.0.1:1");
        assert!(!reg.register().await);
        assert!(reg.registered_id().is_none());
    }

    #[tokio::test]
    async fn unresolved_identity_fails_without_network_contact() {
        let (url, hits) = canned_registry("201 Created", |_| r#"{"id":"x"}"#.to_string()).await;
        // Never marked ready: no service URL can be derived.
        let props = Arc::new(ClientProperties::new(ClientConfig::new("orders")));
        let reg = ApplicationRegistrator::new(&url, props)
            .with_request_timeout(Duration::from_millis(500));

        assert!(!reg.register().await);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deregister_clears_cached_id_on_success() {
        let (url, _) = canned_registry("200 OK", |_| r#"{"id":"abc123"}"#.to_string()).await;
        let reg = registrator(&url);
        // The canned endpoint answers 200, not 201, so seed the id.
        *reg.registered_id.lock().unwrap() = Some("abc123".to_string());

        reg.deregister().await;
        assert!(reg.registered_id().is_none());
    }

    #[tokio::test]
    async fn failed_deregister_keeps_cached_id() {
        let reg = registrator("http://127.0.0.1:1");
        *reg.registered_id.lock().unwrap() = Some("abc123".to_string());

        reg.deregister().await;
        assert_eq!(reg.registered_id().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn deregister_without_id_is_a_noop() {
        let (url, hits) = canned_registry("200 OK", |_| String::new()).await;
        let reg = registrator(&url);

        reg.deregister().await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
