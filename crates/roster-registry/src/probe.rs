//! Health probe — a single bounded HTTP GET against a health URL.
//!
//! The interpretation ladder is deliberate and ordered:
//! 1. A JSON body with a `status` string field wins, verbatim — clients
//!    own their health vocabulary.
//! 2. Otherwise a 2xx response means UP.
//! 3. Otherwise (non-2xx, unparseable body) DOWN — reachable but
//!    unhealthy.
//! 4. A transport failure of any kind (refused, timeout, bad URL,
//!    handshake error) means OFFLINE — unreachable.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::debug;

use roster_model::StatusInfo;

/// What a single probe observed at the HTTP layer.
enum ProbeOutcome {
    Response { status: http::StatusCode, body: Bytes },
    Unreachable,
}

/// Probe a health URL and map the outcome to a status.
pub async fn query_status(health_url: &str, timeout: Duration) -> StatusInfo {
    match fetch(health_url, timeout).await {
        ProbeOutcome::Response { status, body } => {
            if let Some(tag) = explicit_status(&body) {
                StatusInfo::of(&tag)
            } else if status.is_success() {
                StatusInfo::up()
            } else {
                debug!(%status, url = health_url, "health probe non-2xx");
                StatusInfo::down()
            }
        }
        ProbeOutcome::Unreachable => StatusInfo::offline(),
    }
}

/// Pull the `status` string field out of a JSON body, if there is one.
fn explicit_status(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("status")?.as_str().map(str::to_string)
}

/// Perform the GET, bounded by `timeout`. Every failure mode collapses
/// into `Unreachable`.
async fn fetch(url: &str, timeout: Duration) -> ProbeOutcome {
    let uri: http::Uri = match url.parse() {
        Ok(uri) => uri,
        Err(e) => {
            debug!(error = %e, url, "health probe url unparseable");
            return ProbeOutcome::Unreachable;
        }
    };
    let Some(host) = uri.host().map(str::to_string) else {
        debug!(url, "health probe url has no host");
        return ProbeOutcome::Unreachable;
    };
    let port = uri.port_u16().unwrap_or(80);
    let authority = format!("{host}:{port}");
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let result = tokio::time::timeout(timeout, async {
        let stream = match tokio::net::TcpStream::connect(&authority).await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, url, "health probe connection failed");
                return ProbeOutcome::Unreachable;
            }
        };

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, url, "health probe handshake failed");
                return ProbeOutcome::Unreachable;
            }
        };

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(path.as_str())
            .header("host", &authority)
            .header("accept", "application/json")
            .header("user-agent", "roster-registry/0.1")
            .body(http_body_util::Empty::<Bytes>::new())
            .unwrap();

        let resp = match sender.send_request(req).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, url, "health probe request failed");
                return ProbeOutcome::Unreachable;
            }
        };

        let status = resp.status();
        let body = match resp.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(error = %e, url, "health probe body read failed");
                return ProbeOutcome::Unreachable;
            }
        };

        ProbeOutcome::Response { status, body }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(url, "health probe timed out");
            ProbeOutcome::Unreachable
        }
    }
}
