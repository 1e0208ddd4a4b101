//! Minimal bounded HTTP/1 client for talking to the registry.
//!
//! One request per connection, everything wrapped in a timeout. The
//! registrator only ever needs POST-a-JSON-body and DELETE.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    TimedOut,
}

pub(crate) struct HttpResponse {
    pub status: http::StatusCode,
    pub body: Bytes,
}

/// Send a single request and collect the response body, bounded by
/// `timeout` end to end.
pub(crate) async fn send_json(
    method: http::Method,
    url: &str,
    body: Option<Bytes>,
    timeout: Duration,
) -> Result<HttpResponse, HttpError> {
    let uri: http::Uri = url
        .parse()
        .map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
    let host = uri
        .host()
        .ok_or_else(|| HttpError::InvalidUrl(url.to_string()))?
        .to_string();
    let port = uri.port_u16().unwrap_or(80);
    let authority = format!("{host}:{port}");
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tokio::time::timeout(timeout, async move {
        let stream = tokio::net::TcpStream::connect(&authority)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = http::Request::builder()
            .method(method)
            .uri(path.as_str())
            .header("host", &authority)
            .header("accept", "application/json")
            .header("user-agent", "roster-client/0.1");
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let req = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_bytes();

        debug!(%status, url, "registry call completed");
        Ok(HttpResponse { status, body })
    })
    .await
    .map_err(|_| HttpError::TimedOut)?
}
