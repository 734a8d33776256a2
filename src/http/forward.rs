//! Forwarding of a request to the chosen backend.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the backend's base URL
//! - Perform the network hop with a bounded connect timeout
//! - Hand the backend response back untouched
//!
//! # Design Decisions
//! - No retry and no failover: errors go straight back to the caller
//! - The inbound `Host` header is dropped so the client sets the backend's

use std::future::Future;
use std::time::Duration;

use axum::body::Body;
use hyper::{header, Request, Response, Uri, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::load_balancer::Backend;

/// Errors raised while forwarding.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream uri: {0}")]
    InvalidUri(String),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
}

/// Performs the network hop to a backend.
pub trait Forwarder: Send + Sync + 'static {
    fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, ForwardError>> + Send;
}

/// Forwarder backed by a pooled hyper client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
}

impl HttpForwarder {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(&self, backend: &Backend, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = backend_uri(&backend.url, &parts.uri)?;
        parts.version = Version::HTTP_11;
        parts.headers.remove(header::HOST);

        let response = self.client.request(Request::from_parts(parts, body)).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Map an inbound request URI onto the backend base URL.
pub fn backend_uri(base: &Url, uri: &Uri) -> Result<Uri, ForwardError> {
    let host = base
        .host_str()
        .ok_or_else(|| ForwardError::InvalidUri(format!("backend url '{}' has no host", base)))?;

    let mut target = format!("{}://{}", base.scheme(), host);
    if let Some(port) = base.port() {
        target.push_str(&format!(":{}", port));
    }
    target.push_str(&join_paths(base.path(), uri.path()));

    let query = match (base.query(), uri.query()) {
        (Some(a), Some(b)) if !a.is_empty() => Some(format!("{}&{}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (_, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    };
    if let Some(q) = query {
        target.push('?');
        target.push_str(&q);
    }

    target
        .parse::<Uri>()
        .map_err(|e| ForwardError::InvalidUri(e.to_string()))
}

/// Join two path segments with exactly one slash between them.
pub fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/", "/api/v1"), "/api/v1");
        assert_eq!(join_paths("/base", "/api"), "/base/api");
        assert_eq!(join_paths("/base/", "api"), "/base/api");
        assert_eq!(join_paths("/base", "api"), "/base/api");
    }

    #[test]
    fn test_backend_uri() {
        let base = Url::parse("http://localhost:8081").unwrap();
        let uri: Uri = "/api/v1/ping?x=1".parse().unwrap();
        assert_eq!(backend_uri(&base, &uri).unwrap().to_string(), "http://localhost:8081/api/v1/ping?x=1");

        let base = Url::parse("http://10.0.0.1/prefix/?key=abc").unwrap();
        let uri: Uri = "/users?page=2".parse().unwrap();
        assert_eq!(
            backend_uri(&base, &uri).unwrap().to_string(),
            "http://10.0.0.1/prefix/users?key=abc&page=2"
        );
    }

    #[test]
    fn test_backend_uri_keeps_ipv6_brackets() {
        let base = Url::parse("http://[::1]:9000").unwrap();
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(backend_uri(&base, &uri).unwrap().to_string(), "http://[::1]:9000/");
    }
}
