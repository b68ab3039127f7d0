use reqwest::header::{HeaderMap, AUTHORIZATION, CONNECTION};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::time::Duration;

use crate::config::JobConfig;
use crate::error::{JobError, Result};

/// Headers that describe one hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// An incoming call to be relayed to the backend.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path plus optional query string, relative to the backend base URL.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// The backend's answer, exactly as received.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ProxyResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated pass-through to the primary backend.
///
/// The caller's method, path, headers and body go out unchanged apart from
/// hop-by-hop headers, and the caller's own `Authorization` is replaced by
/// the configured bearer token. Whatever the backend answers, including
/// 4xx/5xx, comes back as a [`ProxyResponse`]; only a failure to reach the
/// backend is an error. Redirects are relayed, not followed.
#[derive(Debug, Clone)]
pub struct BackendProxy {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: no_redirect_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Build from `config`, or `None` when no backend URL is configured.
    pub fn from_config(config: &JobConfig) -> Option<Self> {
        let url = config.backend_url.as_ref()?;
        let proxy = Self::new(url.clone());
        Some(match &config.backend_token {
            Some(token) => proxy.with_token(token.clone()),
            None => proxy,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use a custom `reqwest::Client`. It must be built with
    /// `redirect(Policy::none())`, or a 3xx from the backend is followed
    /// instead of being handed back.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full backend URL for a relative `path`.
    pub fn target_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Relay `req` and return the backend's status, headers and body.
    pub async fn forward(&self, req: ProxyRequest) -> Result<ProxyResponse> {
        let url = self.target_url(&req.path);
        let mut builder = self
            .http
            .request(req.method.clone(), &url)
            .timeout(Duration::from_secs(60))
            .headers(outbound_headers(&req.headers));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if !req.body.is_empty() {
            builder = builder.body(req.body);
        }

        let resp = builder.send().await.map_err(|e| JobError::Network {
            context: format!("Cannot reach backend at {}", self.base_url),
            source: e,
        })?;

        let status = resp.status().as_u16();
        let headers = strip_hop_by_hop(resp.headers());
        let body = resp.bytes().await.map_err(|e| JobError::Network {
            context: "Failed to read backend response body".into(),
            source: e,
        })?;

        tracing::debug!(method = %req.method, path = %req.path, status, "proxied backend call");
        Ok(ProxyResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build proxy HTTP client, falling back to defaults");
            Client::new()
        })
}

/// Header names the sender declared hop-by-hop in its `Connection` header.
fn connection_listed(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let listed = connection_listed(headers);
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if HOP_BY_HOP.contains(&name_str) || listed.iter().any(|l| l == name_str) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Incoming headers as they should leave for the backend.
fn outbound_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut out = strip_hop_by_hop(incoming);
    out.remove(AUTHORIZATION);
    out
}
