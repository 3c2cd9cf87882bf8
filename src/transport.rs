use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{LOCATION, SET_COOKIE};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::errors::ProbeError;

const DEFAULT_USER_AGENT: &str = "vpnscope/0.1";
const MAX_REDIRECTS: usize = 5;

/// One product-specific probe request.
///
/// Paths are fixed per sniffer; the method may be a non-standard verb
/// (`SSTP_DUPLEX_POST`, `CONNECT`). When `read_body` is false the transport
/// returns after status/headers and drops the connection without draining
/// the body, which matters for probes whose response is an endless stream.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub read_body: bool,
}

impl ProbeRequest {
    pub fn get(path: &str) -> Self {
        Self::custom("GET", path)
    }

    pub fn post(path: &str, body: &[u8]) -> Self {
        let mut request = Self::custom("POST", path);
        request.body = Some(body.to_vec());
        request
    }

    pub fn custom(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
            read_body: true,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Inspect status and headers only; the body is never read.
    pub fn headers_only(mut self) -> Self {
        self.read_body = false;
        self
    }
}

/// What a probe observed: status, reason phrase (when the transport can
/// supply one), headers with duplicates preserved, body bytes, the final
/// URL path after redirects, and the cookies accumulated for this server.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub final_path: String,
    pub cookies: Vec<(String, String)>,
}

impl ProbeResponse {
    /// First header with this name, case-insensitive.
    pub fn header<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.headers_named(name).next()
    }

    /// All headers with this name, case-insensitive (e.g. repeated
    /// `Set-Cookie`).
    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn has_cookie_prefixed(&self, prefix: &str) -> bool {
        self.cookies.iter().any(|(name, _)| name.starts_with(prefix))
    }
}

/// The HTTPS capability every sniffer probes through. Object safe so tests
/// can substitute canned responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, server: &str, request: ProbeRequest) -> Result<ProbeResponse, ProbeError>;
}

/// reqwest-backed transport.
///
/// Redirects are followed manually so Set-Cookie headers on intermediate
/// hops land in the per-server cookie session (reqwest's jar is not
/// enumerable). Invalid certificates are accepted unless `strict_certs` is
/// set: VPN appliances almost always present self-signed certs.
pub struct HttpTransport {
    client: Client,
    cookies: Mutex<HashMap<String, Vec<(String, String)>>>,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64, strict_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .danger_accept_invalid_certs(!strict_certs)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            cookies: Mutex::new(HashMap::new()),
        })
    }

    fn record_cookie(&self, server: &str, name: String, value: String) {
        let mut sessions = self.cookies.lock().unwrap();
        let jar = sessions.entry(server.to_string()).or_default();
        match jar.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => jar.push((name, value)),
        }
    }

    fn session_cookies(&self, server: &str) -> Vec<(String, String)> {
        self.cookies
            .lock()
            .unwrap()
            .get(server)
            .cloned()
            .unwrap_or_default()
    }
}

fn parse_set_cookie(value: &str) -> Option<(String, String)> {
    let pair = value.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, server: &str, request: ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let mut method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ProbeError::InvalidRequest(format!("bad method: {}", request.method)))?;
        let mut url = Url::parse(&format!("https://{}{}", server, request.path))
            .map_err(|e| ProbeError::InvalidRequest(format!("bad target url: {}", e)))?;
        let mut body = request.body.clone();

        let mut hops = 0;
        loop {
            debug!(server, url = %url, method = %method, "sending probe");
            let mut builder = self.client.request(method.clone(), url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(bytes) = body.take() {
                builder = builder.body(bytes);
            }
            let response = builder.send().await?;

            for value in response.headers().get_all(SET_COOKIE) {
                let value = String::from_utf8_lossy(value.as_bytes());
                if let Some((name, value)) = parse_set_cookie(&value) {
                    self.record_cookie(server, name, value);
                }
            }

            let status = response.status();
            if status.is_redirection() && hops < MAX_REDIRECTS {
                if let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                {
                    url = url
                        .join(location)
                        .map_err(|e| ProbeError::Http(format!("bad redirect target: {}", e)))?;
                    method = Method::GET;
                    hops += 1;
                    continue;
                }
            }

            let reason = status.canonical_reason().map(str::to_string);
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let final_path = response.url().path().to_string();
            let body = if request.read_body {
                response.bytes().await?.to_vec()
            } else {
                // dropping the response here releases the connection without
                // draining a potentially endless body
                Vec::new()
            };

            return Ok(ProbeResponse {
                status: status.as_u16(),
                reason,
                headers,
                body,
                final_path,
                cookies: self.session_cookies(server),
            });
        }
    }
}
