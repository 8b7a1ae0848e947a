//! Heritage archive API client
//!
//! Issues the two content queries against the archive and classifies the
//! response into a [`LookupOutcome`]. The client owns the only
//! `reqwest::Client` of the run; proxy settings, user agent and timeout are
//! applied once at construction.

use crate::error::{AgentError, AgentResult};
use crate::models::LookupOutcome;
use lichen_common::config::{HeritageConfig, ProxyConfig};
use lichen_common::Error;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("lichen-swh/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// License facts body returned by the license sub-resource on 200
#[derive(Debug, Deserialize)]
struct LicenseFacts {
    #[serde(default)]
    facts: Vec<Fact>,
}

#[derive(Debug, Deserialize)]
struct Fact {
    #[serde(default)]
    licenses: Vec<String>,
}

/// Heritage archive API client
pub struct HeritageClient {
    http_client: reqwest::Client,
    base_url: String,
    uri: String,
    license_suffix: String,
}

impl HeritageClient {
    pub fn new(config: &HeritageConfig) -> AgentResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            // Proxy selection comes from the run configuration alone, never
            // from ambient environment variables
            .no_proxy();

        for proxy in build_proxies(&config.proxy)? {
            builder = builder.proxy(proxy);
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("HTTP client construction failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            uri: config.uri.clone(),
            license_suffix: config.license_suffix.clone(),
        })
    }

    fn license_url(&self, sha256: &str) -> String {
        format!("{}{}{}{}", self.base_url, self.uri, sha256, self.license_suffix)
    }

    fn content_url(&self, sha256: &str) -> String {
        format!("{}{}{}", self.base_url, self.uri, sha256)
    }

    /// Query the archive for one content hash's license facts.
    ///
    /// Classification:
    /// - 200: license facts body, first fact's license list
    /// - 429: rate limited, reset timestamp from `X-RateLimit-Reset`
    /// - 404: fall back to the content-existence endpoint; a body carrying a
    ///   `status` field means the content is known but has no license facts
    ///
    /// Anything else (including a 429 without a usable reset header, or a
    /// malformed 200 body) is a transport-class error the caller treats as
    /// fatal to the run.
    pub async fn lookup(&self, sha256: &str) -> AgentResult<LookupOutcome> {
        let url = self.license_url(sha256);
        debug!(url = %url, "Querying heritage license facts");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: LicenseFacts = response.json().await.map_err(|e| {
                    AgentError::Transport(format!("GET {}: malformed license facts body: {}", url, e))
                })?;
                let licenses = body
                    .facts
                    .into_iter()
                    .next()
                    .map(|fact| fact.licenses)
                    .unwrap_or_default();
                Ok(LookupOutcome::Found { licenses })
            }
            429 => {
                let reset_at = response
                    .headers()
                    .get(RATE_LIMIT_RESET_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .ok_or_else(|| {
                        AgentError::Transport(format!(
                            "GET {}: 429 without a parsable {} header",
                            url, RATE_LIMIT_RESET_HEADER
                        ))
                    })?;
                Ok(LookupOutcome::RateLimited { reset_at })
            }
            404 => self.check_content_known(sha256).await,
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(AgentError::Transport(format!(
                    "GET {}: unexpected status {}: {}",
                    url,
                    status,
                    snippet(&body)
                )))
            }
        }
    }

    /// Secondary existence check after a 404 on the license sub-resource.
    ///
    /// The archive may know a content without holding license facts for it;
    /// such contents answer here with a body carrying a `status` field and
    /// are recorded as found with no licenses.
    async fn check_content_known(&self, sha256: &str) -> AgentResult<LookupOutcome> {
        let url = self.content_url(sha256);
        debug!(url = %url, "No license facts; checking content existence");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("GET {}: {}", url, e)))?;

        let body: serde_json::Value = match response.json().await {
            Ok(value) => value,
            // An unparsable existence body classifies the same as an absent
            // `status` field
            Err(_) => return Ok(LookupOutcome::NotFound),
        };

        if body.get("status").is_some() {
            Ok(LookupOutcome::Found { licenses: Vec::new() })
        } else {
            Ok(LookupOutcome::NotFound)
        }
    }
}

fn build_proxies(config: &ProxyConfig) -> AgentResult<Vec<reqwest::Proxy>> {
    let no_proxy = config
        .no_proxy
        .as_deref()
        .and_then(reqwest::NoProxy::from_string);

    let mut proxies = Vec::new();
    if let Some(url) = &config.http {
        let proxy = reqwest::Proxy::http(url)
            .map_err(|e| Error::Config(format!("Invalid HTTP proxy {}: {}", url, e)))?;
        proxies.push(proxy.no_proxy(no_proxy.clone()));
    }
    if let Some(url) = &config.https {
        let proxy = reqwest::Proxy::https(url)
            .map_err(|e| Error::Config(format!("Invalid HTTPS proxy {}: {}", url, e)))?;
        proxies.push(proxy.no_proxy(no_proxy));
    }
    Ok(proxies)
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..end]
}
