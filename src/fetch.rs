//! HTTP access shared by both scan phases
//!
//! One client fetches page bodies and follows redirects; a second client
//! issues HEAD probes and reports redirect statuses as-is, because a 3xx
//! answer from the registry means the slug exists somewhere.

use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Identifies the tool to operators of scanned sites
const USER_AGENT: &str = concat!(
    "wp-unclaimed/",
    env!("CARGO_PKG_VERSION"),
    " (community tool for ethical security research)"
);

/// Content types we ask for, HTML first
const ACCEPT_HEADER: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Timeout for full body fetches in seconds; pages can be large
const BODY_TIMEOUT_SECS: u64 = 15;

/// Timeout for existence probes in seconds; only headers are needed
const PROBE_TIMEOUT_SECS: u64 = 7;

/// A fetched page: where the request ended up and what it returned
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after following redirects
    pub final_url: String,
    /// Response body text
    pub body: String,
}

/// HTTP requester used for page fetches and registry probes
///
/// Timeouts apply per request. A failed request is final; there are no
/// automatic retries.
#[derive(Debug, Clone)]
pub struct FetchClient {
    body: Client,
    probe: Client,
}

impl FetchClient {
    /// Create a client with the default timeouts
    pub fn new() -> Result<Self> {
        Self::with_timeouts(
            Duration::from_secs(BODY_TIMEOUT_SECS),
            Duration::from_secs(PROBE_TIMEOUT_SECS),
        )
    }

    /// Create a client with custom body-fetch and probe timeouts
    pub fn with_timeouts(body_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        let body = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers())
            .timeout(body_timeout)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        let probe = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers())
            .timeout(probe_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self { body, probe })
    }

    /// Fetch a page body, following redirects.
    ///
    /// Returns the post-redirect URL together with the body text. A 4xx/5xx
    /// terminal status or a transport failure (timeout, DNS, TLS, refused
    /// connection) is an `Err` for the caller to handle as data.
    pub async fn fetch_body(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .body
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(FetchedPage { final_url, body })
    }

    /// Probe a URL for existence with a HEAD request.
    ///
    /// Returns the terminal status without following redirects. `Err` means
    /// the outcome is indeterminate, never "not found".
    pub async fn probe_exists(&self, url: &str) -> Result<StatusCode> {
        let response = self
            .probe
            .head(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(response.status())
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
    headers
}
