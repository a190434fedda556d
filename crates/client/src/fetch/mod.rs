//! Static HTTP fetch of a website's markup.
//!
//! ### URL Canonicalization
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Request Shape
//! - Desktop browser `User-Agent`, `Accept`, `Accept-Language` and `Referer`
//!   headers to reduce anti-bot rejections.
//! - Timeout: 15s. Max redirects: 10. Max body bytes: 5MB.
//!
//! ### Status Handling
//! - Any status >= 400 is a failure, whatever the transport accepted.
//! - Transport failures are typed and never retried.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use coverscout_core::{AppConfig, Error};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize};

/// Configuration for the static fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: desktop Chrome)
    pub user_agent: String,

    /// Accept header
    pub accept: String,

    /// Accept-Language header
    pub accept_language: String,

    /// Referer header
    pub referer: String,

    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            accept_language: config.accept_language.clone(),
            referer: config.referer.clone(),
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            max_bytes: config.max_bytes,
        }
    }
}

/// A fully prepared GET request: canonical URL plus everything sent with it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Canonicalized target, always carrying a scheme.
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Redirect hop limit enforced by the client.
    pub max_redirects: usize,
    /// Browser-like headers (`User-Agent` is set on the client).
    pub headers: HeaderMap,
}

/// Response from a successful static fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The canonical URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body, lossily decoded as UTF-8
    pub body: String,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Source of page markup for the static stage.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its markup, or a typed failure.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, Error>;
}

/// reqwest-backed fetcher with browser-like headers.
pub struct StaticFetcher {
    http: Client,
    config: FetchConfig,
}

impl StaticFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Canonicalize `url_str` and attach the configured headers and limits.
    pub fn prepare(&self, url_str: &str) -> Result<FetchRequest, Error> {
        let url = canonicalize(url_str)?;

        let mut headers = HeaderMap::new();
        for (name, value) in [
            (header::ACCEPT, &self.config.accept),
            (header::ACCEPT_LANGUAGE, &self.config.accept_language),
            (header::REFERER, &self.config.referer),
        ] {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(e) => tracing::warn!("skipping invalid {} header value: {}", name, e),
            }
        }

        Ok(FetchRequest { url, timeout: self.config.timeout, max_redirects: self.config.max_redirects, headers })
    }

    /// Send a prepared request and read the body.
    pub async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let FetchRequest { url, timeout, headers, .. } = request;

        let mut response = self
            .http
            .get(url.as_str())
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(&url, &e))?;

        let status = response.status();
        check_status(status)?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify_transport_error(&url, &e))? {
            append_capped(&mut bytes, &chunk, self.config.max_bytes)?;
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(FetchResponse { url, final_url, status, content_type, body, fetch_ms })
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, Error> {
        let request = self.prepare(url)?;
        self.execute(request).await
    }
}

/// Reject any status of 400 and above, including nonstandard codes past 599.
///
/// Redirects that were not followed (and other 1xx/3xx oddities) still pass,
/// leaving it to extraction to find nothing in them.
fn check_status(status: StatusCode) -> Result<(), Error> {
    if status.as_u16() >= 400 {
        return Err(Error::HttpStatus { status: status.as_u16() });
    }
    Ok(())
}

/// Append `chunk` to `buf`, failing once the total would pass `max_bytes`.
fn append_capped(buf: &mut Vec<u8>, chunk: &Bytes, max_bytes: usize) -> Result<(), Error> {
    let total = buf.len() + chunk.len();
    if total > max_bytes {
        return Err(Error::FetchTooLarge(format!("more than {max_bytes} bytes (read {total})")));
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

fn classify_transport_error(url: &Url, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else if err.is_redirect() {
        Error::TooManyRedirects(format!("{url}: {err}"))
    } else {
        Error::Network(format!("{url}: {err}"))
    }
}
