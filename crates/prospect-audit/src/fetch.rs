//! Single-page HTTP retrieval with bounded redirects, a response size cap, and
//! failure classification into [`FetchFailure`].

use std::error::Error as _;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use tokio::time::Instant;

use prospect_core::AuditConfig;

use crate::error::{AuditError, FetchFailure};
use crate::rate_limit::HostThrottle;

/// A successfully retrieved page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    /// The URL after redirects.
    pub final_url: Url,
    pub status: u16,
    pub response_time: Duration,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub enum FetchResult {
    Success(FetchedPage),
    Failure(FetchFailure),
}

impl FetchResult {
    #[must_use]
    pub fn page(&self) -> Option<&FetchedPage> {
        match self {
            FetchResult::Success(page) => Some(page),
            FetchResult::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchResult::Success(_) => None,
            FetchResult::Failure(failure) => Some(failure),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }
}

/// Shared HTTP fetcher. One instance serves every business in a run so the
/// per-host courtesy delay applies across the whole worker pool.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    max_response_bytes: u64,
    throttle: HostThrottle,
}

impl Fetcher {
    /// Builds a fetcher from the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::ClientBuild`] if the `reqwest::Client` cannot be
    /// constructed (e.g. TLS backend initialisation failure).
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
            throttle: HostThrottle::new(config.courtesy_delay),
        })
    }

    /// Retrieves `url` once. Never retries; the caller owns retry policy.
    pub async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let parsed = match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => u,
            Ok(u) => {
                return FetchResult::Failure(FetchFailure::Connection(format!(
                    "unsupported scheme '{}'",
                    u.scheme()
                )))
            }
            Err(e) => {
                return FetchResult::Failure(FetchFailure::Connection(format!(
                    "invalid URL '{url}': {e}"
                )))
            }
        };

        self.throttle.wait(parsed.host_str().unwrap_or_default()).await;

        let started = Instant::now();
        let response = match self
            .client
            .get(parsed)
            .timeout(timeout)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => return FetchResult::Failure(classify(&err)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::Failure(FetchFailure::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes)
        {
            return FetchResult::Failure(FetchFailure::TooLarge {
                limit: self.max_response_bytes,
            });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = match read_capped(response, self.max_response_bytes).await {
            Ok(body) => body,
            Err(failure) => return FetchResult::Failure(failure),
        };

        FetchResult::Success(FetchedPage {
            html: String::from_utf8_lossy(&body).into_owned(),
            final_url,
            status: status.as_u16(),
            response_time: started.elapsed(),
            headers,
        })
    }

    /// Lightweight existence check: `HEAD`, falling back to `GET` for servers
    /// that reject `HEAD`. Returns the final status code; the body is never read.
    ///
    /// # Errors
    ///
    /// Returns the classified [`FetchFailure`] if no response was received.
    pub async fn check_link(&self, url: &Url, timeout: Duration) -> Result<u16, FetchFailure> {
        self.throttle.wait(url.host_str().unwrap_or_default()).await;

        let head = self
            .client
            .head(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = head.status().as_u16();
        if status != 405 && status != 501 {
            return Ok(status);
        }

        self.throttle.wait(url.host_str().unwrap_or_default()).await;
        let get = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(&e))?;
        Ok(get.status().as_u16())
    }
}

/// Streams the body, aborting as soon as it exceeds `limit` bytes.
async fn read_capped(mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>, FetchFailure> {
    let mut body: Vec<u8> = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if (body.len() + chunk.len()) as u64 > limit {
                    return Err(FetchFailure::TooLarge { limit });
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(body),
            Err(err) => return Err(classify(&err)),
        }
    }
}

/// Maps a transport error onto the fixed failure taxonomy.
fn classify(err: &reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::Timeout;
    }
    if err.is_redirect() {
        return FetchFailure::Connection("too many redirects".to_string());
    }
    if let Some(cause) = tls_cause(err) {
        return FetchFailure::Tls(cause);
    }
    FetchFailure::Connection(root_cause(err))
}

/// Looks through the source chain (not the top-level message, which embeds
/// the URL) for a certificate or handshake failure.
fn tls_cause(err: &reqwest::Error) -> Option<String> {
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        let lower = text.to_ascii_lowercase();
        if lower.contains("certificate")
            || lower.contains("tls")
            || lower.contains("ssl")
            || lower.contains("handshake")
        {
            return Some(text);
        }
        source = cause.source();
    }
    None
}

fn root_cause(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message = cause.to_string();
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
