//! Rate-limited HTTP client
//!
//! Both the metadata API and the streaming site are reached through
//! [`HttpClient`]. It spaces requests out, sends a browser user-agent and
//! retries rate-limit and server errors with exponential backoff up to a
//! configured number of attempts.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{AnistreamError, Result};

/// Default User-Agent mimicking a modern browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Base delay for exponential backoff (in milliseconds)
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// # Example
    /// ```
    /// use anistream_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(2.0).unwrap(); // 2 requests per second
    /// assert!(RateLimiter::new(1e-30).is_err());
    /// ```
    ///
    /// # Errors
    /// `AnistreamError::Config` if the rate is not positive or its interval
    /// does not fit a `Duration`.
    pub fn new(requests_per_second: f64) -> Result<Self> {
        let min_interval = interval_for(requests_per_second).ok_or_else(|| {
            AnistreamError::Config(format!(
                "rate of {} requests per second is out of range",
                requests_per_second
            ))
        })?;

        Ok(Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    /// Acquire permission to make a request
    ///
    /// Waits if necessary so the minimum interval between requests is respected.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Spacing between requests at `requests_per_second`, if representable.
fn interval_for(requests_per_second: f64) -> Option<Duration> {
    if !(requests_per_second > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second).ok()
}

/// Configuration for one HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Retries after a 429 or 5xx answer (default: 0)
    pub max_retries: u32,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            timeout_secs: 30,
            max_retries: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub(crate) fn validate(&self, section: &str) -> Result<()> {
        if interval_for(self.requests_per_second).is_none() {
            return Err(AnistreamError::Config(format!(
                "{}.requests_per_second must be positive and not vanishingly small",
                section
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AnistreamError::Config(format!(
                "{}.timeout_secs must be positive",
                section
            )));
        }
        Ok(())
    }
}

/// Something that can download a page as text.
///
/// The stream resolver only needs this much, which keeps it testable
/// without a network.
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body of a successful response.
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client with rate limiting and retry logic
pub struct HttpClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate("client")?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second)?,
            max_retries: config.max_retries,
        })
    }

    /// Fetch a URL and return the response body as text
    ///
    /// # Errors
    /// - `AnistreamError::HttpError` - Network error or timeout
    /// - `AnistreamError::RateLimited` - Server returned 429 after all retries
    /// - `AnistreamError::NotFound` - Server returned 404
    /// - `AnistreamError::HttpStatus` - Any other non-success status
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;

            debug!(url = %url, attempt = attempt + 1, "GET");
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AnistreamError::NotFound(url.to_string()));
            }

            let retryable =
                status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && attempt < self.max_retries {
                let delay = self.calculate_backoff_delay(attempt);
                warn!(url = %url, status = %status, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(AnistreamError::RateLimited);
            }

            return Err(AnistreamError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }

    /// Fetch a URL and decode the JSON body
    ///
    /// A body that does not match `T` is reported as `AnistreamError::ParseError`.
    pub async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| AnistreamError::ParseError(e.to_string()))
    }

    /// Calculate exponential backoff delay for retry
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        // Exponential backoff: 1s, 2s, 4s, ...
        let delay_ms = BASE_RETRY_DELAY_MS * 2u64.pow(attempt);
        Duration::from_millis(delay_ms)
    }
}

impl PageFetcher for HttpClient {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        self.fetch_text(url)
    }
}
