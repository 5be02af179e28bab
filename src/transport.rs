//! # HTTP Transport
//!
//! The seam between the remote client and the network:
//!
//! - [`Transport`] - one request, one body, no retries
//! - [`HttpTransport`] - the real thing, a blocking `reqwest` client
//! - [`Clock`] / [`SystemClock`] - time and sleeping, so waits can be faked
//! - [`RateLimiter`] - minimum spacing between outbound requests
//!
//! Everything here is blocking. The watcher runs on a single thread with a
//! multi-second cadence, so stalling it for a rate-limit wait is acceptable.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::TransportError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const REFERER_URL: &str = "https://music.163.com/";

/// A single HTTP exchange returning the response body.
///
/// Implementations report connection errors, timeouts and non-2xx statuses
/// as [`TransportError`]; they never retry.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError>;

    fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<String, TransportError>;
}

/// Blocking `reqwest` transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    fn read_body(result: reqwest::Result<Response>) -> Result<String, TransportError> {
        let response = result.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response.text().map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
        debug!("GET {url} {query:?}");
        Self::read_body(self.client.get(url).query(query).send())
    }

    fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<String, TransportError> {
        debug!("POST {url} ({} form fields)", form.len());
        Self::read_body(self.client.post(url).form(form).send())
    }
}

/// Source of time for rate limiting and backoff.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

/// Wall clock; `sleep` blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Keeps outbound requests at least `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Block until the next request may go out, then record it as sent.
    pub fn wait(&mut self, clock: &dyn Clock) {
        if let Some(last) = self.last_request {
            let elapsed = clock.now().saturating_duration_since(last);
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!("Rate limit: waiting {:.3}s", remaining.as_secs_f64());
                clock.sleep(remaining);
            }
        }
        self.last_request = Some(clock.now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
