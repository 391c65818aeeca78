use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Method;

/// Statuses that trigger a retry of an idempotent request.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Decides which failed requests are repeated and how long to wait in between.
///
/// Only idempotent methods (GET, HEAD, PUT, DELETE, OPTIONS, TRACE) are
/// retried on a bad status. POST and PATCH may create or mutate resources
/// and are sent exactly once unless the connection could not be opened.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Seconds; the wait before retry `n` is `factor * 2^(n-1)`.
    pub backoff_factor: f64,
    pub statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// A policy that sends every request exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Whether repeating a `method` request cannot change the outcome on the server.
    pub fn is_idempotent(method: &Method) -> bool {
        matches!(
            *method,
            Method::GET
                | Method::HEAD
                | Method::PUT
                | Method::DELETE
                | Method::OPTIONS
                | Method::TRACE
        )
    }

    /// Whether a response with `status` to a `method` request is worth repeating.
    pub fn retries_status(&self, method: &Method, status: u16) -> bool {
        Self::is_idempotent(method) && self.statuses.contains(&status)
    }

    /// Whether a transport error is worth repeating.
    ///
    /// Connection failures never reached the server, so any method is safe.
    pub fn retries_error(&self, method: &Method, err: &reqwest::Error) -> bool {
        err.is_connect() || (Self::is_idempotent(method) && (err.is_timeout() || err.is_request()))
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn has_budget(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Wait before the next attempt, given the number of failed attempts so far.
    ///
    /// The first retry goes out immediately; later ones back off exponentially,
    /// never longer than two minutes. A NaN or non-positive factor disables
    /// waiting.
    pub fn backoff(&self, failures: u32) -> Duration {
        if failures <= 1 || self.backoff_factor.is_nan() || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exp = (failures - 1).min(16) as i32;
        let secs = self.backoff_factor * 2f64.powi(exp);
        Duration::try_from_secs_f64(secs).map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    /// Wait before retrying a response, honoring `Retry-After` on 429/503.
    pub fn wait_for(&self, failures: u32, status: u16, headers: &HeaderMap) -> Duration {
        let backoff = self.backoff(failures);
        if status != 429 && status != 503 {
            return backoff;
        }
        match parse_retry_after(headers) {
            Some(server) => backoff.max(server.min(MAX_BACKOFF)),
            None => backoff,
        }
    }
}

/// Reads a delta-seconds `Retry-After` header.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
