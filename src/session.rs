use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::auth::{authenticate, Credentials};
use crate::errors::{KonfuzioError, Result};
use crate::retry::RetryPolicy;
use crate::urls::DEFAULT_HOST;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_AUTH_SCHEME: &str = "Token";
const DEFAULT_MAX_PAGES: usize = 1000;

/// Builder for constructing a [`Session`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use konfuzio::SessionBuilder;
/// use std::time::Duration;
///
/// # fn example() -> konfuzio::Result<()> {
/// let session = SessionBuilder::new()
///     .token("0123456789abcdef")
///     .host("https://konfuzio.example.com")
///     .timeout(Duration::from_secs(300))
///     .max_attempts(3)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    token: Option<String>,
    host: Option<String>,
    auth_scheme: String,
    timeout: Duration,
    retry: RetryPolicy,
    max_pages: usize,
}

impl SessionBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            token: None,
            host: None,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the API token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the server (defaults to `KONFUZIO_HOST`, then `https://app.konfuzio.com`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Authorization scheme placed before the token (defaults to `Token`).
    pub fn auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Timeout for requests that do not set their own (defaults to 120 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Total attempts for retryable requests, including the first (defaults to 5).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.retry.max_attempts = n.max(1);
        self
    }

    /// Exponential backoff factor in seconds (defaults to 2).
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.retry.backoff_factor = factor;
        self
    }

    /// Replace the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Upper bound on pages followed by a single listing (defaults to 1000).
    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = n.max(1);
        self
    }

    /// Build the [`Session`].
    ///
    /// Without an explicit token the `KONFUZIO_TOKEN` environment variable is
    /// used; [`KonfuzioError::Authentication`] is returned if neither is set.
    pub fn build(self) -> Result<Session> {
        let token = self
            .token
            .or_else(|| std::env::var("KONFUZIO_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| KonfuzioError::Authentication {
                message: "a token is required. Pass it to SessionBuilder::token() \
                          or set the KONFUZIO_TOKEN environment variable."
                    .into(),
            })?;

        let host = self
            .host
            .or_else(|| std::env::var("KONFUZIO_HOST").ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        url::Url::parse(&host)?;

        let mut auth = HeaderValue::from_str(&format!("{} {}", self.auth_scheme, token))
            .map_err(|_| KonfuzioError::Config("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(KonfuzioError::Http)?;

        debug!("created session for {host}");

        Ok(Session {
            host: host.trim_end_matches('/').to_string(),
            http,
            retry: self.retry,
            max_pages: self.max_pages,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An authenticated connection to a Konfuzio server.
///
/// Every API operation is a method on `Session`. Clone it freely; clones
/// share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use konfuzio::Session;
///
/// # async fn example() -> konfuzio::Result<()> {
/// let session = Session::new("0123456789abcdef")?;
///
/// for project in session.list_projects().await? {
///     println!("{} {}", project.id, project.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    host: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    max_pages: usize,
}

impl Session {
    /// Create a session for `token` with default settings.
    ///
    /// For customization, use [`SessionBuilder`] instead.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        SessionBuilder::new().token(token).build()
    }

    /// Create a session from `KONFUZIO_TOKEN` and `KONFUZIO_HOST`.
    pub fn from_env() -> Result<Self> {
        SessionBuilder::new().build()
    }

    /// Exchange credentials for a token and open a session on `host`.
    pub async fn login(host: &str, credentials: Credentials) -> Result<Self> {
        let token = authenticate(host, credentials).await?;
        SessionBuilder::new().host(host).token(token).build()
    }

    /// Start configuring a session; same as [`SessionBuilder::new`].
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Server base URL, without a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Policy applied to every request of this session.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn max_pages(&self) -> usize {
        self.max_pages
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// Send a request, repeating it as the retry policy allows.
    ///
    /// `prepare` attaches body, headers and per-request timeout; it runs once
    /// per attempt because multipart bodies cannot be reused. Responses that
    /// are not retried are returned as-is, whatever their status.
    pub(crate) async fn execute<F>(&self, method: Method, url: &str, prepare: F) -> Result<Response>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder>,
    {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let request = prepare(self.http.request(method.clone(), url))?;
            debug!("{method} {url} (attempt {attempts})");

            let wait = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !self.retry.retries_status(&method, status) {
                        debug!("{method} {url} -> {status}");
                        return Ok(response);
                    }
                    if !self.retry.has_budget(attempts) {
                        return Err(KonfuzioError::TransientServer {
                            status,
                            url: url.to_string(),
                            attempts,
                        });
                    }
                    let wait = self.retry.wait_for(attempts, status, response.headers());
                    warn!("{method} {url} returned {status}, retrying in {wait:?}");
                    wait
                }
                Err(e) => {
                    if !self.retry.retries_error(&method, &e) || !self.retry.has_budget(attempts) {
                        return Err(KonfuzioError::Http(e));
                    }
                    let wait = self.retry.backoff(attempts);
                    warn!("{method} {url} failed ({e}), retrying in {wait:?}");
                    wait
                }
            };

            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// GET `url` and decode the JSON body of a successful response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute(Method::GET, url, Ok).await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into [`KonfuzioError::Api`].
pub(crate) async fn error_for_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let url = response.url().to_string();
    let (message, body) = read_error_body(response).await;

    Err(match status {
        401 => KonfuzioError::Authentication { message },
        _ => KonfuzioError::Api {
            status,
            url,
            message,
            body,
        },
    })
}

/// Require one of `expected`, otherwise fail with [`KonfuzioError::Validation`]
/// naming `resource`.
pub(crate) async fn expect_status(
    response: Response,
    expected: &[u16],
    resource: impl Into<String>,
) -> Result<Response> {
    let status = response.status().as_u16();
    if expected.contains(&status) {
        return Ok(response);
    }

    let (message, _) = read_error_body(response).await;
    Err(KonfuzioError::Validation {
        resource: resource.into(),
        status,
        message,
    })
}

/// Best-effort extraction of an error message from a failed response.
async fn read_error_body(response: Response) -> (String, Option<serde_json::Value>) {
    let text = response.text().await.unwrap_or_default();
    let body: Option<serde_json::Value> = serde_json::from_str(&text).ok();

    let message = body
        .as_ref()
        .and_then(|b| b.get("detail").or_else(|| b.get("error")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or(text);

    (message, body)
}
