use std::fmt;
use std::time::Duration;

use log::{debug, info};
use reqwest::StatusCode;
use serde::Serialize;

use crate::errors::{KonfuzioError, Result};
use crate::models::TokenResponse;
use crate::urls;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Username and password, consumed by [`authenticate`].
#[derive(Clone, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Exchange a username and password for an API token.
///
/// The login request is sent exactly once: a rejected login is not a
/// transient failure.
///
/// # Errors
///
/// - [`KonfuzioError::Authentication`] if the server does not answer 200.
/// - [`KonfuzioError::Http`] if the server cannot be reached.
pub async fn authenticate(host: &str, credentials: Credentials) -> Result<String> {
    let url = urls::auth_token(host);
    debug!("requesting token for {} from {url}", credentials.username);

    let http = reqwest::Client::builder()
        .timeout(LOGIN_TIMEOUT)
        .build()
        .map_err(KonfuzioError::Http)?;

    let response = http.post(&url).json(&credentials).send().await?;

    if response.status() != StatusCode::OK {
        let status = response.status().as_u16();
        return Err(KonfuzioError::Authentication {
            message: format!(
                "login as {} was rejected with status {status}; check your credentials",
                credentials.username
            ),
        });
    }

    let body: TokenResponse = response.json().await?;
    info!("obtained token for {}", credentials.username);
    Ok(body.token)
}
