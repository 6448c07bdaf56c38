// File: crates/bookline_gcal/src/auth.rs
use bookline_common::services::{BoxFuture, TokenProvider};
use bookline_common::HTTP_CLIENT;
use bookline_config::GcalConfig;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Sentinel left in place by provisioning templates; treated as absent.
pub const TOKEN_PLACEHOLDER: &str = "PASTE_YOUR_ACCESS_TOKEN_HERE";

const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum GcalAuthError {
    /// Error occurred during the token request
    #[error("OAuth token request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status
    #[error("OAuth token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// Neither a static token nor a refresh-token triple is configured
    #[error("Google OAuth credentials missing or incomplete")]
    ConfigError,
}

#[derive(Deserialize, Debug)]
struct GoogleTokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: Option<i64>,
}

/// Bearer-credential provider for the Google Calendar API.
///
/// Two modes, decided at construction from the config:
/// - a statically provisioned access token (never refreshed), or
/// - a refresh-token exchange against the Google token endpoint, cached
///   until a consumer observes a 401 and calls [`invalidate`].
///
/// The cache lives behind a mutex, so concurrent refreshes are at worst
/// redundant, never torn.
///
/// [`invalidate`]: GoogleTokenProvider::invalidate
pub struct GoogleTokenProvider {
    http: Client,
    static_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
    cached: Mutex<Option<String>>,
    token_url: String,
}

impl GoogleTokenProvider {
    pub fn new(config: &GcalConfig) -> Self {
        let static_token = config
            .access_token
            .clone()
            .filter(|token| token != TOKEN_PLACEHOLDER);
        if static_token.is_some() {
            info!("Using statically provisioned Google access token");
        }
        Self {
            http: HTTP_CLIENT.clone(),
            static_token,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            cached: Mutex::new(None),
            token_url: GOOGLE_TOKEN_ENDPOINT.to_string(),
        }
    }

    /// True when the provider has any chance of producing a credential.
    pub fn is_configured(&self) -> bool {
        self.static_token.is_some()
            || (self.client_id.is_some()
                && self.client_secret.is_some()
                && self.refresh_token.is_some())
    }

    /// Return a usable bearer token, refreshing it if necessary.
    pub async fn acquire_token(&self) -> Result<String, GcalAuthError> {
        if let Some(token) = &self.static_token {
            return Ok(token.clone());
        }
        if let Some(token) = self.cached.lock().expect("token cache poisoned").clone() {
            return Ok(token);
        }
        let token = self.refresh().await?;
        *self.cached.lock().expect("token cache poisoned") = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next acquisition refreshes it.
    pub fn invalidate_token(&self) {
        debug!("Invalidating cached Google access token");
        self.cached.lock().expect("token cache poisoned").take();
    }

    async fn refresh(&self) -> Result<String, GcalAuthError> {
        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            self.client_id.as_deref(),
            self.client_secret.as_deref(),
            self.refresh_token.as_deref(),
        ) else {
            return Err(GcalAuthError::ConfigError);
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcalAuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: GoogleTokenResponse = response.json().await?;
        info!("Refreshed Google access token");
        Ok(token.access_token)
    }
}

impl TokenProvider for GoogleTokenProvider {
    type Error = GcalAuthError;

    fn acquire(&self) -> BoxFuture<'_, String, Self::Error> {
        Box::pin(self.acquire_token())
    }

    fn invalidate(&self) {
        self.invalidate_token();
    }
}
