//! CastPoll backend client for the authorization flow
//!
//! The backend owns the provider protocol: it builds the authorization URL
//! and exchanges the short-lived code for user data. This core treats both
//! as opaque single calls with a success/failure outcome only.

use async_trait::async_trait;
use cp_types::{AppError, AppResult, UserData};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

/// Collapsed failure message for a code exchange
///
/// Unreachable endpoint and structured error body both surface as this one
/// message; the distinction only goes to the log.
pub const EXCHANGE_FAILED: &str = "Failed to authenticate with Twitch";

/// Backend collaborator the coordinator exchanges codes through
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Fetch the provider authorization URL
    async fn authorization_url(&self) -> AppResult<String>;

    /// Exchange an authorization code for user data
    async fn exchange_code(&self, code: &str) -> AppResult<UserData>;
}

/// Response body of the authorization URL endpoint
#[derive(Debug, Deserialize)]
struct AuthUrlResponse {
    url: String,
}

/// Response body of the auth status endpoint
#[derive(Debug, Deserialize)]
struct AuthStatusResponse {
    #[serde(default)]
    authenticated: bool,
}

/// HTTP client for the CastPoll backend auth API
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    /// Create a client against the given API base URL
    /// (e.g. `http://localhost:8080/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Check whether a user still has a valid backend session
    pub async fn auth_status(&self, user_id: &str) -> AppResult<bool> {
        let url = format!(
            "{}/auth/twitch/status/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to check auth status: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Auth status check failed with status {}",
                response.status()
            )));
        }

        let status: AuthStatusResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse auth status response: {}", e)))?;

        Ok(status.authenticated)
    }

    /// Log the user out of the backend session
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        let url = format!(
            "{}/auth/twitch/logout/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send logout request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Logout failed with status {}",
                response.status()
            )));
        }

        info!("User {} logged out", user_id);
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn authorization_url(&self) -> AppResult<String> {
        let url = format!("{}/auth/twitch/url", self.base_url);
        debug!("Fetching authorization URL from backend");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to fetch authorization URL: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Authorization URL request failed with status {}",
                response.status()
            )));
        }

        let body: AuthUrlResponse = response.json().await.map_err(|e| {
            AppError::Backend(format!("Failed to parse authorization URL response: {}", e))
        })?;

        Ok(body.url)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<UserData> {
        let url = format!(
            "{}/auth/twitch/callback?code={}",
            self.base_url,
            urlencoding::encode(code)
        );

        info!("Exchanging authorization code with backend");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Code exchange request failed: {}", e);
                return Err(AppError::Backend(EXCHANGE_FAILED.to_string()));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Code exchange failed with status {}: {}", status, body);
            return Err(AppError::Backend(EXCHANGE_FAILED.to_string()));
        }

        let user: UserData = match response.json().await {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to parse code exchange response: {}", e);
                return Err(AppError::Backend(EXCHANGE_FAILED.to_string()));
            }
        };

        info!("Code exchange successful for user {}", user.user_id);
        Ok(user)
    }
}
