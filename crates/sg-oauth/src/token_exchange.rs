//! OAuth token exchange
//!
//! Exchanges a captured authorization code for an access token with a single
//! outbound call. Transport or decode failures propagate directly; there is
//! no retry or backoff.

use reqwest::Client;
use serde_json::{Map, Value};
use sg_secrets::Token;
use sg_types::{AuthError, AuthResult};
use tracing::{debug, error, info};

/// Token exchanger for OAuth flows
pub struct TokenExchanger {
    client: Client,
}

impl TokenExchanger {
    /// Create a new token exchanger
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Exchange an authorization code for an access token
    ///
    /// Issues a GET against the provider's token endpoint with `client_id`,
    /// `redirect_uri`, `client_secret`, and `code`, and returns the JSON
    /// response body as a mapping, unmodified.
    pub async fn get_access_token(
        &self,
        token_url: &str,
        app_id: &Token,
        redirect_uri: &str,
        app_secret: &Token,
        code: &str,
    ) -> AuthResult<Map<String, Value>> {
        let query = [
            ("client_id", app_id.get()?),
            ("redirect_uri", redirect_uri.to_string()),
            ("client_secret", app_secret.get()?),
            ("code", code.to_string()),
        ];

        debug!("Requesting access token from {}", token_url);

        let response = self
            .client
            .get(token_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AuthError::OAuthBrowser(format!("Failed to send token request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange failed with status {}: {}", status, body);
            return Err(AuthError::OAuthBrowser(format!(
                "Token exchange failed with status {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(|e| {
            AuthError::OAuthBrowser(format!("Failed to read token response: {}", e))
        })?;
        let mapping: Map<String, Value> = serde_json::from_str(&body)?;

        info!("Token exchange successful");
        Ok(mapping)
    }
}

impl Default for TokenExchanger {
    fn default() -> Self {
        Self::new()
    }
}
