//! Error types and conversions

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The requested secret is absent (or empty) in the OS secret store.
    #[error("secret '{service}:{user}' not found in OS secret store")]
    SecretDoesNotExist { service: String, user: String },

    /// A mutation was attempted on a Token that was not marked temporary.
    #[error("secret '{service}:{user}' is permanent and cannot be modified")]
    PermanentSecret { service: String, user: String },

    /// The `state` parameter on the OAuth redirect did not match the value
    /// generated for this login attempt.
    #[error("anti-CSRF state mismatch on OAuth redirect")]
    Csrf,

    /// No redirect arrived before the login deadline elapsed.
    #[error("timed out after {0:?} waiting for OAuth redirect")]
    Timeout(Duration),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("OAuth browser flow error: {0}")]
    OAuthBrowser(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<AuthError> for String {
    fn from(err: AuthError) -> String {
        err.to_string()
    }
}
