//! Facebook provider endpoints and keychain locations
//!
//! Information on Facebook access tokens:
//! <https://developers.facebook.com/docs/facebook-login/access-tokens>

use sg_secrets::{KeychainStorage, Token};
use std::sync::Arc;
use std::time::Duration;

use crate::login::FlowConfig;

pub const GRAPH_DOMAIN: &str = "graph.facebook.com";
pub const DIALOG_DOMAIN: &str = "www.facebook.com";
pub const API_VERSION: &str = "v12.0";

/// Keychain locations for the Facebook app credentials
pub const APP_ID_SERVICE: &str = "socialgate_fb_app_id";
pub const APP_SECRET_SERVICE: &str = "socialgate_fb_app_secret";
pub const ANTICSRF_SERVICE: &str = "socialgate_fb_login_anticsrf";
pub const ACCOUNT: &str = "socialgate";

pub const CALLBACK_PORT: u16 = 5002;
pub const REDIRECT_PATH: &str = "/facebook_login";
pub const LOGIN_TIMEOUT_SECS: u64 = 30;

/// Authorization dialog endpoint (opened in the browser, not fetched)
pub fn dialog_url() -> String {
    format!("https://{}/{}/dialog/oauth", DIALOG_DOMAIN, API_VERSION)
}

/// Token endpoint on the Graph API
pub fn access_token_url() -> String {
    format!("https://{}/{}/oauth/access_token", GRAPH_DOMAIN, API_VERSION)
}

/// Default login flow configuration for Facebook
pub fn flow_config() -> FlowConfig {
    FlowConfig {
        dialog_url: dialog_url(),
        state_service: ANTICSRF_SERVICE.to_string(),
        callback_port: CALLBACK_PORT,
        redirect_path: REDIRECT_PATH.to_string(),
        timeout: Duration::from_secs(LOGIN_TIMEOUT_SECS),
    }
}

/// Handle to the provisioned app id (read-only)
pub fn app_id_token(keychain: Arc<dyn KeychainStorage>) -> Token {
    Token::new(keychain, APP_ID_SERVICE, ACCOUNT)
}

/// Handle to the provisioned app secret (read-only)
pub fn app_secret_token(keychain: Arc<dyn KeychainStorage>) -> Token {
    Token::new(keychain, APP_SECRET_SERVICE, ACCOUNT)
}
