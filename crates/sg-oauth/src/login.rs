//! Login orchestrator
//!
//! Runs one complete authorization round-trip: generate the anti-CSRF state,
//! stand up the callback server, open the provider's authorization dialog in
//! the browser, await the redirect with a deadline, and tear everything down.
//! A failed or rejected attempt requires a fresh `login` call; nothing is
//! retried.

use sg_secrets::{KeychainStorage, Token};
use sg_types::{AuthError, AuthResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::callback_server::{CallbackServer, CallbackServerConfig};

/// Bytes of entropy behind the anti-CSRF state value
const STATE_ENTROPY_BYTES: usize = 32;

/// Seam for dispatching the authorization URL to the user
///
/// The default implementation opens the system browser; tests inject a stub
/// that completes (or ignores) the redirect themselves.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> AuthResult<()>;
}

/// Opens URLs with the platform's default browser
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        open::that(url)
            .map_err(|e| AuthError::OAuthBrowser(format!("Failed to open browser: {}", e)))
    }
}

/// Configuration for one login flow
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Provider authorization dialog endpoint
    pub dialog_url: String,

    /// Keychain service under which the anti-CSRF state is kept for the
    /// duration of the attempt (account = the app id token's user)
    pub state_service: String,

    /// Callback server port on loopback; 0 picks an ephemeral port
    pub callback_port: u16,

    /// Path the provider redirects to
    pub redirect_path: String,

    /// Deadline for the whole browser round-trip
    pub timeout: Duration,
}

/// Orchestrates browser-based logins
pub struct LoginFlow {
    keychain: Arc<dyn KeychainStorage>,
    browser: Arc<dyn BrowserOpener>,
}

impl LoginFlow {
    /// Create a flow that dispatches to the system browser
    pub fn new(keychain: Arc<dyn KeychainStorage>) -> Self {
        Self::with_browser(keychain, Arc::new(SystemBrowser))
    }

    /// Create a flow with a custom browser opener
    pub fn with_browser(keychain: Arc<dyn KeychainStorage>, browser: Arc<dyn BrowserOpener>) -> Self {
        Self { keychain, browser }
    }

    /// Run one authorization code round-trip
    ///
    /// Returns the authorization code on success. Terminal failures are
    /// `Csrf` (state mismatch on the redirect) and `Timeout` (no redirect
    /// before the deadline). The callback server and the anti-CSRF keychain
    /// entry are torn down on every path.
    pub async fn login(&self, app_id: &Token, config: &FlowConfig) -> AuthResult<String> {
        let client_id = app_id.get()?;

        // Fresh anti-CSRF state per attempt, persisted as a temporary Token.
        let anticsrf = Token::temporary(
            self.keychain.clone(),
            config.state_service.clone(),
            app_id.user(),
        );
        anticsrf.set_random(STATE_ENTROPY_BYTES, true)?;

        let outcome = self.attempt(&client_id, &anticsrf, config).await;

        if let Err(e) = anticsrf.clear() {
            warn!("Failed to clear anti-CSRF token: {}", e);
        }

        outcome
    }

    async fn attempt(
        &self,
        client_id: &str,
        anticsrf: &Token,
        config: &FlowConfig,
    ) -> AuthResult<String> {
        let state = anticsrf.get()?;

        // Binding completes before start() returns, so the listener is
        // accepting connections by the time the browser opens.
        let mut handle = CallbackServer::start(CallbackServerConfig {
            port: config.callback_port,
            redirect_path: config.redirect_path.clone(),
            expected_state: Some(state.clone()),
        })
        .await?;

        let auth_url =
            build_authorization_url(&config.dialog_url, client_id, &handle.redirect_uri(), &state);
        debug!("Opening authorization dialog: {}", config.dialog_url);

        let outcome = match self.browser.open(&auth_url) {
            Ok(()) => handle.result(config.timeout).await,
            Err(e) => Err(e),
        };

        handle.stop();

        match &outcome {
            Ok(_) => info!("Login round-trip complete"),
            Err(e) => warn!("Login attempt failed: {}", e),
        }
        outcome
    }
}

/// Build the provider authorization URL
fn build_authorization_url(
    dialog_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&state={}",
        dialog_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state),
    )
}
