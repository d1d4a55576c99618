//! Local OAuth callback server
//!
//! A minimal HTTP server on loopback that catches the provider's redirect
//! after the user completes authorization in their browser. The server runs
//! as a background tokio task; the returned handle owns the single-slot
//! result channel and the shutdown signal, so no state outlives the handle.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use sg_types::{AuthError, AuthResult};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Configuration for a callback server, fixed at construction
#[derive(Debug, Clone)]
pub struct CallbackServerConfig {
    /// Port to bind on loopback; 0 picks an ephemeral port
    pub port: u16,

    /// Path the provider redirects to (e.g. "/facebook_login")
    pub redirect_path: String,

    /// Anti-CSRF value the redirect's `state` parameter must match exactly.
    /// When `None`, no state verification is performed.
    pub expected_state: Option<String>,
}

/// Query parameters on the OAuth redirect
#[derive(Debug, Deserialize)]
struct RedirectQuery {
    code: Option<String>,
    state: Option<String>,
}

/// Shared state for the request handlers
#[derive(Clone)]
struct ListenerState {
    expected_state: Option<String>,
    /// Single-slot, first-write-wins result channel. The sender is taken out
    /// on the first emit; later redirects are logged and dropped.
    result_tx: Arc<Mutex<Option<oneshot::Sender<AuthResult<String>>>>>,
}

impl ListenerState {
    fn emit(&self, outcome: AuthResult<String>) {
        match self.result_tx.lock().take() {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    warn!("Redirect result receiver dropped before delivery");
                }
            }
            None => debug!("Redirect result already produced; ignoring duplicate callback"),
        }
    }
}

/// The local redirect listener
pub struct CallbackServer;

impl CallbackServer {
    /// Bind on loopback and start serving in a background task
    ///
    /// Returns once the socket is bound, so a successful return doubles as
    /// the readiness confirmation; no startup delay is needed before opening
    /// the authorization URL.
    pub async fn start(config: CallbackServerConfig) -> AuthResult<CallbackServerHandle> {
        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = ListenerState {
            expected_state: config.expected_state.clone(),
            result_tx: Arc::new(Mutex::new(Some(result_tx))),
        };

        let app = Router::new()
            .route("/health", get(health_handler))
            .route(&config.redirect_path, get(redirect_handler))
            .with_state(state);

        let addr = format!("127.0.0.1:{}", config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            AuthError::OAuthBrowser(format!(
                "Failed to bind callback server on {}: {}",
                addr, e
            ))
        })?;
        let local_addr = listener.local_addr()?;

        info!(
            "Callback server listening on http://{}{}",
            local_addr, config.redirect_path
        );

        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                error!("Callback server error: {}", e);
            }
        });

        Ok(CallbackServerHandle {
            addr: local_addr,
            redirect_path: config.redirect_path,
            result_rx: Some(result_rx),
            shutdown_tx: Some(shutdown_tx),
            server,
        })
    }
}

/// Handle to a running callback server
///
/// Exposes the redirect result with a deadline and an idempotent `stop`.
/// Dropping the handle also tears the server down, so a failed login attempt
/// never leaves an orphaned listener.
pub struct CallbackServerHandle {
    addr: SocketAddr,
    redirect_path: String,
    result_rx: Option<oneshot::Receiver<AuthResult<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: tokio::task::JoinHandle<()>,
}

impl CallbackServerHandle {
    /// Actual bound address (relevant when the config asked for port 0)
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Redirect URI the provider should be pointed at
    pub fn redirect_uri(&self) -> String {
        format!("http://{}{}", self.addr, self.redirect_path)
    }

    /// Await the redirect result, up to `timeout`
    ///
    /// Resolves with the authorization code, a `Csrf` error on state
    /// mismatch, or a dedicated `Timeout` error once the deadline elapses.
    /// The result can be consumed once per login attempt.
    pub async fn result(&mut self, timeout: Duration) -> AuthResult<String> {
        let rx = self.result_rx.take().ok_or_else(|| {
            AuthError::OAuthBrowser("Redirect result already consumed".to_string())
        })?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(AuthError::OAuthBrowser(
                "Callback server closed before a redirect arrived".to_string(),
            )),
            Err(_) => {
                warn!("No OAuth redirect within {:?}, giving up", timeout);
                Err(AuthError::Timeout(timeout))
            }
        }
    }

    /// Shut the server down; safe to call more than once
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            debug!("Callback server on {} shutting down", self.addr);
        }
        // Graceful shutdown still waits for open connections; the task is
        // aborted so teardown is bounded.
        self.server.abort();
    }
}

impl Drop for CallbackServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `GET /health` - proves the server is accepting connections
async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// The OAuth redirect target
///
/// Verifies the anti-CSRF state when one is configured, then hands the
/// authorization code to the orchestrator through the result channel.
async fn redirect_handler(
    State(state): State<ListenerState>,
    Query(params): Query<RedirectQuery>,
) -> (StatusCode, &'static str) {
    if let Some(ref expected) = state.expected_state {
        match params.state {
            Some(ref got) if got == expected => {}
            Some(_) => {
                warn!("OAuth redirect with mismatched state parameter");
                state.emit(Err(AuthError::Csrf));
                return (StatusCode::FORBIDDEN, "Forbidden");
            }
            None => {
                warn!("OAuth redirect without a state parameter");
                return (StatusCode::BAD_REQUEST, "Bad Request");
            }
        }
    }

    // An empty `code=` counts as no code at all; the slot stays open for a
    // later redirect that actually carries one.
    match params.code {
        Some(code) if !code.is_empty() => {
            info!("OAuth redirect received with authorization code");
            state.emit(Ok(code));
            (StatusCode::OK, "Success")
        }
        _ => {
            warn!("OAuth redirect without an authorization code");
            (StatusCode::BAD_REQUEST, "Bad Request")
        }
    }
}
