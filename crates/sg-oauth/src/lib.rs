//! Browser-based OAuth 2.0 authorization code flow for socialgate
//!
//! Automates the manual "authorization code" login round-trip against a
//! social provider from a local desktop context:
//! - a short-lived callback server on loopback catches the provider redirect,
//! - the orchestrator opens the authorization dialog in the user's browser
//!   and awaits the redirect result with a deadline,
//! - anti-CSRF state is generated per attempt, kept as a temporary keychain
//!   Token, and verified byte-for-byte on the redirect,
//! - the captured code can then be exchanged for an access token.
//!
//! # Usage Example
//! ```no_run
//! use std::sync::Arc;
//! use sg_oauth::{facebook, LoginFlow};
//! use sg_secrets::SystemKeychain;
//!
//! # async fn run() -> sg_types::AuthResult<()> {
//! let keychain = Arc::new(SystemKeychain);
//! let app_id = facebook::app_id_token(keychain.clone());
//! let flow = LoginFlow::new(keychain);
//! let _code = flow.login(&app_id, &facebook::flow_config()).await?;
//! # Ok(())
//! # }
//! ```

mod callback_server;
pub mod facebook;
mod login;
mod token_exchange;

pub use callback_server::{CallbackServer, CallbackServerConfig, CallbackServerHandle};
pub use login::{BrowserOpener, FlowConfig, LoginFlow, SystemBrowser};
pub use token_exchange::TokenExchanger;
