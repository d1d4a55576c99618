//! Keychain storage and the `Token` secret handle
//!
//! Secrets live in the OS's native secret store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service / keyutils
//!
//! `KeychainStorage` abstracts the store for testability; `Token` is a typed
//! handle over one (service, user) entry that enforces the temp/permanent
//! mutation policy.

mod keychain;
mod token;

pub use keychain::{KeychainStorage, MockKeychain, SystemKeychain};
pub use token::Token;
