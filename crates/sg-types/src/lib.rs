//! Shared types for socialgate

pub mod errors;

pub use errors::{AuthError, AuthResult};
