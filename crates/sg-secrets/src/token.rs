//! Typed handle over a single secret store entry
//!
//! A `Token` names one (service, user) entry in the OS secret store. Tokens
//! constructed with `Token::new` are permanent: they can be read but never
//! written or deleted through this handle. `Token::temporary` opts in to
//! mutation. The flag is a soft safety convention against clobbering
//! provisioned credentials, not a security boundary.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use sg_types::{AuthError, AuthResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::keychain::KeychainStorage;

/// A secret stored in the OS's native secret store
#[derive(Clone)]
pub struct Token {
    service: String,
    user: String,
    temp: bool,
    keychain: Arc<dyn KeychainStorage>,
}

impl Token {
    /// Create a permanent Token handle (read-only through this API)
    pub fn new(
        keychain: Arc<dyn KeychainStorage>,
        service: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
            temp: false,
            keychain,
        }
    }

    /// Create a temporary Token handle (mutable and deletable)
    pub fn temporary(
        keychain: Arc<dyn KeychainStorage>,
        service: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
            temp: true,
            keychain,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn is_temp(&self) -> bool {
        self.temp
    }

    /// Fetch the secret value from the store
    ///
    /// An absent entry and an empty value are both treated as missing.
    pub fn get(&self) -> AuthResult<String> {
        trace!("Token: fetching {}:{}", self.service, self.user);
        match self.keychain.get(&self.service, &self.user)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(AuthError::SecretDoesNotExist {
                service: self.service.clone(),
                user: self.user.clone(),
            }),
        }
    }

    /// Store a value, overwriting any prior one
    ///
    /// Fails with `PermanentSecret` unless this Token is temporary.
    pub fn set(&self, value: &str) -> AuthResult<()> {
        self.check_temp()?;
        self.keychain.store(&self.service, &self.user, value)?;
        debug!("Token: set {}:{}", self.service, self.user);
        Ok(())
    }

    /// Generate and store a cryptographically secure random value
    ///
    /// With `urlsafe` the stored value is a base64url token (no padding)
    /// derived from `length` bytes of entropy. Without it the value is
    /// `length` raw random bytes decoded as UTF-8, which fails for most byte
    /// sequences; callers putting the value in a URL should pass `urlsafe`.
    pub fn set_random(&self, length: usize, urlsafe: bool) -> AuthResult<()> {
        self.check_temp()?;

        let rng = SystemRandom::new();
        let mut bytes = vec![0u8; length];
        rng.fill(&mut bytes)
            .map_err(|_| AuthError::Internal("Failed to generate random bytes".to_string()))?;

        let value = if urlsafe {
            URL_SAFE_NO_PAD.encode(&bytes)
        } else {
            String::from_utf8(bytes).map_err(|_| {
                AuthError::Internal(
                    "random bytes are not valid UTF-8; use urlsafe for text-safe tokens"
                        .to_string(),
                )
            })?
        };

        self.set(&value)
    }

    /// Delete the entry from the store
    ///
    /// Fails with `PermanentSecret` unless this Token is temporary.
    pub fn clear(&self) -> AuthResult<()> {
        self.check_temp()?;
        self.keychain.delete(&self.service, &self.user)?;
        debug!("Token: cleared {}:{}", self.service, self.user);
        Ok(())
    }

    fn check_temp(&self) -> AuthResult<()> {
        if self.temp {
            Ok(())
        } else {
            Err(AuthError::PermanentSecret {
                service: self.service.clone(),
                user: self.user.clone(),
            })
        }
    }
}

// The secret value itself must never appear in debug or display output.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("service", &self.service)
            .field("user", &self.user)
            .field("temp", &self.temp)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token('{}', '{}')", self.service, self.user)
    }
}
