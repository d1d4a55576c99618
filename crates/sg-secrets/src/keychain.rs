//! OS secret store access behind a trait
//!
//! `SystemKeychain` talks to the platform keyring; `MockKeychain` keeps
//! everything in memory so flows can be tested without touching the real
//! store.

use sg_types::{AuthError, AuthResult};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, trace};

/// Trait for secret store operations
pub trait KeychainStorage: Send + Sync {
    /// Store a secret under a service/account pair, overwriting any prior value
    fn store(&self, service: &str, account: &str, secret: &str) -> AuthResult<()>;

    /// Retrieve a secret; `Ok(None)` when no entry exists
    fn get(&self, service: &str, account: &str) -> AuthResult<Option<String>>;

    /// Delete a secret; deleting an absent entry is not an error
    fn delete(&self, service: &str, account: &str) -> AuthResult<()>;
}

/// Secret store backed by the platform keyring
pub struct SystemKeychain;

impl SystemKeychain {
    fn entry(service: &str, account: &str) -> AuthResult<keyring::Entry> {
        keyring::Entry::new(service, account)
            .map_err(|e| AuthError::Keychain(format!("Keyring unavailable: {}", e)))
    }
}

impl KeychainStorage for SystemKeychain {
    fn store(&self, service: &str, account: &str, secret: &str) -> AuthResult<()> {
        trace!("Writing {}:{} to the OS secret store", service, account);
        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| AuthError::Keychain(format!("Secret write failed: {}", e)))?;

        debug!("Wrote {}:{} to the OS secret store", service, account);
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> AuthResult<Option<String>> {
        trace!("Reading {}:{} from the OS secret store", service, account);
        match Self::entry(service, account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                trace!("OS secret store has no {}:{}", service, account);
                Ok(None)
            }
            Err(e) => Err(AuthError::Keychain(format!("Secret read failed: {}", e))),
        }
    }

    fn delete(&self, service: &str, account: &str) -> AuthResult<()> {
        trace!("Removing {}:{} from the OS secret store", service, account);
        match Self::entry(service, account)?.delete_credential() {
            // Already-absent entries count as deleted.
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!("Removed {}:{} from the OS secret store", service, account);
                Ok(())
            }
            Err(e) => Err(AuthError::Keychain(format!("Secret delete failed: {}", e))),
        }
    }
}

/// In-memory stand-in for the OS secret store, for tests
///
/// Entries are keyed by "service:account", so cloned handles share one map.
#[derive(Clone, Default)]
pub struct MockKeychain {
    storage: std::sync::Arc<Mutex<HashMap<String, String>>>,
}

impl MockKeychain {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(service: &str, account: &str) -> String {
        format!("{}:{}", service, account)
    }
}

impl KeychainStorage for MockKeychain {
    fn store(&self, service: &str, account: &str, secret: &str) -> AuthResult<()> {
        let key = Self::make_key(service, account);
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| AuthError::Internal(format!("Mock keychain lock poisoned: {}", e)))?;
        storage.insert(key, secret.to_string());
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> AuthResult<Option<String>> {
        let key = Self::make_key(service, account);
        let storage = self
            .storage
            .lock()
            .map_err(|e| AuthError::Internal(format!("Mock keychain lock poisoned: {}", e)))?;
        Ok(storage.get(&key).cloned())
    }

    fn delete(&self, service: &str, account: &str) -> AuthResult<()> {
        let key = Self::make_key(service, account);
        let mut storage = self
            .storage
            .lock()
            .map_err(|e| AuthError::Internal(format!("Mock keychain lock poisoned: {}", e)))?;
        storage.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_secret_survives_until_deleted() {
        let keychain = MockKeychain::new();

        keychain.store("service", "account", "secret").unwrap();
        assert_eq!(
            keychain.get("service", "account").unwrap().as_deref(),
            Some("secret")
        );

        keychain.delete("service", "account").unwrap();
        assert!(keychain.get("service", "account").unwrap().is_none());
    }

    #[test]
    fn test_store_replaces_prior_value() {
        let keychain = MockKeychain::new();

        keychain.store("service", "account", "old").unwrap();
        keychain.store("service", "account", "new").unwrap();

        let value = keychain.get("service", "account").unwrap().unwrap();
        assert_eq!(value, "new");
    }

    #[test]
    fn test_get_absent_entry_is_none_not_error() {
        let keychain = MockKeychain::new();
        assert!(keychain.get("service", "account").unwrap().is_none());
    }

    #[test]
    fn test_delete_absent_entry_is_no_op() {
        let keychain = MockKeychain::new();
        keychain.delete("service", "account").unwrap();
    }

    #[test]
    fn test_entries_keyed_by_service() {
        let keychain = MockKeychain::new();

        keychain.store("service1", "account", "value1").unwrap();
        keychain.store("service2", "account", "value2").unwrap();

        assert_eq!(
            keychain.get("service1", "account").unwrap().unwrap(),
            "value1"
        );
        assert_eq!(
            keychain.get("service2", "account").unwrap().unwrap(),
            "value2"
        );
    }
}
