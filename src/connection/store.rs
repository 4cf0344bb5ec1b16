//! Trust store and key store provisioning.
//!
//! Store locations and passwords are an external configuration concern:
//! they come from the environment rather than the connection URI. Stores
//! are PEM files (certificates for the trust store, certificate plus
//! private key for the key store).

use crate::{Error, Result};
use std::env;
use std::fmt;

/// Environment variable naming the trust store PEM file.
pub const TRUST_STORE_PATH_VAR: &str = "COUCHLINK_TRUST_STORE_PATH";
/// Environment variable holding the trust store password, if any.
pub const TRUST_STORE_PASSWORD_VAR: &str = "COUCHLINK_TRUST_STORE_PASSWORD";
/// Environment variable naming the client key store PEM file.
pub const KEY_STORE_PATH_VAR: &str = "COUCHLINK_KEY_STORE_PATH";
/// Environment variable holding the key store password, if any.
pub const KEY_STORE_PASSWORD_VAR: &str = "COUCHLINK_KEY_STORE_PASSWORD";

/// Location and credentials of a certificate store.
#[derive(Clone)]
pub struct KeyStoreConfig {
    path: String,
    password: Option<String>,
}

impl KeyStoreConfig {
    /// Create a store config from an explicit path and optional password.
    pub fn new(path: impl Into<String>, password: Option<String>) -> Self {
        Self {
            path: path.into(),
            password,
        }
    }

    /// Trust store configuration from `COUCHLINK_TRUST_STORE_*`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the path variable is not set.
    pub fn trust_store_from_env() -> Result<Self> {
        Self::from_env(TRUST_STORE_PATH_VAR, TRUST_STORE_PASSWORD_VAR)
    }

    /// Key store configuration from `COUCHLINK_KEY_STORE_*`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the path variable is not set.
    pub fn key_store_from_env() -> Result<Self> {
        Self::from_env(KEY_STORE_PATH_VAR, KEY_STORE_PASSWORD_VAR)
    }

    fn from_env(path_var: &str, password_var: &str) -> Result<Self> {
        let path = env::var(path_var)
            .map_err(|_| Error::Config(format!("{path_var} is not set")))?;
        let password = env::var(password_var).ok();
        Ok(Self { path, password })
    }

    /// Path to the store file.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Store password, if one is configured.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for KeyStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStoreConfig")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_path_and_password() {
        let store = KeyStoreConfig::new("/etc/couchbase/trust.pem", Some("secret".into()));
        assert_eq!(store.path(), "/etc/couchbase/trust.pem");
        assert_eq!(store.password(), Some("secret"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let store = KeyStoreConfig::new("/tmp/store.pem", Some("secret".into()));
        let debug = format!("{store:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }
}
