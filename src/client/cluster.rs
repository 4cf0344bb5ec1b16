//! Cluster session bootstrap
//!
//! Turns a parsed [`ClientUri`] into the inputs a cluster client needs —
//! scheme-prefixed connection string, authenticator, security config —
//! and delegates the single connection attempt to a [`ClusterConnector`].
//! Retries, topology discovery, and pooling are the connector's business.

use super::connection_string::ClientUri;
use crate::connection::{KeyStoreConfig, SecurityConfig};
use crate::metrics::{counters, labels};
use crate::{Error, Result};
use std::fmt;
use std::future::Future;

/// Credentials handed to the cluster connector.
#[derive(Clone)]
pub enum Authenticator {
    /// Username/password credentials, used for plaintext connections.
    Password { username: String, password: String },
    /// Client certificate sourced from a key store, used with TLS.
    Certificate { key_store: KeyStoreConfig },
}

impl Authenticator {
    /// Password-based authenticator.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Certificate-based authenticator backed by a key store.
    pub fn certificate(key_store: KeyStoreConfig) -> Self {
        Self::Certificate { key_store }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Certificate { key_store } => f
                .debug_struct("Certificate")
                .field("key_store", key_store)
                .finish(),
        }
    }
}

/// The external cluster client boundary.
///
/// Implementations own the wire protocol, retries, topology discovery,
/// and pooling. This crate calls [`ClusterConnector::connect`] exactly
/// once per bootstrap and propagates the outcome unchanged.
pub trait ClusterConnector {
    /// Connected session handle returned on success.
    type Session;

    /// Establish a session against `connection_string`
    /// (`couchbase://...` or `couchbases://...`).
    fn connect(
        &self,
        connection_string: &str,
        authenticator: Authenticator,
        security: SecurityConfig,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Bootstrap a cluster session from a parsed URI.
///
/// TLS enabled: builds a TLS [`SecurityConfig`] — trust store from the
/// environment when the certificate is verified, accept-any otherwise —
/// and a certificate authenticator from the environment-sourced key store.
///
/// TLS disabled: requires a non-empty username and a present password,
/// failing with [`Error::CredentialsMissing`] before any connector call,
/// and builds a password authenticator.
///
/// # Errors
///
/// [`Error::CredentialsMissing`], [`Error::Config`] for store/TLS setup
/// problems, or whatever the connector reports.
pub async fn connect_cluster<C: ClusterConnector>(
    uri: &ClientUri,
    connector: &C,
) -> Result<C::Session> {
    let connection_string = uri.connection_string_with_scheme();
    let mode = if uri.ssl_enabled() {
        labels::MODE_TLS
    } else {
        labels::MODE_PLAIN
    };

    let (security, authenticator) = if uri.ssl_enabled() {
        let mut builder = SecurityConfig::builder();
        if uri.verify_server_cert() {
            builder = builder.trust_store(KeyStoreConfig::trust_store_from_env()?);
        } else {
            tracing::warn!("server certificate verification disabled, accepting any certificate");
            builder = builder.danger_accept_any_certificate(true);
        }
        let key_store = KeyStoreConfig::key_store_from_env()?;
        (builder.build()?, Authenticator::certificate(key_store))
    } else {
        let username = uri.username().filter(|name| !name.is_empty());
        let (Some(username), Some(password)) = (username, uri.password()) else {
            return Err(Error::CredentialsMissing(
                "username or password is not provided".to_string(),
            ));
        };
        (
            SecurityConfig::disabled(),
            Authenticator::password(username, password),
        )
    };

    counters::connect_attempted(mode);
    tracing::debug!(
        connection_string = %connection_string,
        tls = uri.ssl_enabled(),
        "connecting to cluster"
    );

    match connector
        .connect(&connection_string, authenticator, security)
        .await
    {
        Ok(session) => {
            counters::connect_succeeded(mode);
            tracing::info!("cluster session established");
            Ok(session)
        }
        Err(e) => {
            counters::connect_failed(mode);
            Err(e)
        }
    }
}

impl ClientUri {
    /// Bootstrap a cluster session through `connector`.
    ///
    /// Convenience wrapper around [`connect_cluster`].
    pub async fn connect<C: ClusterConnector>(&self, connector: &C) -> Result<C::Session> {
        connect_cluster(self, connector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingConnector {
        calls: Mutex<Vec<(String, Authenticator, SecurityConfig)>>,
    }

    impl RecordingConnector {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Authenticator, SecurityConfig)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ClusterConnector for RecordingConnector {
        type Session = u32;

        async fn connect(
            &self,
            connection_string: &str,
            authenticator: Authenticator,
            security: SecurityConfig,
        ) -> Result<u32> {
            self.calls.lock().unwrap().push((
                connection_string.to_string(),
                authenticator,
                security,
            ));
            Ok(7)
        }
    }

    struct FailingConnector;

    impl ClusterConnector for FailingConnector {
        type Session = ();

        async fn connect(
            &self,
            _connection_string: &str,
            _authenticator: Authenticator,
            _security: SecurityConfig,
        ) -> Result<()> {
            Err(Error::Connection("cluster unreachable".to_string()))
        }
    }

    #[test]
    fn test_plaintext_bootstrap_passes_password_authenticator() {
        let uri =
            ClientUri::parse("jdbc:couchbase:host?username=u&password=p&foo=bar", None).unwrap();
        let connector = RecordingConnector::new();

        let session = tokio_test::block_on(uri.connect(&connector)).unwrap();
        assert_eq!(session, 7);

        let calls = connector.calls();
        assert_eq!(calls.len(), 1);
        let (connection_string, authenticator, security) = &calls[0];
        assert_eq!(connection_string, "couchbase://host?foo=bar");
        assert!(!security.tls_enabled());
        match authenticator {
            Authenticator::Password { username, password } => {
                assert_eq!(username, "u");
                assert_eq!(password, "p");
            }
            other => panic!("expected password authenticator, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_username_fails_before_connect() {
        let uri = ClientUri::parse("jdbc:couchbase:host?password=p", None).unwrap();
        let connector = RecordingConnector::new();

        let result = tokio_test::block_on(uri.connect(&connector));
        assert!(matches!(result, Err(Error::CredentialsMissing(_))));
        assert!(connector.calls().is_empty());
    }

    #[test]
    fn test_empty_username_counts_as_missing() {
        let uri = ClientUri::parse("jdbc:couchbase:host?username=&password=p", None).unwrap();
        let connector = RecordingConnector::new();

        let result = tokio_test::block_on(uri.connect(&connector));
        assert!(matches!(result, Err(Error::CredentialsMissing(_))));
        assert!(connector.calls().is_empty());
    }

    #[test]
    fn test_missing_password_fails_before_connect() {
        let uri = ClientUri::parse("jdbc:couchbase:host?username=u", None).unwrap();
        let connector = RecordingConnector::new();

        let result = tokio_test::block_on(uri.connect(&connector));
        assert!(matches!(result, Err(Error::CredentialsMissing(_))));
        assert!(connector.calls().is_empty());
    }

    #[test]
    fn test_empty_password_is_accepted() {
        // Only absence is an error; an empty password is passed through.
        let uri = ClientUri::parse("jdbc:couchbase:host?username=u&password=", None).unwrap();
        let connector = RecordingConnector::new();

        tokio_test::block_on(uri.connect(&connector)).unwrap();
        assert_eq!(connector.calls().len(), 1);
    }

    #[test]
    fn test_connector_error_is_propagated_unchanged() {
        let uri = ClientUri::parse("jdbc:couchbase:host?username=u&password=p", None).unwrap();

        let result = tokio_test::block_on(uri.connect(&FailingConnector));
        match result {
            Err(Error::Connection(message)) => assert_eq!(message, "cluster unreachable"),
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[test]
    fn test_authenticator_debug_redacts_password() {
        let authenticator = Authenticator::password("u", "secret");
        let debug = format!("{authenticator:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }
}
