//! Error types

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by connection string parsing and cluster bootstrap.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The URI does not start with the required `jdbc:couchbase:` prefix.
    #[error("malformed URI: {0}")]
    MalformedUri(String),

    /// A plaintext connection was requested without a username or password.
    #[error("credentials missing: {0}")]
    CredentialsMissing(String),

    /// Invalid or missing configuration (trust store, key store, TLS setup).
    #[error("configuration error: {0}")]
    Config(String),

    /// Opaque failure reported by the cluster connector. Propagated
    /// unchanged; this crate performs no retry or recovery of its own.
    #[error("connection failed: {0}")]
    Connection(String),
}
