//! couchlink — JDBC-style connection string parsing and cluster session
//! bootstrap for Couchbase.
//!
//! This crate adapts a JDBC-style URI of the form
//! `jdbc:couchbase:host1,host2?key=value&...` into the pieces a native
//! cluster client needs:
//!
//! * a normalized connection string with reserved keys stripped and the
//!   scheme (`couchbase://` or `couchbases://`) chosen by the TLS setting,
//! * an [`Authenticator`] (password-based for plaintext connections,
//!   certificate-based for TLS),
//! * a [`connection::SecurityConfig`] describing how server certificates
//!   are trusted.
//!
//! The actual network connection is delegated to a [`ClusterConnector`]
//! implementation. This crate performs no retries, topology discovery, or
//! query execution of its own.
//!
//! # Examples
//!
//! ```ignore
//! use couchlink::ClientUri;
//!
//! let uri = ClientUri::parse("jdbc:couchbase:host1,host2?foo=bar", None)?;
//! assert_eq!(uri.hosts(), "host1,host2");
//! assert_eq!(uri.connection_string(), "host1,host2?foo=bar");
//!
//! let session = uri.connect(&my_connector).await?;
//! ```

pub mod client;
pub mod connection;
mod error;
pub(crate) mod metrics;

pub use client::{connect_cluster, Authenticator, ClientUri, ClusterConnector};
pub use error::{Error, Result};
