//! Client-facing API
//!
//! This module handles:
//! * JDBC-style connection URI parsing
//! * Credential and TLS setting resolution
//! * Cluster session bootstrap through a [`ClusterConnector`]

mod cluster;
mod connection_string;

pub use cluster::{connect_cluster, Authenticator, ClusterConnector};
pub use connection_string::{ClientUri, PLAIN_SCHEME, SECURE_SCHEME, URI_PREFIX};
