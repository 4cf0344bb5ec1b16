//! Security configuration for cluster connections
//!
//! This module handles:
//! * TLS security configuration (trust store, system roots, or an
//!   explicitly insecure accept-any mode)
//! * Trust/key store provisioning from the environment

mod store;
mod tls;

pub use store::KeyStoreConfig;
pub use tls::{SecurityConfig, SecurityConfigBuilder, TrustMode};
