//! TLS security configuration for cluster connections.
//!
//! When TLS is enabled the server certificate is checked against either a
//! PEM trust store, the system root certificates, or — as a deliberate,
//! explicit downgrade — not at all (accept-any mode for
//! `verifyservercertificate=false`).

use super::store::KeyStoreConfig;
use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pemfile::Item;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::fs;
use std::sync::Arc;

/// How the server certificate is trusted when TLS is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMode {
    /// Certificates are validated against system root certificates.
    SystemRoots,
    /// Certificates are validated against a PEM trust store.
    TrustStore,
    /// ⚠️ Any server certificate is accepted without validation.
    AcceptAny,
}

/// Security configuration handed to the cluster connector.
///
/// Carries the TLS on/off decision, the trust mode, and the compiled
/// rustls [`ClientConfig`] (present only when TLS is enabled). Built via
/// [`SecurityConfig::builder`] for the TLS path or
/// [`SecurityConfig::disabled`] for plaintext connections.
#[derive(Clone)]
pub struct SecurityConfig {
    tls_enabled: bool,
    trust: TrustMode,
    trust_store: Option<KeyStoreConfig>,
    client_config: Option<Arc<ClientConfig>>,
}

impl SecurityConfig {
    /// Create a new security configuration builder (TLS enabled).
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::default()
    }

    /// A configuration for plaintext connections: no TLS, no trust setup.
    pub fn disabled() -> Self {
        Self {
            tls_enabled: false,
            trust: TrustMode::SystemRoots,
            trust_store: None,
            client_config: None,
        }
    }

    /// Whether TLS is required for the connection.
    pub fn tls_enabled(&self) -> bool {
        self.tls_enabled
    }

    /// The trust mode in effect.
    pub fn trust_mode(&self) -> TrustMode {
        self.trust
    }

    /// Whether server certificates are actually validated.
    ///
    /// False for plaintext connections and for [`TrustMode::AcceptAny`].
    pub fn verifies_certificates(&self) -> bool {
        self.tls_enabled && self.trust != TrustMode::AcceptAny
    }

    /// The trust store backing [`TrustMode::TrustStore`], if any.
    pub fn trust_store(&self) -> Option<&KeyStoreConfig> {
        self.trust_store.as_ref()
    }

    /// The compiled rustls client configuration, `None` when TLS is off.
    pub fn client_config(&self) -> Option<Arc<ClientConfig>> {
        self.client_config.clone()
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("tls_enabled", &self.tls_enabled)
            .field("trust", &self.trust)
            .field("trust_store", &self.trust_store)
            .field(
                "client_config",
                &self.client_config.as_ref().map(|_| "<ClientConfig>"),
            )
            .finish()
    }
}

/// Builder for [`SecurityConfig`].
pub struct SecurityConfigBuilder {
    tls_enabled: bool,
    trust_store: Option<KeyStoreConfig>,
    accept_any_certificate: bool,
}

impl Default for SecurityConfigBuilder {
    fn default() -> Self {
        Self {
            tls_enabled: true,
            trust_store: None,
            accept_any_certificate: false,
        }
    }
}

impl SecurityConfigBuilder {
    /// Enable or disable TLS (default: enabled).
    pub fn enable_tls(mut self, enable: bool) -> Self {
        self.tls_enabled = enable;
        self
    }

    /// Validate server certificates against a PEM trust store instead of
    /// the system roots.
    pub fn trust_store(mut self, store: KeyStoreConfig) -> Self {
        self.trust_store = Some(store);
        self
    }

    /// ⚠️ **DANGER**: Accept any server certificate without validation.
    ///
    /// This makes the connection vulnerable to man-in-the-middle attacks.
    /// It exists to honor `verifyservercertificate=false` and should only
    /// be used against clusters with self-signed certificates in
    /// development environments.
    pub fn danger_accept_any_certificate(mut self, accept: bool) -> Self {
        self.accept_any_certificate = accept;
        self
    }

    /// Build the security configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the trust store cannot be read or
    /// contains no valid certificates, or when no system roots are found.
    pub fn build(self) -> Result<SecurityConfig> {
        if !self.tls_enabled {
            return Ok(SecurityConfig::disabled());
        }

        if self.accept_any_certificate {
            let client_config = ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
                .with_no_client_auth();
            return Ok(SecurityConfig {
                tls_enabled: true,
                trust: TrustMode::AcceptAny,
                trust_store: None,
                client_config: Some(Arc::new(client_config)),
            });
        }

        let (trust, root_store) = match &self.trust_store {
            Some(store) => (TrustMode::TrustStore, load_trust_store(store.path())?),
            None => (TrustMode::SystemRoots, load_system_roots()?),
        };

        let client_config = Arc::new(
            ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );

        Ok(SecurityConfig {
            tls_enabled: true,
            trust,
            trust_store: self.trust_store,
            client_config: Some(client_config),
        })
    }
}

/// Load system root certificates via rustls-native-certs.
fn load_system_roots() -> Result<RootCertStore> {
    let result = rustls_native_certs::load_native_certs();

    let mut store = RootCertStore::empty();
    for cert in result.certs {
        let _ = store.add_parsable_certificates(std::iter::once(cert));
    }

    if store.is_empty() {
        return Err(Error::Config(
            "failed to load any system root certificates".to_string(),
        ));
    }

    Ok(store)
}

/// Load trusted certificates from a PEM trust store file.
fn load_trust_store(path: &str) -> Result<RootCertStore> {
    let pem_data = fs::read(path)
        .map_err(|e| Error::Config(format!("failed to read trust store '{path}': {e}")))?;

    let mut reader = std::io::Cursor::new(&pem_data);
    let mut root_store = RootCertStore::empty();
    let mut found_certs = 0;

    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                let _ = root_store.add_parsable_certificates(std::iter::once(cert));
                found_certs += 1;
            }
            Ok(Some(_)) => {
                // Skip non-certificate items (private keys, etc.)
            }
            Ok(None) => break,
            Err(_) => {
                return Err(Error::Config(format!(
                    "failed to parse certificate from trust store '{path}'"
                )));
            }
        }
    }

    if found_certs == 0 {
        return Err(Error::Config(format!(
            "no valid certificates found in trust store '{path}'"
        )));
    }

    Ok(root_store)
}

/// Certificate verifier that accepts any server certificate.
///
/// Installed only for `verifyservercertificate=false`.
#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::aws_lc_rs::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = SecurityConfigBuilder::default();
        assert!(builder.tls_enabled);
        assert!(!builder.accept_any_certificate);
        assert!(builder.trust_store.is_none());
    }

    #[test]
    fn test_disabled_config() {
        let config = SecurityConfig::disabled();
        assert!(!config.tls_enabled());
        assert!(!config.verifies_certificates());
        assert!(config.client_config().is_none());
    }

    #[test]
    fn test_accept_any_is_insecure() {
        let config = SecurityConfig::builder()
            .danger_accept_any_certificate(true)
            .build()
            .expect("accept-any config should build without roots");

        assert!(config.tls_enabled());
        assert_eq!(config.trust_mode(), TrustMode::AcceptAny);
        assert!(!config.verifies_certificates());
        assert!(config.client_config().is_some());
    }

    #[test]
    fn test_missing_trust_store_file_fails() {
        let store = KeyStoreConfig::new("/nonexistent/trust.pem", None);
        let result = SecurityConfig::builder().trust_store(store).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_trust_store_without_certificates_fails() {
        let path = std::env::temp_dir().join("couchlink_empty_trust_store.pem");
        fs::write(&path, b"not a certificate\n").unwrap();

        let store = KeyStoreConfig::new(path.to_string_lossy().to_string(), None);
        let result = SecurityConfig::builder().trust_store(store).build();
        assert!(matches!(result, Err(Error::Config(_))));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_enable_tls_false_builds_disabled() {
        let config = SecurityConfig::builder().enable_tls(false).build().unwrap();
        assert!(!config.tls_enabled());
        assert!(config.client_config().is_none());
    }

    #[test]
    fn test_debug_omits_client_config_internals() {
        let config = SecurityConfig::builder()
            .danger_accept_any_certificate(true)
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("SecurityConfig"));
        assert!(debug.contains("AcceptAny"));
    }
}
