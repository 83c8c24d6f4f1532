//! TLS material for secure test servers

use crate::error::Error;
use rcgen::{generate_simple_self_signed, CertifiedKey};

use std::{
    fmt,
    fs,
    path::Path,
    sync::Arc
};

use tokio_rustls::{
    rustls::{
        crypto::ring,
        pki_types::{
            pem::PemObject,
            CertificateDer,
            PrivateKeyDer
        },
        ServerConfig,
    },
    TlsAcceptor
};

/// Name of the private key file inside a fixtures folder
pub const KEY_FILE_NAME: &str = "https.key";

/// Name of the certificate file inside a fixtures folder
pub const CERT_FILE_NAME: &str = "https.cert";

/// Default names a generated certificate is issued for
pub const DEFAULT_CERT_NAMES: &[&str] = &["localhost", "127.0.0.1"];

/// A PEM-encoded private key and certificate pair
///
/// The pair is loaded once and then reused by every secure server built
/// from the same [`crate::ServerBuilder`].
#[derive(Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    key: String,
    cert: String,
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("key", &"...")
            .field("cert", &self.cert)
            .finish()
    }
}

impl TlsMaterial {
    /// Creates a pair from PEM strings
    ///
    /// The content is validated lazily, when a secure server is built.
    pub fn from_pem(key: impl Into<String>, cert: impl Into<String>) -> Self {
        Self { key: key.into(), cert: cert.into() }
    }

    /// Reads a pair from two PEM files
    pub fn from_pem_files(key_path: impl AsRef<Path>, cert_path: impl AsRef<Path>) -> Result<Self, Error> {
        let key = fs::read_to_string(key_path).map_err(Error::tls)?;
        let cert = fs::read_to_string(cert_path).map_err(Error::tls)?;
        Ok(Self { key, cert })
    }

    /// Reads `https.key` and `https.cert` from a fixtures folder
    pub fn from_fixtures(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        Self::from_pem_files(dir.join(KEY_FILE_NAME), dir.join(CERT_FILE_NAME))
    }

    /// Generates a self-signed pair for the given names
    pub fn generate(names: impl Into<Vec<String>>) -> Result<Self, Error> {
        let names = names.into();
        if names.is_empty() {
            return Err(Error::tls("certificate names cannot be empty"));
        }

        let CertifiedKey { cert, signing_key } = generate_simple_self_signed(names)?;
        Ok(Self {
            key: signing_key.serialize_pem(),
            cert: cert.pem(),
        })
    }

    /// Generates a self-signed pair for `localhost` and `127.0.0.1`
    #[inline]
    pub fn self_signed() -> Result<Self, Error> {
        let names = DEFAULT_CERT_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        Self::generate(names)
    }

    /// Returns the PEM-encoded private key
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the PEM-encoded certificate chain
    #[inline]
    pub fn cert(&self) -> &str {
        &self.cert
    }

    /// Builds a rustls server config that offers HTTP/2 and HTTP/1.1 via ALPN
    pub(crate) fn server_config(&self) -> Result<ServerConfig, Error> {
        let certs = self.load_certs()?;
        let key = self.load_key()?;

        let mut config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(certs, key)?;

        config.alpn_protocols = vec![
            b"h2".into(),
            b"http/1.1".into(),
            b"http/1.0".into()
        ];

        Ok(config)
    }

    #[inline]
    pub(crate) fn acceptor(&self) -> Result<TlsAcceptor, Error> {
        self.server_config()
            .map(|config| TlsAcceptor::from(Arc::new(config)))
    }

    #[inline]
    fn load_certs(&self) -> Result<Vec<CertificateDer<'static>>, Error> {
        let certs = CertificateDer::pem_slice_iter(self.cert.as_bytes())
            .collect::<Result<Vec<_>, _>>()?;
        if certs.is_empty() {
            return Err(Error::tls("no certificate found"));
        }
        Ok(certs)
    }

    #[inline]
    fn load_key(&self) -> Result<PrivateKeyDer<'static>, Error> {
        PrivateKeyDer::from_pem_slice(self.key.as_bytes()).map_err(Error::from)
    }
}
