//! Types and utilities for reaching a running server.

use crate::tls::TlsMaterial;
use std::net::{IpAddr, SocketAddr};

/// Describes how to reach a server that has just started listening
///
/// `key` and `cert` echo the TLS material of the [`crate::ServerBuilder`]
/// that started the server. They are always present, but only meaningful
/// when the server is secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// PEM-encoded private key
    pub key: String,

    /// PEM-encoded certificate
    pub cert: String,

    /// Ephemeral port assigned by the OS
    pub port: u16,

    /// Interface the server is bound to
    pub host: IpAddr,

    /// Whether the server speaks HTTPS
    pub secure: bool,
}

impl ConnectionInfo {
    #[inline]
    pub(crate) fn new(material: &TlsMaterial, addr: SocketAddr, secure: bool) -> Self {
        Self {
            key: material.key().to_owned(),
            cert: material.cert().to_owned(),
            port: addr.port(),
            host: addr.ip(),
            secure,
        }
    }

    /// Returns the socket address the server listens on
    #[inline]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns `http` or `https`
    #[inline]
    pub fn scheme(&self) -> &'static str {
        scheme(self.secure)
    }

    /// Constructs an absolute URL for the given path.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let url = info.url("/users");
    /// ```
    #[inline]
    pub fn url(&self, path: &str) -> String {
        url(self.secure, self.addr(), path)
    }
}

#[inline]
pub(crate) fn scheme(secure: bool) -> &'static str {
    if secure { "https" } else { "http" }
}

#[inline]
pub(crate) fn url(secure: bool, addr: SocketAddr, path: &str) -> String {
    format!("{}://{addr}{path}", scheme(secure))
}
