//! HTTP clients for talking to test servers
//!
//! Secure test servers present a self-signed certificate, which any client
//! with default settings rejects. The helpers here relax certificate
//! verification for the clients they build only, rather than for the
//! whole process.

use crate::{connection::ConnectionInfo, error::Error};
use reqwest::{Certificate, Client, ClientBuilder};

/// Creates a client builder with certificate verification disabled
///
/// System proxies are ignored, test servers are always reached directly.
#[inline]
pub fn builder() -> ClientBuilder {
    Client::builder()
        .no_proxy()
        .danger_accept_invalid_certs(true)
}

/// Creates a client with certificate verification disabled
pub fn insecure() -> Result<Client, Error> {
    builder()
        .build()
        .map_err(Error::client)
}

/// Wraps the certificate a server was started with,
/// e.g. to pass it to [`ClientBuilder::add_root_certificate`]
pub fn certificate(info: &ConnectionInfo) -> Result<Certificate, Error> {
    Certificate::from_pem(info.cert.as_bytes()).map_err(Error::client)
}
