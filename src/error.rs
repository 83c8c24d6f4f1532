//! Error Handling tools

use std::{
    fmt,
    io::Error as IoError,
    error::Error as StdError,
    sync::Arc
};

pub(crate) type BoxError = Box<
    dyn StdError
    + Send
    + Sync
>;

/// Describes what part of the server lifecycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The listener could not be bound to an ephemeral port
    Bind,

    /// The TLS material is missing or malformed
    Tls,

    /// The listener failed while accepting connections
    Accept,

    /// An HTTP client could not be constructed
    Client,

    /// Any other I/O failure
    Io,
}

/// Generic error
///
/// Cheap to clone, so the same server-level error can be observed
/// both from the logs and from every [`crate::ServerHandle::error`] call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    inner: Arc<BoxError>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Bind => write!(f, "bind error: {}", self.inner),
            ErrorKind::Tls => write!(f, "TLS config error: {}", self.inner),
            ErrorKind::Accept => write!(f, "accept error: {}", self.inner),
            ErrorKind::Client => write!(f, "client error: {}", self.inner),
            ErrorKind::Io => write!(f, "{}", self.inner),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&**self.inner)
    }
}

impl From<IoError> for Error {
    #[inline]
    fn from(err: IoError) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<Error> for IoError {
    #[inline]
    fn from(err: Error) -> Self {
        Self::other(err)
    }
}

impl From<tokio_rustls::rustls::Error> for Error {
    #[inline]
    fn from(err: tokio_rustls::rustls::Error) -> Self {
        Self::tls(err)
    }
}

impl From<tokio_rustls::rustls::pki_types::pem::Error> for Error {
    #[inline]
    fn from(err: tokio_rustls::rustls::pki_types::pem::Error) -> Self {
        Self::tls(err)
    }
}

impl From<rcgen::Error> for Error {
    #[inline]
    fn from(err: rcgen::Error) -> Self {
        Self::tls(err)
    }
}

impl Error {
    /// Creates a new [`Error`] of a given kind
    #[inline]
    pub fn new(kind: ErrorKind, err: impl Into<BoxError>) -> Self {
        Self { kind, inner: Arc::new(err.into()) }
    }

    /// Returns the kind of this error
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub(crate) fn bind(err: IoError) -> Self {
        Self::new(ErrorKind::Bind, err)
    }

    #[inline]
    pub(crate) fn accept(err: IoError) -> Self {
        Self::new(ErrorKind::Accept, err)
    }

    #[inline]
    pub(crate) fn tls(err: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Tls, err)
    }

    #[cfg(feature = "client")]
    #[inline]
    pub(crate) fn client(err: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Client, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn it_converts_io_error() {
        let err: Error = IoError::new(IoErrorKind::NotFound, "missing").into();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "missing");
    }

    #[test]
    fn it_prefixes_bind_errors() {
        let err = Error::bind(IoError::new(IoErrorKind::AddrInUse, "address in use"));

        assert_eq!(err.kind(), ErrorKind::Bind);
        assert_eq!(err.to_string(), "bind error: address in use");
    }

    #[test]
    fn it_prefixes_tls_errors() {
        let err = Error::tls("no private key found");

        assert_eq!(err.kind(), ErrorKind::Tls);
        assert_eq!(err.to_string(), "TLS config error: no private key found");
    }

    #[test]
    fn it_keeps_source_when_cloned() {
        let err = Error::accept(IoError::other("too many open files"));
        let clone = err.clone();

        assert_eq!(clone.kind(), ErrorKind::Accept);
        assert_eq!(clone.source().unwrap().to_string(), "too many open files");
    }

    #[test]
    fn it_converts_into_io_error() {
        let err = Error::tls("bad pem");
        let io_err: IoError = err.into();

        assert_eq!(io_err.kind(), IoErrorKind::Other);
        assert_eq!(io_err.to_string(), "TLS config error: bad pem");
    }
}
