//! Server options

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration
};

/// Default time a graceful stop waits for in-flight connections
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Represents the options a single server instance is started with
///
/// The server always binds to port `0`, so the OS picks a free ephemeral port.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use ephemeral_server::ServerOptions;
///
/// let options = ServerOptions::default()
///     .secure()
///     .with_shutdown_timeout(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub(crate) secure: bool,
    pub(crate) host: IpAddr,
    pub(crate) shutdown_timeout: Duration,
    pub(crate) no_delay: bool,
    pub(crate) exit_on_error: bool,
}

impl Default for ServerOptions {
    #[inline]
    fn default() -> Self {
        Self {
            secure: false,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            no_delay: true,
            exit_on_error: false,
        }
    }
}

impl ServerOptions {
    /// Creates default options: plain HTTP on `127.0.0.1`
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the server to use HTTPS
    ///
    /// Default: `false`
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Configures whether to use HTTPS
    ///
    /// Default: `false`
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Configures the interface the server binds to
    ///
    /// Default: `127.0.0.1`
    pub fn with_host(mut self, host: impl Into<IpAddr>) -> Self {
        self.host = host.into();
        self
    }

    /// Configures how long a graceful stop waits for in-flight connections
    /// before closing them forcibly.
    ///
    /// Default: 10 seconds
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Configures whether to set `TCP_NODELAY` on accepted connections
    ///
    /// Default: `true`
    pub fn with_no_delay(mut self, no_delay: bool) -> Self {
        self.no_delay = no_delay;
        self
    }

    /// Terminates the whole process with exit code `1` on a server-level error
    /// instead of only recording it on the [`crate::ServerHandle`].
    ///
    /// Default: `false`
    pub fn with_exit_on_error(mut self) -> Self {
        self.exit_on_error = true;
        self
    }

    /// Returns `true` if the server is configured to use HTTPS
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns the interface the server binds to
    #[inline]
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Returns the graceful stop timeout
    #[inline]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}
