//! Handle to a running server

use crate::{
    connection,
    error::{Error, ErrorKind},
    server::ShutdownOutcome
};

use std::{
    fmt::{Debug, Formatter},
    net::SocketAddr
};

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle
};

/// A running server instance
///
/// The handle exclusively owns the listening socket. The server keeps
/// serving requests until:
/// - [`stop`](Self::stop) is called explicitly, or
/// - the handle is dropped, or
/// - the listener fails (see [`error`](Self::error)).
///
/// Calling [`stop`](Self::stop) is recommended for deterministic test behavior,
/// since dropping only signals the server and does not wait for it.
///
/// # Example
///
/// ```no_run
/// use ephemeral_server::{build, HttpRequest, ServerOptions};
///
/// #[tokio::test]
/// async fn ping() {
///     let (info, server) = build(|_req: HttpRequest| async { "pong" }, ServerOptions::default())
///         .await
///         .unwrap();
///
///     let body = reqwest::get(info.url("/"))
///         .await
///         .unwrap()
///         .text()
///         .await
///         .unwrap();
///
///     assert_eq!(body, "pong");
///
///     server.stop().await.unwrap();
/// }
/// ```
pub struct ServerHandle {
    id: usize,
    local_addr: SocketAddr,
    secure: bool,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<ShutdownOutcome>>,
    errors: watch::Receiver<Option<Error>>,
}

impl Debug for ServerHandle {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("id", &self.id)
            .field("local_addr", &self.local_addr)
            .field("secure", &self.secure)
            .finish()
    }
}

impl ServerHandle {
    #[inline]
    pub(crate) fn new(
        id: usize,
        local_addr: SocketAddr,
        secure: bool,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<ShutdownOutcome>,
        errors: watch::Receiver<Option<Error>>
    ) -> Self {
        Self {
            id,
            local_addr,
            secure,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            errors,
        }
    }

    /// Returns the instance id used to tell servers apart in logs
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the socket address the server listens on
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the ephemeral port the server listens on
    #[inline]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns `true` if the server speaks HTTPS
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Constructs an absolute URL for the given path.
    #[inline]
    pub fn url(&self, path: &str) -> String {
        connection::url(self.secure, self.local_addr, path)
    }

    /// Returns `true` while the server accepts connections or drains them
    #[inline]
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Returns the server-level error, if one has happened
    ///
    /// A server-level error stops the server from accepting new connections.
    /// Tests are expected to check it and abort.
    #[inline]
    pub fn error(&self) -> Option<Error> {
        self.errors.borrow().clone()
    }

    /// Waits for a server-level error.
    ///
    /// Stays pending while the server is healthy, so it is usually
    /// raced against the test body or wrapped in a timeout.
    pub async fn failed(&mut self) -> Option<Error> {
        self.errors
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|err| err.clone())
    }

    /// Gracefully stops the server.
    ///
    /// The server stops accepting new connections right away and lets
    /// in-flight ones complete. Connections still open once the shutdown
    /// timeout elapses are closed forcibly.
    pub async fn stop(mut self) -> Result<ShutdownOutcome, Error> {
        self.signal();

        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|err| Error::new(ErrorKind::Io, err)),
            None => Ok(ShutdownOutcome::Graceful)
        }
    }

    #[inline]
    fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.signal();
    }
}
