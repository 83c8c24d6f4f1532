//! Building and starting ephemeral servers

use crate::{
    connection::ConnectionInfo,
    error::Error,
    handle::ServerHandle,
    handler::{Dispatch, RequestHandler},
    options::ServerOptions,
    server::{self, Server},
    tls::TlsMaterial
};

use std::{
    fmt::{Debug, Formatter},
    net::SocketAddr,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        OnceLock
    }
};

use tokio::{
    net::TcpListener,
    sync::{oneshot, watch}
};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// Environment variable with a fixtures folder for the [shared](ServerBuilder::shared) builder
///
/// When set, the folder must contain `https.key` and `https.cert`.
/// Otherwise a self-signed pair is generated.
pub const FIXTURES_ENV: &str = "EPHEMERAL_SERVER_FIXTURES";

static SHARED: OnceLock<Result<ServerBuilder, Error>> = OnceLock::new();

/// Starts ephemeral servers
///
/// A builder is the test harness state: it owns the TLS material every
/// secure server is started with and the counter that numbers server
/// instances in logs. The material is loaded once, when the builder
/// is created, and never per server.
///
/// # Example
/// ```no_run
/// use ephemeral_server::{HttpRequest, ServerBuilder, ServerOptions};
///
/// # async fn dox() -> Result<(), ephemeral_server::error::Error> {
/// let builder = ServerBuilder::new()?;
///
/// let (info, server) = builder
///     .build(|_req: HttpRequest| async { "ok" }, ServerOptions::default().secure())
///     .await?;
///
/// println!("listening on {}", info.url("/"));
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct ServerBuilder {
    counter: AtomicUsize,
    material: TlsMaterial,
}

impl Debug for ServerBuilder {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("instances", &self.instances())
            .finish()
    }
}

impl ServerBuilder {
    /// Creates a builder with a freshly generated self-signed pair
    /// for `localhost` and `127.0.0.1`
    pub fn new() -> Result<Self, Error> {
        TlsMaterial::self_signed().map(Self::with_tls_material)
    }

    /// Creates a builder that reads `https.key` and `https.cert` from a fixtures folder
    pub fn from_fixtures(dir: impl AsRef<Path>) -> Result<Self, Error> {
        TlsMaterial::from_fixtures(dir).map(Self::with_tls_material)
    }

    /// Creates a builder with the given TLS material
    pub fn with_tls_material(material: TlsMaterial) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            material
        }
    }

    /// Returns the process-wide builder used by [`build`]
    ///
    /// It is created on first use from [`FIXTURES_ENV`] if set,
    /// or with a generated self-signed pair otherwise.
    pub fn shared() -> Result<&'static Self, Error> {
        SHARED
            .get_or_init(|| match std::env::var_os(FIXTURES_ENV) {
                Some(dir) => Self::from_fixtures(dir),
                None => Self::new()
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the TLS material secure servers are started with
    #[inline]
    pub fn tls_material(&self) -> &TlsMaterial {
        &self.material
    }

    /// Returns how many servers this builder has started so far
    #[inline]
    pub fn instances(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    /// Starts a server on a random free port and waits until it listens.
    ///
    /// The `handler` is invoked once per incoming request. Returns the
    /// connection info and a handle that stops the server.
    ///
    /// # Errors
    /// Fails if the listener cannot be bound or, for a secure server,
    /// if the TLS material is malformed.
    pub async fn build<H: RequestHandler>(
        &self,
        handler: H,
        options: ServerOptions
    ) -> Result<(ConnectionInfo, ServerHandle), Error> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "tracing")]
        tracing::debug!(server = id, secure = options.secure, "booting server");

        let result = self.start(id, handler, &options).await;
        if let Err(err) = &result {
            server::fail(id, err, options.exit_on_error);
        }
        result
    }

    async fn start<H: RequestHandler>(
        &self,
        id: usize,
        handler: H,
        options: &ServerOptions
    ) -> Result<(ConnectionInfo, ServerHandle), Error> {
        let acceptor = if options.secure {
            Some(self.material.acceptor()?)
        } else {
            None
        };

        let listener = TcpListener::bind(SocketAddr::new(options.host, 0))
            .await
            .map_err(Error::bind)?;
        let local_addr = listener
            .local_addr()
            .map_err(Error::bind)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (errors_tx, errors_rx) = watch::channel(None);

        let server = Server::new(id, listener, Dispatch::new(handler), acceptor, options);

        #[cfg(feature = "tracing")]
        let task = tokio::spawn(server
            .run(shutdown_rx, errors_tx)
            .instrument(tracing::debug_span!("server", id)));
        #[cfg(not(feature = "tracing"))]
        let task = tokio::spawn(server.run(shutdown_rx, errors_tx));

        #[cfg(feature = "tracing")]
        tracing::debug!(server = id, port = local_addr.port(), "server booted");

        let info = ConnectionInfo::new(&self.material, local_addr, options.secure);
        let handle = ServerHandle::new(id, local_addr, options.secure, shutdown_tx, task, errors_rx);
        Ok((info, handle))
    }
}

/// Starts a server on a random free port using the [shared](ServerBuilder::shared) builder
///
/// # Example
/// ```no_run
/// use ephemeral_server::{build, HttpRequest, ServerOptions};
///
/// # async fn dox() -> Result<(), ephemeral_server::error::Error> {
/// let (info, server) = build(|_req: HttpRequest| async { "ok" }, ServerOptions::default()).await?;
///
/// assert!(info.port > 0);
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub async fn build<H: RequestHandler>(
    handler: H,
    options: ServerOptions
) -> Result<(ConnectionInfo, ServerHandle), Error> {
    ServerBuilder::shared()?
        .build(handler, options)
        .await
}
