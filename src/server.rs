//! HTTP Server tools

use crate::{
    error::Error,
    handler::Dispatch,
    options::ServerOptions
};

use hyper::rt::{Read, Write};
use std::{future::Future, io, net::SocketAddr, time::Duration};

use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{
        conn::auto::Builder,
        graceful::{GracefulShutdown, Watcher}
    }
};

use tokio::{
    net::{TcpListener, TcpStream},
    sync::{oneshot, watch},
    task::JoinSet
};

use tokio_rustls::TlsAcceptor;

/// Describes how a server finished draining its connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight connection completed before the timeout
    Graceful,

    /// Remaining connections were closed forcibly after the timeout
    TimedOut,
}

impl ShutdownOutcome {
    /// Returns `true` if all connections were drained gracefully
    #[inline]
    pub fn is_graceful(&self) -> bool {
        matches!(self, Self::Graceful)
    }
}

/// A source of incoming TCP connections
pub(crate) trait Accept: Send + 'static {
    /// Waits for the next incoming connection
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    #[inline]
    async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

/// A bound listener together with everything needed to serve it
pub(crate) struct Server<L = TcpListener> {
    id: usize,
    listener: L,
    dispatch: Dispatch,
    acceptor: Option<TlsAcceptor>,
    shutdown_timeout: Duration,
    no_delay: bool,
    exit_on_error: bool,
}

impl<L: Accept> Server<L> {
    #[inline]
    pub(crate) fn new(
        id: usize,
        listener: L,
        dispatch: Dispatch,
        acceptor: Option<TlsAcceptor>,
        options: &ServerOptions
    ) -> Self {
        Self {
            id,
            listener,
            dispatch,
            acceptor,
            shutdown_timeout: options.shutdown_timeout,
            no_delay: options.no_delay,
            exit_on_error: options.exit_on_error,
        }
    }

    /// Accepts connections until a stop is requested or the listener fails,
    /// then drains the connections that are still open.
    pub(crate) async fn run(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
        errors: watch::Sender<Option<Error>>
    ) -> ShutdownOutcome {
        let graceful = GracefulShutdown::new();
        let (stopping_tx, stopping_rx) = watch::channel(false);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(server = self.id, "stop requested, not accepting new connections");
                    break;
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {},
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        if let Err(_err) = stream.set_nodelay(self.no_delay) {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(server = self.id, "failed to set TCP_NODELAY on incoming connection: {_err:#}");
                        }

                        connections.spawn(Self::handle_connection(
                            stream,
                            peer_addr,
                            self.acceptor.clone(),
                            self.dispatch.clone(),
                            graceful.watcher(),
                            stopping_rx.clone()));
                    },
                    Err(err) => {
                        let err = Error::accept(err);
                        fail(self.id, &err, self.exit_on_error);
                        errors.send_replace(Some(err));
                        break;
                    }
                }
            }
        }

        drop(self.listener);
        stopping_tx.send_replace(true);
        Self::drain(self.id, graceful, connections, self.shutdown_timeout).await
    }

    async fn drain(
        _id: usize,
        graceful: GracefulShutdown,
        mut connections: JoinSet<()>,
        timeout: Duration
    ) -> ShutdownOutcome {
        let outcome = tokio::select! {
            _ = graceful.shutdown() => ShutdownOutcome::Graceful,
            _ = tokio::time::sleep(timeout) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(server = _id, "timed out waiting for connections to close, closing forcibly");
                connections.abort_all();
                ShutdownOutcome::TimedOut
            }
        };

        while connections.join_next().await.is_some() {}

        #[cfg(feature = "tracing")]
        tracing::debug!(server = _id, ?outcome, "server stopped");
        outcome
    }

    #[inline]
    async fn handle_connection(
        stream: TcpStream,
        _peer_addr: SocketAddr,
        acceptor: Option<TlsAcceptor>,
        dispatch: Dispatch,
        watcher: Watcher,
        mut stopping: watch::Receiver<bool>
    ) {
        #[cfg(feature = "tracing")]
        tracing::trace!(peer = %_peer_addr, "connection accepted");

        let Some(acceptor) = acceptor else {
            return Self::serve(TokioIo::new(stream), dispatch, watcher).await;
        };

        // A handshake in progress is not watched by the graceful shutdown yet
        let handshake = tokio::select! {
            handshake = acceptor.accept(stream) => handshake,
            _ = Self::stopped(&mut stopping) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(peer = %_peer_addr, "server is stopping, dropping connection during tls handshake");
                return;
            }
        };

        match handshake {
            Ok(tls_stream) => Self::serve(TokioIo::new(tls_stream), dispatch, watcher).await,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(peer = %_peer_addr, "failed to perform tls handshake: {_err:#}");
            }
        }
    }

    #[inline]
    async fn stopped(stopping: &mut watch::Receiver<bool>) {
        let _ = stopping.wait_for(|stopping| *stopping).await;
    }

    #[inline]
    async fn serve<I>(io: I, dispatch: Dispatch, watcher: Watcher)
    where
        I: Read + Write + Unpin + Send + 'static
    {
        let connection_builder = Builder::new(TokioExecutor::new());
        let connection = connection_builder.serve_connection_with_upgrades(io, dispatch);
        let connection = watcher.watch(connection);

        if let Err(_err) = connection.await {
            #[cfg(feature = "tracing")]
            tracing::debug!("error serving connection: {_err:#}");
        }
    }
}

/// Applies the server-level error policy: always log, optionally exit
#[inline]
pub(crate) fn fail(_id: usize, _err: &Error, exit_on_error: bool) {
    #[cfg(feature = "tracing")]
    tracing::error!(server = _id, "http server error: {_err:#}");
    #[cfg(not(feature = "tracing"))]
    eprintln!("http server error: {_err:#}");

    if exit_on_error {
        std::process::exit(1);
    }
}
