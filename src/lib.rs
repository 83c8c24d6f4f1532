//! # ephemeral-server
//!
//! > Disposable HTTP and HTTPS servers for integration tests, based on [Tokio](https://tokio.rs/)
//! > and [hyper](https://hyper.rs/).
//!
//! Every call to [`build`] binds a fresh server to a random free port, wires
//! the given request handler and resolves once the server is listening.
//!
//! ## Features
//! * Plain HTTP or HTTPS with a fixed, pre-loaded test certificate
//! * HTTP/1 and HTTP/2
//! * Graceful stop with a bounded drain timeout
//! * Server-level errors are reported through the handle instead of aborting the process
//!
//! ## Example
//! ```no_run
//! use ephemeral_server::{build, client, HttpRequest, ServerOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (info, server) = build(
//!         |_req: HttpRequest| async { "ok" },
//!         ServerOptions::default().secure()
//!     ).await?;
//!
//!     let body = client::insecure()?
//!         .get(info.url("/"))
//!         .send()
//!         .await?
//!         .text()
//!         .await?;
//!     assert_eq!(body, "ok");
//!
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```

mod builder;
mod connection;
mod handle;
mod handler;
mod options;
mod server;

pub mod error;
pub mod http;
pub mod tls;
#[cfg(feature = "client")]
pub mod client;

pub use crate::builder::{build, ServerBuilder, FIXTURES_ENV};
pub use crate::connection::ConnectionInfo;
pub use crate::handle::ServerHandle;
pub use crate::handler::RequestHandler;
pub use crate::options::{ServerOptions, DEFAULT_SHUTDOWN_TIMEOUT};
pub use crate::server::ShutdownOutcome;
pub use crate::error::{Error, ErrorKind};
pub use crate::tls::TlsMaterial;
pub use crate::http::{
    HttpBody,
    HttpRequest,
    HttpResponse,
    IntoResponse
};
