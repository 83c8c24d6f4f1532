//! Request handlers and their adaptation to hyper services

use crate::http::{HttpRequest, HttpResponse, IntoResponse};
use futures_util::future::BoxFuture;
use hyper::{body::Incoming, service::Service, Request};

use std::{
    convert::Infallible,
    future::Future,
    sync::Arc
};

/// A function that is invoked once per incoming request
///
/// Implemented for every `Fn(HttpRequest) -> impl Future` closure whose output
/// converts into a response, so plain async closures can be passed directly:
///
/// ```no_run
/// use ephemeral_server::{HttpRequest, RequestHandler};
///
/// fn assert_handler<H: RequestHandler>(_: H) {}
///
/// assert_handler(|_req: HttpRequest| async { "ok" });
/// ```
///
/// The handler owns response completion. Panics raised inside it are not
/// intercepted; they tear down the connection the request arrived on.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles a single request
    fn call(&self, request: HttpRequest) -> BoxFuture<'static, HttpResponse>;
}

impl<F, Fut, R> RequestHandler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse
{
    #[inline]
    fn call(&self, request: HttpRequest) -> BoxFuture<'static, HttpResponse> {
        let future = self(request);
        Box::pin(async move { future.await.into_response() })
    }
}

/// Dispatches requests of a single server instance to its handler
#[derive(Clone)]
pub(crate) struct Dispatch {
    handler: Arc<dyn RequestHandler>
}

impl Dispatch {
    #[inline]
    pub(crate) fn new<H: RequestHandler>(handler: H) -> Self {
        Self { handler: Arc::new(handler) }
    }
}

impl Service<Request<Incoming>> for Dispatch {
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    #[inline]
    fn call(&self, request: Request<Incoming>) -> Self::Future {
        let response = self.handler.call(request);
        Box::pin(async move { Ok(response.await) })
    }
}
