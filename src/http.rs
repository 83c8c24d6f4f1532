//! HTTP types handed to and returned from request handlers

use bytes::Bytes;
use serde::Serialize;
use crate::error::BoxError;

use hyper::body::{
    Body,
    Frame,
    Incoming,
    SizeHint
};

use http_body_util::{
    BodyExt,
    Empty,
    Full
};

use std::{
    pin::Pin,
    task::{Context, Poll}
};

pub use hyper::{
    header,
    Method,
    Request,
    Response,
    StatusCode,
};

/// Boxed body used for responses
pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

/// An incoming HTTP request as it is passed to a handler
pub type HttpRequest = Request<Incoming>;

/// An HTTP response a handler produces
pub type HttpResponse = Response<HttpBody>;

/// Represents a response body
#[derive(Debug)]
pub struct HttpBody {
    inner: BoxBody
}

impl Body for HttpBody {
    type Data = Bytes;
    type Error = BoxError;

    #[inline]
    fn poll_frame(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Default for HttpBody {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl HttpBody {
    /// Creates an empty body
    #[inline]
    pub fn empty() -> Self {
        let inner = Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed();
        Self { inner }
    }

    /// Creates a body that holds a single chunk of bytes
    #[inline]
    pub fn full(content: impl Into<Bytes>) -> Self {
        let inner = Full::new(content.into())
            .map_err(|never| match never {})
            .boxed();
        Self { inner }
    }

    /// Creates a body with a JSON-serialized value
    #[inline]
    pub fn json<T: Serialize>(content: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(content).map(Self::full)
    }

    /// Wraps any body whose errors can be boxed
    #[inline]
    pub fn boxed<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>
    {
        Self { inner: body.map_err(Into::into).boxed() }
    }
}

impl From<&'static str> for HttpBody {
    #[inline]
    fn from(content: &'static str) -> Self {
        Self::full(content)
    }
}

impl From<String> for HttpBody {
    #[inline]
    fn from(content: String) -> Self {
        Self::full(content)
    }
}

impl From<Vec<u8>> for HttpBody {
    #[inline]
    fn from(content: Vec<u8>) -> Self {
        Self::full(content)
    }
}

impl From<Bytes> for HttpBody {
    #[inline]
    fn from(content: Bytes) -> Self {
        Self::full(content)
    }
}

impl From<()> for HttpBody {
    #[inline]
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

/// Converts a handler's return value into an [`HttpResponse`]
///
/// Anything that converts into an [`HttpBody`] becomes a `200 OK` response.
pub trait IntoResponse {
    /// Performs the conversion
    fn into_response(self) -> HttpResponse;
}

impl IntoResponse for HttpResponse {
    #[inline]
    fn into_response(self) -> HttpResponse {
        self
    }
}

impl IntoResponse for StatusCode {
    #[inline]
    fn into_response(self) -> HttpResponse {
        let mut response = Response::new(HttpBody::empty());
        *response.status_mut() = self;
        response
    }
}

impl<B: Into<HttpBody>> IntoResponse for (StatusCode, B) {
    #[inline]
    fn into_response(self) -> HttpResponse {
        let (status, body) = self;
        let mut response = Response::new(body.into());
        *response.status_mut() = status;
        response
    }
}

macro_rules! impl_into_response_for_body {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResponse for $ty {
                #[inline]
                fn into_response(self) -> HttpResponse {
                    Response::new(self.into())
                }
            }
        )*
    };
}

impl_into_response_for_body!(
    HttpBody,
    &'static str,
    String,
    Vec<u8>,
    Bytes,
    (),
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Pong {
        ok: bool
    }

    async fn read(body: HttpBody) -> Bytes {
        body.collect()
            .await
            .unwrap()
            .to_bytes()
    }

    #[tokio::test]
    async fn it_creates_empty_body() {
        let body = HttpBody::empty();

        assert!(body.is_end_stream());
        assert_eq!(read(body).await, Bytes::new());
    }

    #[tokio::test]
    async fn it_creates_full_body() {
        let body = HttpBody::full("ok");

        assert_eq!(body.size_hint().exact(), Some(2));
        assert_eq!(read(body).await, Bytes::from_static(b"ok"));
    }

    #[tokio::test]
    async fn it_creates_json_body() {
        let body = HttpBody::json(&Pong { ok: true }).unwrap();

        assert_eq!(read(body).await, Bytes::from_static(b"{\"ok\":true}"));
    }

    #[tokio::test]
    async fn it_converts_str_into_ok_response() {
        let response = "ok".into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read(response.into_body()).await, Bytes::from_static(b"ok"));
    }

    #[tokio::test]
    async fn it_converts_status_with_body_into_response() {
        let response = (StatusCode::NOT_FOUND, String::from("missing")).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read(response.into_body()).await, Bytes::from_static(b"missing"));
    }

    #[test]
    fn it_converts_status_into_empty_response() {
        let response = StatusCode::NO_CONTENT.into_response();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_end_stream());
    }
}
