#![allow(missing_docs)]

use bytes::Bytes;
use ephemeral_server::{
    build,
    http::{header, Method, Response, StatusCode},
    HttpBody,
    HttpRequest,
    ServerOptions
};
use futures_util::stream;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use serde::{Deserialize, Serialize};

mod common;

#[derive(Serialize, Deserialize)]
struct Health {
    status: String
}

#[tokio::test]
async fn it_responds_ok() {
    let (info, server) = build(|_req: HttpRequest| async { "ok" }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .get(format!("http://localhost:{}/", info.port))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_resolves_with_valid_port() {
    let (info, server) = build(|_req: HttpRequest| async {}, ServerOptions::default())
        .await
        .unwrap();

    assert!(info.port > 0);
    assert!(!info.secure);
    assert_eq!(info.scheme(), "http");
    assert!(!server.is_secure());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_passes_request_to_handler() {
    let (info, server) = build(|req: HttpRequest| async move {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let body = req.into_body()
            .collect()
            .await
            .map(|body| body.to_bytes())
            .unwrap_or_default();

        format!("{method} {path} {}", String::from_utf8_lossy(&body))
    }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .request(Method::POST, info.url("/echo"))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.text().await.unwrap(), "POST /echo payload");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_returns_handler_status_and_headers() {
    let (info, server) = build(|_req: HttpRequest| async {
        Response::builder()
            .status(StatusCode::CREATED)
            .header(header::CONTENT_TYPE, "application/json")
            .body(HttpBody::json(&Health { status: "up".into() }).unwrap())
            .unwrap()
    }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .get(info.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");

    let health: Health = response.json().await.unwrap();
    assert_eq!(health.status, "up");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_streams_chunked_response_body() {
    let (info, server) = build(|_req: HttpRequest| async {
        let chunks = ["first ", "second ", "third"]
            .map(|chunk| Ok::<_, std::io::Error>(Frame::data(Bytes::from_static(chunk.as_bytes()))));
        HttpBody::boxed(StreamBody::new(stream::iter(chunks)))
    }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .get(info.url("/stream"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.bytes().await.unwrap(), Bytes::from_static(b"first second third"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_returns_status_only_response() {
    let (info, server) = build(|_req: HttpRequest| async { StatusCode::NOT_FOUND }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .get(info.url("/missing"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_serves_http2_with_prior_knowledge() {
    let (info, server) = build(|_req: HttpRequest| async { "h2" }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http2_client()
        .get(info.url("/"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.version(), reqwest::Version::HTTP_2);
    assert_eq!(response.text().await.unwrap(), "h2");

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_serves_many_requests_on_one_server() {
    let (info, server) = build(|req: HttpRequest| async move {
        req.uri().path().trim_start_matches('/').to_owned()
    }, ServerOptions::default())
        .await
        .unwrap();

    let client = common::http1_client();
    for i in 0..10 {
        let body = client
            .get(info.url(&format!("/{i}")))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(body, i.to_string());
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn it_has_no_server_error_while_healthy() {
    let (info, mut server) = build(|_req: HttpRequest| async { "ok" }, ServerOptions::default())
        .await
        .unwrap();

    let response = common::http1_client()
        .get(info.url("/"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(server.error().is_none());
    assert!(server.is_running());

    let pending = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        server.failed()
    ).await;

    assert!(pending.is_err());

    server.stop().await.unwrap();
}
