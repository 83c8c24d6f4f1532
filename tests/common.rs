//! Common test utilities

#![allow(missing_docs)]
#![allow(unreachable_pub)]
#![allow(dead_code)]

use reqwest::Client;

pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// A client with default certificate verification
pub fn strict_client() -> Client {
    Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// A client that only speaks HTTP/1
pub fn http1_client() -> Client {
    Client::builder()
        .no_proxy()
        .http1_only()
        .build()
        .unwrap()
}

/// A client that speaks HTTP/2 without negotiation
pub fn http2_client() -> Client {
    Client::builder()
        .no_proxy()
        .http2_prior_knowledge()
        .build()
        .unwrap()
}
