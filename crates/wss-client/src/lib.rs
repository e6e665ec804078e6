//! # wss-client
//!
//! HTTP transport for talking to a Web Security Service (WSS).
//!
//! This crate provides the plumbing the session layer builds on:
//! - Form, XML and query requests with ordered fields
//! - Optional HTTP proxy and basic credentials
//! - Explicit, per-client opt-in for self-signed TLS backends
//! - Fully buffered responses carrying status, headers, body and charset
//! - Request/response tracing
//!
//! The transport never interprets response bodies. A WSS reports most
//! failures inside `200 OK` responses, so deciding whether an exchange
//! succeeded is left to the protocol layer (`wss-service`).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WssClient                              │
//! │  (wss-service: sessions, envelopes, retry-once policy)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WssHttpClient                            │
//! │  - reqwest client built from ClientConfig                   │
//! │  - Request building (form / xml / query)                    │
//! │  - Buffered Response with declared charset                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use wss_client::{ClientConfig, WssHttpClient};
//!
//! let http = WssHttpClient::new(ClientConfig::default())?;
//! let response = http
//!     .execute(http.get("https://example.com/wss?SERVICE=WSS&REQUEST=GetCapabilities"))
//!     .await?;
//! println!("{} bytes ({})", response.body().len(), response.charset());
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::WssHttpClient;
pub use config::{BasicAuth, ClientConfig, ClientConfigBuilder, ProxyConfig};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;

/// Charset assumed when a response does not declare one (HTTP/1.1 default).
pub const DEFAULT_CHARSET: &str = "ISO-8859-1";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("wss-accessor/", env!("CARGO_PKG_VERSION"));
