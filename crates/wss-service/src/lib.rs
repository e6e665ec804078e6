//! # wss-service
//!
//! Session-authenticated access to services secured by a Web Security Service.
//!
//! A WSS sits in front of an OGC service (WMS, WFS, ...) and only forwards
//! requests that carry a valid session. This crate handles the protocol
//! around that:
//!
//! - `GetSession` / `CloseSession` with any [`wss_auth::AuthenticationMethod`]
//! - `DoService` envelopes for `HTTP_GET` and `HTTP_POST` requests
//! - detection of in-band exception reports, with one session renewal
//!   before giving up
//! - `GetCapabilities` parsing
//!
//! ## Example
//!
//! ```rust,no_run
//! use wss_service::{DcpType, WssClient, WssConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WssClient::from_config(WssConfig::from_env()?)?;
//!
//!     println!("{:?}", client.supported_authentication_methods().await);
//!
//!     let response = client
//!         .do_service(
//!             DcpType::HttpGet,
//!             "SERVICE=WMS&VERSION=1.1.1&REQUEST=GetCapabilities",
//!             "http://example.org/wms",
//!         )
//!         .await?;
//!     println!("{}", response.as_text());
//!     Ok(())
//! }
//! ```

mod capabilities;
mod client;
mod config;
mod envelope;
mod error;
mod payload;
mod retry;

pub use capabilities::Capabilities;
pub use client::WssClient;
pub use config::WssConfig;
pub use envelope::{build_do_service, DcpType, RequestParameter};
pub use error::{Error, ErrorKind, Result};
pub use payload::{Payload, EXCEPTION_MARKER};
pub use retry::{RetryConfig, RetryPolicy};
