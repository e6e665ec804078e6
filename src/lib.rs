//! # wss-accessor
//!
//! A client for services secured by a deegree-style Web Security Service (WSS).
//!
//! The WSS issues sessions through `GetSession` and tunnels every request to
//! the secured OGC service inside a `DoService` envelope. This library keeps
//! the session alive across those calls, renewing it once when the WSS
//! reports a failure in-band.
//!
//! ## Security
//!
//! - Passwords, SAML assertions and session ids are redacted in Debug output
//! - Tracing skips credential arguments and logs only session id lengths
//! - Certificate validation can only be relaxed through an explicit
//!   transport setting
//!
//! ## Crates
//!
//! - **wss-client** - HTTP transport: timeouts, proxy, basic credentials, charset capture
//! - **wss-auth** - Authentication methods, session handles, protocol namespaces
//! - **wss-service** - `WssClient`: sessions, `DoService` envelopes, retry, capabilities
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wss_accessor::{AuthenticationMethod, DcpType, WssClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WssClient::new("https://wss.example.org/wss")?;
//!     client
//!         .set_authentication_method(AuthenticationMethod::password("alice", "s3cret"))
//!         .await;
//!
//!     let map = client
//!         .do_service(
//!             DcpType::HttpGet,
//!             "SERVICE=WMS&VERSION=1.1.1&REQUEST=GetMap&LAYERS=roads&BBOX=6,50,7,51&WIDTH=256&HEIGHT=256&FORMAT=image/png&SRS=EPSG:4326&STYLES=",
//!             "http://example.org/wms",
//!         )
//!         .await?;
//!
//!     std::fs::write("roads.png", map.as_bytes())?;
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use wss_auth as auth;
pub use wss_client as client;
pub use wss_service as service;

// Re-export commonly used types at the top level
pub use wss_auth::{AuthenticationMethod, SessionHandle};
pub use wss_client::{BasicAuth, ClientConfig, ProxyConfig};
pub use wss_service::{
    Capabilities, DcpType, Error, ErrorKind, Payload, RequestParameter, Result, WssClient,
    WssConfig,
};
