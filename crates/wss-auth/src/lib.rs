//! # wss-auth
//!
//! Authentication building blocks for the WSS session protocol.
//!
//! ## Security
//!
//! - Credential payloads (passwords, SAML assertions, session ids) are
//!   redacted in Debug output
//! - Session ids are never logged, only their length
//!
//! ## Supported Authentication Methods
//!
//! | Variant     | Method URN                                  | Credentials            |
//! |-------------|---------------------------------------------|------------------------|
//! | `Anonymous` | `urn:x-gdi-nrw:authnMethod:1.0:anonymous`   | empty                  |
//! | `Password`  | `urn:x-gdi-nrw:authnMethod:1.0:password`    | `user,password`        |
//! | `Session`   | `urn:x-gdi-nrw:authnMethod:1.0:session`     | session id             |
//! | `Was`       | `urn:x-gdi-nrw:authnMethod:1.0:wauthns`     | base64 SAML assertion  |
//!
//! ## Example
//!
//! ```rust
//! use wss_auth::AuthenticationMethod;
//!
//! let method = AuthenticationMethod::password("alice", "s3cret");
//! assert_eq!(method.urn(), "urn:x-gdi-nrw:authnMethod:1.0:password");
//!
//! let fields = method.as_name_value();
//! assert_eq!(fields[0], ("AUTHMETHOD", "urn:x-gdi-nrw:authnMethod:1.0:password"));
//! assert_eq!(fields[1], ("CREDENTIALS", "alice,s3cret"));
//! ```

mod error;
mod method;
pub mod namespaces;
mod session;

pub use error::{Error, ErrorKind, Result};
pub use method::AuthenticationMethod;
pub use session::SessionHandle;
