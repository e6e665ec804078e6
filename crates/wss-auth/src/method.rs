//! Authentication methods understood by a WSS.

use std::io::Write;

use base64::Engine;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};
use crate::namespaces::AUTHN;

const ANONYMOUS_URN: &str = "urn:x-gdi-nrw:authnMethod:1.0:anonymous";
const PASSWORD_URN: &str = "urn:x-gdi-nrw:authnMethod:1.0:password";
const SESSION_URN: &str = "urn:x-gdi-nrw:authnMethod:1.0:session";
const WAS_URN: &str = "urn:x-gdi-nrw:authnMethod:1.0:wauthns";

/// How a client proves its identity to the WSS.
///
/// Each variant has a fixed method URN and carries its credential payload
/// already encoded the way the WSS expects it. Credential payloads are
/// redacted in Debug output.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthenticationMethod {
    /// No credentials.
    #[default]
    Anonymous,
    /// `user,password` credentials.
    Password { credentials: String },
    /// A session id issued by a previous `GetSession`.
    Session { session_id: String },
    /// A base64 encoded SAML assertion from a Web Authentication Service.
    Was { saml: String },
}

impl std::fmt::Debug for AuthenticationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Password { .. } => f
                .debug_struct("Password")
                .field("credentials", &"[REDACTED]")
                .finish(),
            Self::Session { .. } => f
                .debug_struct("Session")
                .field("session_id", &"[REDACTED]")
                .finish(),
            Self::Was { .. } => f.debug_struct("Was").field("saml", &"[REDACTED]").finish(),
        }
    }
}

impl std::fmt::Display for AuthenticationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.urn())
    }
}

impl AuthenticationMethod {
    /// Password method from pre-joined `user,password` credentials.
    pub fn password_credentials(credentials: impl Into<String>) -> Self {
        Self::Password {
            credentials: credentials.into(),
        }
    }

    /// Password method from a user name and a password.
    pub fn password(user: &str, password: &str) -> Self {
        Self::password_credentials(format!("{},{}", user, password))
    }

    /// Session method for an existing session id.
    pub fn session(session_id: impl Into<String>) -> Self {
        Self::Session {
            session_id: session_id.into(),
        }
    }

    /// WAS method from an already base64 encoded SAML assertion.
    pub fn was(encoded_saml: impl Into<String>) -> Self {
        Self::Was {
            saml: encoded_saml.into(),
        }
    }

    /// WAS method from the raw SAML assertion document.
    pub fn was_from_assertion(assertion: &[u8]) -> Self {
        Self::was(base64::engine::general_purpose::STANDARD.encode(assertion))
    }

    /// The method URN.
    pub fn urn(&self) -> &'static str {
        match self {
            Self::Anonymous => ANONYMOUS_URN,
            Self::Password { .. } => PASSWORD_URN,
            Self::Session { .. } => SESSION_URN,
            Self::Was { .. } => WAS_URN,
        }
    }

    /// Short name of the method kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Anonymous => "Anonymous",
            Self::Password { .. } => "Password",
            Self::Session { .. } => "Session",
            Self::Was { .. } => "WAS",
        }
    }

    /// The encoded credential payload.
    pub fn credentials(&self) -> &str {
        match self {
            Self::Anonymous => "",
            Self::Password { credentials } => credentials,
            Self::Session { session_id } => session_id,
            Self::Was { saml } => saml,
        }
    }

    /// Transport fields for `GetSession`, in wire order.
    pub fn as_name_value(&self) -> [(&'static str, &str); 2] {
        [("AUTHMETHOD", self.urn()), ("CREDENTIALS", self.credentials())]
    }

    /// Human readable description, safe to log.
    pub fn description(&self) -> String {
        format!(
            "Authentication Method: {} - Method URN: {}",
            self.kind_name(),
            self.urn()
        )
    }

    /// The session id, for the `Session` variant.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Session { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Replace the embedded session id, returning the previous one.
    ///
    /// Returns `None` and leaves the method untouched for other variants.
    pub fn replace_session_id(&mut self, new_id: impl Into<String>) -> Option<String> {
        match self {
            Self::Session { session_id } => Some(std::mem::replace(session_id, new_id.into())),
            _ => None,
        }
    }

    /// Write the `authn:AuthenticationData` element into a document whose
    /// root already declares the `authn` namespace.
    pub fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        self.write_element(writer, false)
    }

    /// Self-contained `authn:AuthenticationData` fragment, declaring its namespace.
    pub fn to_xml_fragment(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_element(&mut writer, true)?;
        String::from_utf8(writer.into_inner()).map_err(Error::xml)
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>, declare_namespace: bool) -> Result<()> {
        let data_name = AUTHN.qualify("AuthenticationData");
        let mut data = BytesStart::new(data_name.as_str());
        if declare_namespace {
            data.push_attribute((AUTHN.xmlns_attribute().as_str(), AUTHN.uri));
        }
        writer.write_event(Event::Start(data)).map_err(Error::xml)?;

        let method_name = AUTHN.qualify("AuthenticationMethod");
        let mut method = BytesStart::new(method_name.as_str());
        method.push_attribute(("id", self.urn()));
        writer.write_event(Event::Empty(method)).map_err(Error::xml)?;

        let credentials_name = AUTHN.qualify("Credentials");
        writer
            .write_event(Event::Start(BytesStart::new(credentials_name.as_str())))
            .map_err(Error::xml)?;
        if !self.credentials().is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(self.credentials())))
                .map_err(Error::xml)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(credentials_name.as_str())))
            .map_err(Error::xml)?;

        writer
            .write_event(Event::End(BytesEnd::new(data_name.as_str())))
            .map_err(Error::xml)?;
        Ok(())
    }
}
