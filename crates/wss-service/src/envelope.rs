//! `DoService` envelope construction.
//!
//! Every tunneled request travels inside a `DoService` document:
//!
//! ```text
//! <DoService xmlns:authn=".." xmlns:wss=".." xmlns:ows=".." xmlns:xsi=".." service="WSS" version="1.0">
//!   <authn:AuthenticationData>..</authn:AuthenticationData>
//!   <wss:ServiceRequest DCP="HTTP_GET">
//!     <wss:RequestParameter id="HTTP_Header">Mime-Type: text/xml</wss:RequestParameter>
//!     <wss:Payload>SERVICE=WMS&amp;REQUEST=GetMap&amp;..</wss:Payload>
//!   </wss:ServiceRequest>
//!   <wss:FacadeURL>http://example.org/wms</wss:FacadeURL>
//! </DoService>
//! ```

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use wss_auth::namespaces::{DO_SERVICE_DECLARATIONS, WSS};
use wss_auth::AuthenticationMethod;

use crate::error::{Error, ErrorKind, Result};

/// How the tunneled request is carried inside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DcpType {
    /// Key-value request, embedded as escaped text.
    HttpGet,
    /// Request document, embedded as CDATA.
    HttpPost,
}

impl DcpType {
    /// Wire name used in the `DCP` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            DcpType::HttpGet => "HTTP_GET",
            DcpType::HttpPost => "HTTP_POST",
        }
    }
}

impl fmt::Display for DcpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DcpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HTTP_GET" => Ok(DcpType::HttpGet),
            "HTTP_POST" => Ok(DcpType::HttpPost),
            other => Err(Error::new(ErrorKind::InvalidProtocol(other.to_string()))),
        }
    }
}

/// A `wss:RequestParameter` forwarded to the secured service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameter {
    pub id: String,
    pub value: String,
}

impl RequestParameter {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// The parameters sent when the caller supplies none: an XML mime-type header.
    pub fn defaults() -> Vec<RequestParameter> {
        vec![RequestParameter::new("HTTP_Header", "Mime-Type: text/xml")]
    }
}

/// Serialize a `DoService` envelope.
///
/// Parameters are written in the order given. The authentication data is
/// written as-is, so callers pass the session-backed method for the current
/// session.
pub fn build_do_service(
    dcp_type: DcpType,
    request: &str,
    authentication: &AuthenticationMethod,
    parameters: &[RequestParameter],
    facade_url: &str,
) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(Error::xml)?;

    let mut root = BytesStart::new("DoService");
    for namespace in &DO_SERVICE_DECLARATIONS {
        root.push_attribute((namespace.xmlns_attribute().as_str(), namespace.uri));
    }
    root.push_attribute(("service", "WSS"));
    root.push_attribute(("version", "1.0"));
    writer.write_event(Event::Start(root)).map_err(Error::xml)?;

    authentication.write_xml(&mut writer)?;

    let service_request = WSS.qualify("ServiceRequest");
    let mut element = BytesStart::new(service_request.as_str());
    element.push_attribute(("DCP", dcp_type.as_str()));
    writer.write_event(Event::Start(element)).map_err(Error::xml)?;

    let parameter_name = WSS.qualify("RequestParameter");
    for parameter in parameters {
        let mut element = BytesStart::new(parameter_name.as_str());
        element.push_attribute(("id", parameter.id.as_str()));
        write_text_element(&mut writer, element, &parameter.value)?;
    }

    let payload_name = WSS.qualify("Payload");
    writer
        .write_event(Event::Start(BytesStart::new(payload_name.as_str())))
        .map_err(Error::xml)?;
    match dcp_type {
        DcpType::HttpGet => {
            if !request.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::new(request)))
                    .map_err(Error::xml)?;
            }
        }
        DcpType::HttpPost => {
            for section in cdata_sections(request) {
                writer
                    .write_event(Event::CData(BytesCData::new(section)))
                    .map_err(Error::xml)?;
            }
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(payload_name.as_str())))
        .map_err(Error::xml)?;

    writer
        .write_event(Event::End(BytesEnd::new(service_request.as_str())))
        .map_err(Error::xml)?;

    let facade_name = WSS.qualify("FacadeURL");
    write_text_element(
        &mut writer,
        BytesStart::new(facade_name.as_str()),
        facade_url,
    )?;

    writer
        .write_event(Event::End(BytesEnd::new("DoService")))
        .map_err(Error::xml)?;

    String::from_utf8(writer.into_inner()).map_err(Error::xml)
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start)).map_err(Error::xml)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(Error::xml)?;
    }
    writer.write_event(Event::End(end)).map_err(Error::xml)?;
    Ok(())
}

/// Split content so that no section contains the `]]>` terminator.
///
/// Adjacent CDATA sections concatenate back to the original text when parsed.
fn cdata_sections(content: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}
