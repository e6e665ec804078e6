//! WSS capabilities documents.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::{Deserialize, Serialize};
use wss_auth::namespaces::AUTHN;

use crate::error::{Error, ErrorKind, Result};

/// The parts of a `GetCapabilities` response the client relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// URNs listed under `authn:SupportedAuthenticationMethod`, in document order.
    pub supported_authentication_methods: Vec<String>,
    /// Text of `Capability/SecuredServiceType`, exactly as the WSS sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secured_service_type: Option<String>,
}

impl Capabilities {
    /// Parse a capabilities document.
    ///
    /// Fails on malformed XML or when the input contains no element at all.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut capabilities = Capabilities::default();
        // local names of the open elements, root first
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut supported_depth = 0usize;
        let mut saw_root = false;
        let mut service_type = String::new();

        loop {
            let (ns, event) = reader.read_resolved_event().map_err(Error::xml)?;
            let in_authn = matches!(ns, ResolveResult::Bound(ns) if ns.as_ref() == AUTHN.uri.as_bytes());

            match event {
                Event::Start(e) => {
                    saw_root = true;
                    let local = e.local_name().as_ref().to_vec();
                    if in_authn && local == b"SupportedAuthenticationMethod" {
                        supported_depth += 1;
                    } else if in_authn && local == b"AuthenticationMethod" && supported_depth > 0 {
                        if let Some(id) = method_id(&e)? {
                            capabilities.supported_authentication_methods.push(id);
                        }
                    }
                    path.push(local);
                }
                Event::Empty(e) => {
                    saw_root = true;
                    if in_authn
                        && e.local_name().as_ref() == b"AuthenticationMethod"
                        && supported_depth > 0
                    {
                        if let Some(id) = method_id(&e)? {
                            capabilities.supported_authentication_methods.push(id);
                        }
                    }
                }
                Event::Text(t) if is_secured_service_type(&path) => {
                    service_type.push_str(&t.unescape().map_err(Error::xml)?);
                }
                Event::CData(c) if is_secured_service_type(&path) => {
                    service_type.push_str(&String::from_utf8_lossy(&c));
                }
                Event::End(e) => {
                    if is_secured_service_type(&path) && capabilities.secured_service_type.is_none() {
                        capabilities.secured_service_type = Some(std::mem::take(&mut service_type));
                    }
                    if in_authn && e.local_name().as_ref() == b"SupportedAuthenticationMethod" {
                        supported_depth = supported_depth.saturating_sub(1);
                    }
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(Error::new(ErrorKind::Xml(
                "capabilities response contains no document element".to_string(),
            )));
        }

        Ok(capabilities)
    }
}

fn method_id(element: &quick_xml::events::BytesStart<'_>) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(Error::xml)?;
        if attr.key.local_name().as_ref() == b"id" {
            return Ok(Some(attr.unescape_value().map_err(Error::xml)?.into_owned()));
        }
    }
    Ok(None)
}

fn is_secured_service_type(path: &[Vec<u8>]) -> bool {
    path.len() == 3 && path[1] == b"Capability" && path[2] == b"SecuredServiceType"
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WSSCapabilities version="1.0" xmlns:authn="http://www.gdi-nrw.org/authentication" xmlns:ows="http://www.opengis.net/ows">
  <ows:ServiceIdentification>
    <ows:Title>Secured WMS</ows:Title>
  </ows:ServiceIdentification>
  <Capability>
    <SecuredServiceType>WMS</SecuredServiceType>
    <authn:SupportedAuthenticationMethodList>
      <authn:SupportedAuthenticationMethod>
        <authn:AuthenticationMethod id="urn:x-gdi-nrw:authnMethod:1.0:password"/>
      </authn:SupportedAuthenticationMethod>
      <authn:SupportedAuthenticationMethod>
        <authn:AuthenticationMethod id="urn:x-gdi-nrw:authnMethod:1.0:session"></authn:AuthenticationMethod>
        <authn:WASAuthenticationMethodInfo/>
      </authn:SupportedAuthenticationMethod>
    </authn:SupportedAuthenticationMethodList>
  </Capability>
</WSSCapabilities>"#;

    #[test]
    fn test_parse_capabilities() {
        let capabilities = Capabilities::parse(CAPABILITIES).unwrap();
        assert_eq!(
            capabilities.supported_authentication_methods,
            vec![
                "urn:x-gdi-nrw:authnMethod:1.0:password".to_string(),
                "urn:x-gdi-nrw:authnMethod:1.0:session".to_string(),
            ]
        );
        assert_eq!(capabilities.secured_service_type.as_deref(), Some("WMS"));
    }

    #[test]
    fn test_methods_outside_supported_list_are_ignored() {
        let xml = r#"<Caps xmlns:authn="http://www.gdi-nrw.org/authentication">
            <authn:AuthenticationMethod id="urn:stray"/>
            <AuthenticationMethod id="urn:unqualified"/>
          </Caps>"#;
        let capabilities = Capabilities::parse(xml).unwrap();
        assert!(capabilities.supported_authentication_methods.is_empty());
        assert_eq!(capabilities.secured_service_type, None);
    }

    #[test]
    fn test_other_prefix_same_namespace() {
        let xml = r#"<Caps xmlns:a="http://www.gdi-nrw.org/authentication">
            <a:SupportedAuthenticationMethod><a:AuthenticationMethod id="urn:x"/></a:SupportedAuthenticationMethod>
          </Caps>"#;
        let capabilities = Capabilities::parse(xml).unwrap();
        assert_eq!(capabilities.supported_authentication_methods, vec!["urn:x".to_string()]);
    }

    #[test]
    fn test_secured_service_type_only_directly_under_capability() {
        let xml = r#"<Caps><Other><SecuredServiceType>WFS</SecuredServiceType></Other></Caps>"#;
        assert_eq!(Capabilities::parse(xml).unwrap().secured_service_type, None);
    }

    #[test]
    fn test_secured_service_type_keeps_raw_text() {
        let xml = "<Caps><Capability><SecuredServiceType> WFS\n</SecuredServiceType></Capability></Caps>";
        assert_eq!(
            Capabilities::parse(xml).unwrap().secured_service_type.as_deref(),
            Some(" WFS\n")
        );
    }

    #[test]
    fn test_parse_failures() {
        assert!(Capabilities::parse("Service temporarily unavailable").is_err());
        assert!(Capabilities::parse("").is_err());
        assert!(Capabilities::parse("<Caps><Capability></Caps>").is_err());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(Capabilities::parse(CAPABILITIES).unwrap()).unwrap();
        assert_eq!(json["secured_service_type"], "WMS");
        assert_eq!(json["supported_authentication_methods"].as_array().unwrap().len(), 2);
    }
}
