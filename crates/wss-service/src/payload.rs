//! Response bodies returned by the WSS.

use std::sync::OnceLock;

use bytes::Bytes;
use wss_client::Response;

/// Marker the WSS places in the body of every OGC exception report.
pub const EXCEPTION_MARKER: &str = "ServiceExceptionReport";

/// A response body together with the charset it was declared in.
///
/// Text is decoded on first use and kept for later calls.
#[derive(Debug, Clone)]
pub struct Payload {
    bytes: Bytes,
    charset: String,
    text: OnceLock<String>,
}

impl Payload {
    /// Wrap raw bytes declared in `charset`.
    pub fn from_bytes(bytes: impl Into<Bytes>, charset: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            charset: charset.into(),
            text: OnceLock::new(),
        }
    }

    /// The raw body.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The declared charset.
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// The body decoded with its charset.
    ///
    /// Unknown charset labels fall back to lossy UTF-8.
    pub fn as_text(&self) -> &str {
        self.text.get_or_init(|| decode(&self.bytes, &self.charset))
    }

    /// Returns true if the body is an OGC exception report.
    pub fn contains_exception(&self) -> bool {
        self.as_text().contains(EXCEPTION_MARKER)
    }

    /// Consume the payload, returning the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Response> for Payload {
    fn from(response: Response) -> Self {
        let (body, charset) = response.into_body();
        Self::from_bytes(body, charset)
    }
}

fn decode(bytes: &[u8], charset: &str) -> String {
    match encoding_rs::Encoding::for_label(charset.trim().as_bytes()) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => {
            tracing::debug!(charset, "Unknown charset, decoding as UTF-8");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_decodes_latin1() {
        let payload = Payload::from_bytes(&b"Stra\xdfe"[..], "ISO-8859-1");
        assert_eq!(payload.as_text(), "Straße");
        assert_eq!(payload.as_bytes(), b"Stra\xdfe");
    }

    #[test]
    fn test_decodes_utf8() {
        let payload = Payload::from_bytes("Straße".as_bytes().to_vec(), "utf-8");
        assert_eq!(payload.as_text(), "Straße");
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        let payload = Payload::from_bytes("Grüße".as_bytes().to_vec(), "x-not-a-charset");
        assert_eq!(payload.as_text(), "Grüße");
        assert_eq!(payload.charset(), "x-not-a-charset");
    }

    #[test]
    fn test_contains_exception() {
        let report = Payload::from_bytes(
            &br#"<ServiceExceptionReport version="1.2.0"><ServiceException>session expired</ServiceException></ServiceExceptionReport>"#[..],
            "UTF-8",
        );
        assert!(report.contains_exception());

        let map = Payload::from_bytes(&b"<WMT_MS_Capabilities/>"[..], "UTF-8");
        assert!(!map.contains_exception());
    }

    #[test]
    fn test_empty_payload_is_not_an_exception() {
        let payload = Payload::from_bytes(Bytes::new(), "UTF-8");
        assert_eq!(payload.as_text(), "");
        assert!(!payload.contains_exception());
        assert!(payload.as_bytes().is_empty());
    }

    #[test]
    fn test_text_is_memoized() {
        let payload = Payload::from_bytes(&b"ID1234-5.6789"[..], "ISO-8859-1");
        let first = payload.as_text() as *const str;
        let second = payload.as_text() as *const str;
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_response_uses_declared_charset() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/xml; charset=UTF-8".to_string());
        let response = Response::from_parts(200, headers, "<a>ü</a>".as_bytes().to_vec());

        let payload = Payload::from(response);
        assert_eq!(payload.charset(), "UTF-8");
        assert_eq!(payload.as_text(), "<a>ü</a>");
        assert_eq!(&payload.into_bytes()[..], "<a>ü</a>".as_bytes());
    }
}
