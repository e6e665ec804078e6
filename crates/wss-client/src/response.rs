//! Buffered HTTP responses.

use bytes::Bytes;
use std::collections::HashMap;

use crate::error::Result;
use crate::DEFAULT_CHARSET;

/// A fully read HTTP response.
///
/// The body is buffered so callers can inspect it more than once, and the
/// charset declared in `Content-Type` is captured next to it.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
    charset: String,
}

impl Response {
    /// Build a response from its parts. Header names are matched case-insensitively.
    pub fn from_parts(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        // Normalize header names to lowercase for case-insensitive lookups
        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        let charset = headers
            .get("content-type")
            .and_then(|ct| charset_from_content_type(ct))
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());

        Self {
            status,
            headers,
            body: body.into(),
            charset,
        }
    }

    /// Read a reqwest response to the end.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;
        Ok(Self::from_parts(status, headers, body))
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Iterate over all headers (lowercased names).
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Charset declared by the server, or [`DEFAULT_CHARSET`].
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Get the raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Split into body and charset.
    pub fn into_body(self) -> (Bytes, String) {
        (self.body, self.charset)
    }
}

/// Extract the `charset` parameter from a Content-Type value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/xml; charset=UTF-8"),
            Some("UTF-8".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/xml;Charset=\"windows-1252\""),
            Some("windows-1252".to_string())
        );
        assert_eq!(charset_from_content_type("text/xml"), None);
        assert_eq!(charset_from_content_type("text/xml; charset="), None);
    }

    #[test]
    fn test_from_parts_defaults_charset() {
        let response = Response::from_parts(200, headers(&[("Content-Type", "text/plain")]), "ID1");
        assert_eq!(response.charset(), DEFAULT_CHARSET);
        assert!(response.is_success());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = Response::from_parts(
            500,
            headers(&[("Content-Type", "text/xml; charset=UTF-8"), ("X-Wss", "1")]),
            Bytes::from_static(b"<x/>"),
        );

        assert_eq!(response.header("x-wss"), Some("1"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/xml; charset=UTF-8"));
        assert_eq!(response.charset(), "UTF-8");
        assert!(!response.is_success());

        let (body, charset) = response.into_body();
        assert_eq!(&body[..], b"<x/>");
        assert_eq!(charset, "UTF-8");
    }
}
