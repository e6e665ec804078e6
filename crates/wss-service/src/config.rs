//! Service client configuration.

use wss_auth::AuthenticationMethod;
use wss_client::ClientConfig;

use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryConfig;

/// Everything needed to talk to one WSS.
#[derive(Debug, Clone)]
pub struct WssConfig {
    /// Endpoint of the WSS.
    pub wss_url: String,
    /// URL the secured service should believe it was called through.
    pub facade_url: Option<String>,
    /// Method used for `GetSession`.
    pub authentication: AuthenticationMethod,
    /// Transport settings.
    pub client: ClientConfig,
    /// Session renewal budget for `DoService`.
    pub retry: RetryConfig,
}

impl WssConfig {
    /// Anonymous access to `wss_url` with default transport settings.
    pub fn new(wss_url: impl Into<String>) -> Self {
        Self {
            wss_url: wss_url.into(),
            facade_url: None,
            authentication: AuthenticationMethod::Anonymous,
            client: ClientConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_facade_url(mut self, facade_url: impl Into<String>) -> Self {
        self.facade_url = Some(facade_url.into());
        self
    }

    pub fn with_authentication(mut self, method: AuthenticationMethod) -> Self {
        self.authentication = method;
        self
    }

    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `WSS_URL`
    ///
    /// Optional:
    /// - `WSS_FACADE_URL`
    /// - `WSS_SAML` (base64 SAML assertion), else `WSS_USERNAME` / `WSS_PASSWORD`,
    ///   else `WSS_SESSION_ID`; anonymous when none is set
    /// - `WSS_HTTP_USER` / `WSS_HTTP_PASSWORD` (HTTP basic credentials)
    /// - `WSS_PROXY_HOST` / `WSS_PROXY_PORT` (port defaults to 8080)
    /// - `WSS_ACCEPT_INVALID_CERTS` (`true` or `1`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let wss_url = var("WSS_URL")
            .ok_or_else(|| Error::new(ErrorKind::EnvVar("WSS_URL".to_string())))?;

        let authentication = if let Some(saml) = var("WSS_SAML") {
            AuthenticationMethod::was(saml)
        } else if let Some(user) = var("WSS_USERNAME") {
            AuthenticationMethod::password(&user, &var("WSS_PASSWORD").unwrap_or_default())
        } else if let Some(session_id) = var("WSS_SESSION_ID") {
            AuthenticationMethod::session(session_id)
        } else {
            AuthenticationMethod::Anonymous
        };

        let mut client = ClientConfig::builder();

        if let Some(user) = var("WSS_HTTP_USER") {
            client = client.with_basic_auth(user, var("WSS_HTTP_PASSWORD").unwrap_or_default());
        }

        if let Some(host) = var("WSS_PROXY_HOST") {
            let port = match var("WSS_PROXY_PORT") {
                Some(port) => port.trim().parse::<u16>().map_err(|e| {
                    Error::with_source(
                        ErrorKind::Config(format!("WSS_PROXY_PORT is not a port: {}", port)),
                        e,
                    )
                })?,
                None => 8080,
            };
            client = client.with_proxy(host, port);
        }

        let accept_invalid_certs = var("WSS_ACCEPT_INVALID_CERTS")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        client = client.danger_accept_invalid_certs(accept_invalid_certs);

        Ok(Self {
            wss_url,
            facade_url: var("WSS_FACADE_URL"),
            authentication,
            client: client.build(),
            retry: RetryConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_url() {
        let err = WssConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EnvVar(ref name) if name == "WSS_URL"));

        let err = WssConfig::from_lookup(lookup(&[("WSS_URL", "")])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EnvVar(_)));
    }

    #[test]
    fn test_minimal_is_anonymous() {
        let config = WssConfig::from_lookup(lookup(&[("WSS_URL", "https://wss.example.org/wss")])).unwrap();
        assert_eq!(config.wss_url, "https://wss.example.org/wss");
        assert_eq!(config.authentication, AuthenticationMethod::Anonymous);
        assert_eq!(config.facade_url, None);
        assert!(config.client.proxy.is_none());
        assert!(config.client.basic_auth.is_none());
        assert!(!config.client.accept_invalid_certs);
    }

    #[test]
    fn test_authentication_precedence() {
        let config = WssConfig::from_lookup(lookup(&[
            ("WSS_URL", "http://localhost/wss"),
            ("WSS_USERNAME", "alice"),
            ("WSS_PASSWORD", "s3cret"),
            ("WSS_SESSION_ID", "ID1"),
        ]))
        .unwrap();
        assert_eq!(config.authentication, AuthenticationMethod::password("alice", "s3cret"));

        let config = WssConfig::from_lookup(lookup(&[
            ("WSS_URL", "http://localhost/wss"),
            ("WSS_SAML", "PHNhbWw+"),
            ("WSS_USERNAME", "alice"),
        ]))
        .unwrap();
        assert_eq!(config.authentication, AuthenticationMethod::was("PHNhbWw+"));

        let config = WssConfig::from_lookup(lookup(&[
            ("WSS_URL", "http://localhost/wss"),
            ("WSS_SESSION_ID", "ID1234-5.6789"),
        ]))
        .unwrap();
        assert_eq!(config.authentication, AuthenticationMethod::session("ID1234-5.6789"));
    }

    #[test]
    fn test_transport_settings() {
        let config = WssConfig::from_lookup(lookup(&[
            ("WSS_URL", "https://wss.example.org/wss"),
            ("WSS_FACADE_URL", "http://example.org/wms"),
            ("WSS_HTTP_USER", "gis"),
            ("WSS_HTTP_PASSWORD", "secret"),
            ("WSS_PROXY_HOST", "proxy.local"),
            ("WSS_PROXY_PORT", "3128"),
            ("WSS_ACCEPT_INVALID_CERTS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.facade_url.as_deref(), Some("http://example.org/wms"));
        let auth = config.client.basic_auth.as_ref().unwrap();
        assert_eq!(auth.username(), "gis");
        assert_eq!(auth.password(), "secret");
        let proxy = config.client.proxy.as_ref().unwrap();
        assert_eq!(proxy.host, "proxy.local");
        assert_eq!(proxy.port, 3128);
        assert!(config.client.accept_invalid_certs);
    }

    #[test]
    fn test_invalid_proxy_port() {
        let err = WssConfig::from_lookup(lookup(&[
            ("WSS_URL", "http://localhost/wss"),
            ("WSS_PROXY_HOST", "proxy.local"),
            ("WSS_PROXY_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = WssConfig::new("http://localhost/wss")
            .with_facade_url("http://example.org/wfs")
            .with_authentication(AuthenticationMethod::password("bob", "pw"))
            .with_retry(RetryConfig::no_retry());
        assert_eq!(config.facade_url.as_deref(), Some("http://example.org/wfs"));
        assert_eq!(config.retry.max_reauthentications, 0);
        assert_eq!(config.authentication.kind_name(), "Password");
    }
}
