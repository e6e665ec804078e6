//! Core HTTP client for WSS exchanges.

use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::Response;

/// HTTP client used for every exchange with a WSS.
///
/// Responses are returned whatever their status code; callers decide what
/// counts as a failure.
#[derive(Debug, Clone)]
pub struct WssHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl WssHttpClient {
    /// Create a new HTTP client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent);

        if let Some(ref proxy) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| Error::with_source(ErrorKind::Config(format!("Invalid proxy: {}", e)), e))?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }

        if config.accept_invalid_certs {
            warn!("Certificate validation disabled for this WSS client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Execute a request and buffer the whole response.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut url = url::Url::parse(&request.url)?;
        if !request.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query_params);
        }

        let mut req = self.inner.request(request.method.to_reqwest(), url);

        if let Some(ref auth) = self.config.basic_auth {
            req = req.basic_auth(auth.username(), Some(auth.password()));
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req = match body {
                RequestBody::Text(text) => req.body(text),
                RequestBody::Form(fields) => req.body(serde_urlencoded::to_string(&fields)?),
            };
        }

        if self.config.enable_tracing {
            debug!("Sending request");
        }

        let response = Response::read(req.send().await?).await?;

        if self.config.enable_tracing {
            let status = response.status();
            let content_length = response.body().len();

            if response.is_success() {
                debug!(status, content_length, charset = response.charset(), "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        assert!(client.config().enable_tracing);
        assert!(!client.config().accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        let err = client.execute(client.get("not a url")).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_form_post() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/wss"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string("SERVICE=WSS&REQUEST=CloseSession&SESSIONID=ID+1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        let response = client
            .execute(client.post(format!("{}/wss?", mock_server.uri())).form([
                ("SERVICE", "WSS"),
                ("REQUEST", "CloseSession"),
                ("SESSIONID", "ID 1"),
            ]))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(&response.body()[..], b"ok");
    }

    #[tokio::test]
    async fn test_get_with_query_and_charset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wss"))
            .and(query_param("SERVICE", "WSS"))
            .and(query_param("REQUEST", "GetCapabilities"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<Capabilities/>".as_bytes(), "text/xml; charset=UTF-8"),
            )
            .mount(&mock_server)
            .await;

        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        let response = client
            .execute(
                client
                    .get(format!("{}/wss", mock_server.uri()))
                    .query("SERVICE", "WSS")
                    .query("REQUEST", "GetCapabilities"),
            )
            .await
            .unwrap();

        assert_eq!(response.charset(), "UTF-8");
        assert_eq!(&response.body()[..], b"<Capabilities/>");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        let response = client
            .execute(client.post(mock_server.uri()).xml("<DoService/>"))
            .await
            .unwrap();

        assert_eq!(response.status(), 503);
        assert_eq!(&response.body()[..], b"down");
    }

    #[tokio::test]
    async fn test_basic_auth_is_sent() {
        let mock_server = MockServer::start().await;

        // "gis:secret" base64-encoded
        Mock::given(method("POST"))
            .and(header("Authorization", "Basic Z2lzOnNlY3JldA=="))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WssHttpClient::new(
            ClientConfig::builder()
                .with_basic_auth("gis", "secret")
                .build(),
        )
        .unwrap();

        let response = client
            .execute(client.post(mock_server.uri()).text("ping"))
            .await
            .unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_io_error() {
        // Bind and drop a listener to obtain a port nothing is listening on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = WssHttpClient::new(ClientConfig::default()).unwrap();
        let err = client
            .execute(client.post(format!("http://127.0.0.1:{}/wss", port)).text("x"))
            .await
            .unwrap_err();

        assert!(err.is_io(), "expected io error, got {:?}", err.kind);
    }
}
