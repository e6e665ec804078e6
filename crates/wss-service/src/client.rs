//! Session-authenticated WSS client.

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use wss_auth::{AuthenticationMethod, SessionHandle};
use wss_client::{BasicAuth, ClientConfig, ProxyConfig, WssHttpClient};

use crate::capabilities::Capabilities;
use crate::config::WssConfig;
use crate::envelope::{build_do_service, DcpType, RequestParameter};
use crate::error::{Error, ErrorKind, Result};
use crate::payload::Payload;
use crate::retry::{RetryConfig, RetryPolicy};

/// Mutable session state shared by all callers.
#[derive(Debug, Default)]
struct SessionState {
    /// Method used to obtain new sessions.
    configured: AuthenticationMethod,
    session: Option<ActiveSession>,
    /// Bumped every time a session is installed or dropped.
    generation: u64,
}

impl SessionState {
    fn install(&mut self, handle: SessionHandle) -> ActiveSession {
        self.generation += 1;
        let active = ActiveSession {
            authentication: AuthenticationMethod::session(handle.id()),
            handle,
            generation: self.generation,
        };
        self.session = Some(active.clone());
        active
    }

    fn clear(&mut self) -> Option<ActiveSession> {
        self.generation += 1;
        self.session.take()
    }
}

/// A session together with the authentication that presents it.
#[derive(Debug, Clone)]
struct ActiveSession {
    handle: SessionHandle,
    authentication: AuthenticationMethod,
    generation: u64,
}

/// Client for a Web Security Service.
///
/// Obtains a session with the configured [`AuthenticationMethod`], wraps
/// service requests in `DoService` envelopes and renews the session once
/// when the WSS answers with an exception report.
///
/// The client is safe to share between tasks. Requests run concurrently
/// against the current session; establishing or replacing a session is
/// serialized, so concurrent callers never open more than one.
///
/// # Example
///
/// ```rust,no_run
/// use wss_service::{DcpType, WssClient};
/// use wss_auth::AuthenticationMethod;
///
/// # async fn example() -> wss_service::Result<()> {
/// let client = WssClient::new("https://wss.example.org/wss")?;
/// client.get_session(AuthenticationMethod::password("alice", "s3cret")).await?;
///
/// let map = client
///     .do_service(
///         DcpType::HttpGet,
///         "SERVICE=WMS&REQUEST=GetCapabilities",
///         "http://example.org/wms",
///     )
///     .await?;
/// println!("{}", map.as_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WssClient {
    http: WssHttpClient,
    wss_url: Option<String>,
    retry: RetryConfig,
    state: RwLock<SessionState>,
    capabilities: RwLock<Option<Capabilities>>,
}

impl WssClient {
    /// Client for `wss_url` with default transport settings.
    pub fn new(wss_url: impl Into<String>) -> Result<Self> {
        Self::with_config(wss_url, ClientConfig::default())
    }

    /// Client for `wss_url` with custom transport settings.
    pub fn with_config(wss_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let mut client = Self::unconfigured(config)?;
        client.wss_url = Some(wss_url.into());
        Ok(client)
    }

    /// Client for `wss_url` reached through an HTTP proxy.
    pub fn with_proxy(wss_url: impl Into<String>, proxy_host: impl Into<String>, proxy_port: u16) -> Result<Self> {
        Self::with_config(
            wss_url,
            ClientConfig::builder().with_proxy(proxy_host, proxy_port).build(),
        )
    }

    /// Client without a WSS URL. Operations fail with `NotConfigured` until
    /// [`set_wss`](Self::set_wss) is called.
    pub fn unconfigured(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: WssHttpClient::new(config)?,
            wss_url: None,
            retry: RetryConfig::default(),
            state: RwLock::new(SessionState::default()),
            capabilities: RwLock::new(None),
        })
    }

    /// Client built from a [`WssConfig`].
    pub fn from_config(config: WssConfig) -> Result<Self> {
        let mut client = Self::with_config(config.wss_url, config.client)?;
        client.retry = config.retry;
        client.state.get_mut().configured = config.authentication;
        Ok(client)
    }

    /// Set the session renewal budget used by `DoService`.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The configured WSS URL.
    pub fn wss_url(&self) -> Option<&str> {
        self.wss_url.as_deref()
    }

    /// The transport configuration in use.
    pub fn client_config(&self) -> &ClientConfig {
        self.http.config()
    }

    /// Point the client at another WSS.
    ///
    /// For `https` URLs the cached session and capabilities are dropped, as
    /// they belong to the previous host. Certificate validation follows
    /// [`ClientConfig::accept_invalid_certs`].
    pub fn set_wss(&mut self, wss_url: impl Into<String>) -> Result<()> {
        let wss_url = wss_url.into();
        let parsed = url::Url::parse(&wss_url).map_err(|e| {
            error!(error = %e, "Malformed WSS URL");
            Error::from(e)
        })?;
        self.wss_url = Some(wss_url);

        if parsed.scheme() != "https" {
            return Ok(());
        }

        if self.http.config().accept_invalid_certs {
            warn!(host = parsed.host_str(), "Certificates of this WSS are not validated");
        }
        self.state.get_mut().clear();
        *self.capabilities.get_mut() = None;
        Ok(())
    }

    /// Route requests through `proxy`, or connect directly when `None`.
    pub fn set_proxy(&mut self, proxy: Option<ProxyConfig>) -> Result<()> {
        let mut config = self.http.config().clone();
        config.proxy = proxy;
        self.http = WssHttpClient::new(config)?;
        Ok(())
    }

    /// Send HTTP basic credentials with every request, or none when `None`.
    pub fn set_credential_provider(&mut self, credentials: Option<BasicAuth>) -> Result<()> {
        let mut config = self.http.config().clone();
        config.basic_auth = credentials;
        self.http = WssHttpClient::new(config)?;
        Ok(())
    }

    /// Replace the method used for future sessions without contacting the WSS.
    pub async fn set_authentication_method(&self, method: AuthenticationMethod) {
        self.state.write().await.configured = method;
    }

    /// The method used for future sessions.
    pub async fn authentication_method(&self) -> AuthenticationMethod {
        self.state.read().await.configured.clone()
    }

    /// Returns true if a session is currently held.
    pub async fn is_session_available(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    /// The session currently held, if any.
    pub async fn current_session(&self) -> Option<SessionHandle> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|active| active.handle.clone())
    }

    /// Open a session with `method`, which also becomes the configured method.
    ///
    /// Replaces any session held so far without closing it.
    #[instrument(skip_all, fields(method = method.kind_name()))]
    pub async fn get_session(&self, method: AuthenticationMethod) -> Result<SessionHandle> {
        let wss_url = self.require_url()?;
        let mut state = self.state.write().await;
        state.configured = method;
        let handle = self.request_session(wss_url, &state.configured).await?;
        Ok(state.install(handle).handle)
    }

    /// Close the session currently held. Does nothing without one.
    pub async fn close_session(&self) -> Result<()> {
        let wss_url = self.require_url()?;
        let mut state = self.state.write().await;
        match state.clear() {
            Some(active) => self.close_on_server(wss_url, &active.handle).await,
            None => {
                debug!("No session to close");
                Ok(())
            }
        }
    }

    /// Close the given session. It is forgotten if it is the one currently held.
    pub async fn close_session_handle(&self, handle: &SessionHandle) -> Result<()> {
        let wss_url = self.require_url()?;
        {
            let mut state = self.state.write().await;
            if state.session.as_ref().is_some_and(|active| active.handle.id() == handle.id()) {
                state.clear();
            }
        }
        self.close_on_server(wss_url, handle).await
    }

    /// Tunnel a request with the default `HTTP_Header: Mime-Type: text/xml` parameter.
    pub async fn do_service(&self, dcp_type: DcpType, request: &str, facade_url: &str) -> Result<Payload> {
        self.do_service_with_params(dcp_type, request, &RequestParameter::defaults(), facade_url)
            .await
    }

    /// Tunnel a request to the secured service.
    ///
    /// Opens a session first if none is held. When the WSS answers with an
    /// exception report the session is replaced and the request repeated,
    /// up to the configured renewal budget; after that the report is
    /// returned as [`ErrorKind::ServiceFailure`]. Transport failures are
    /// never retried.
    #[instrument(skip_all, fields(dcp = %dcp_type, facade_url = %facade_url))]
    pub async fn do_service_with_params(
        &self,
        dcp_type: DcpType,
        request: &str,
        parameters: &[RequestParameter],
        facade_url: &str,
    ) -> Result<Payload> {
        let wss_url = self.require_url()?;
        let mut retry = RetryPolicy::new(self.retry);
        let mut session = self
            .active_session(wss_url)
            .await
            .map_err(Error::into_service_failure)?;

        loop {
            let payload = self
                .send_do_service(wss_url, dcp_type, request, parameters, facade_url, &session)
                .await?;

            if !payload.contains_exception() {
                return Ok(payload);
            }

            if !retry.record_attempt() {
                warn!(attempts = retry.attempt() + 1, "doService failed again, giving up");
                return Err(Error::new(ErrorKind::ServiceFailure(
                    payload.as_text().to_string(),
                )));
            }

            info!(attempt = retry.attempt(), "doService failed, renewing session");
            session = self
                .renew_session(wss_url, &session)
                .await
                .map_err(Error::into_service_failure)?;
        }
    }

    /// Authentication method URNs the WSS advertises. Empty when the
    /// capabilities cannot be fetched or parsed.
    pub async fn supported_authentication_methods(&self) -> Vec<String> {
        self.capabilities()
            .await
            .map(|capabilities| capabilities.supported_authentication_methods)
            .unwrap_or_default()
    }

    /// Fetch and parse the capabilities document.
    ///
    /// The result is cached for [`secured_service_type`](Self::secured_service_type).
    #[instrument(skip(self))]
    pub async fn capabilities(&self) -> Option<Capabilities> {
        let wss_url = match self.require_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Cannot fetch capabilities");
                return None;
            }
        };

        let request = self
            .http
            .get(wss_url)
            .query("SERVICE", "WSS")
            .query("REQUEST", "GetCapabilities");
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                info!(error = %e, "Could not perform GetCapabilities");
                return None;
            }
        };

        match Capabilities::parse(Payload::from(response).as_text()) {
            Ok(capabilities) => {
                *self.capabilities.write().await = Some(capabilities.clone());
                Some(capabilities)
            }
            Err(e) => {
                info!(error = %e, "Could not parse capabilities");
                None
            }
        }
    }

    /// Type of the secured service, from cached capabilities or a fresh fetch.
    pub async fn secured_service_type(&self) -> Option<String> {
        let cached = self.capabilities.read().await.clone();
        let capabilities = match cached {
            Some(capabilities) => Some(capabilities),
            None => self.capabilities().await,
        };

        let service_type = capabilities.and_then(|c| c.secured_service_type);
        if service_type.is_none() {
            warn!("Capabilities do not name a secured service type");
        }
        service_type
    }

    fn require_url(&self) -> Result<&str> {
        self.wss_url
            .as_deref()
            .ok_or_else(|| Error::new(ErrorKind::NotConfigured))
    }

    /// Snapshot the current session, opening one if none is held.
    async fn active_session(&self, wss_url: &str) -> Result<ActiveSession> {
        let snapshot = self.state.read().await.session.clone();
        if let Some(active) = snapshot {
            return Ok(active);
        }

        let mut state = self.state.write().await;
        // another caller may have opened one while we waited
        if let Some(active) = state.session.clone() {
            return Ok(active);
        }
        debug!("No session held, authenticating");
        let handle = self.request_session(wss_url, &state.configured).await?;
        Ok(state.install(handle))
    }

    /// Replace `stale` with a fresh session, unless another caller already did.
    async fn renew_session(&self, wss_url: &str, stale: &ActiveSession) -> Result<ActiveSession> {
        let mut state = self.state.write().await;
        if let Some(current) = &state.session {
            if current.generation != stale.generation {
                debug!("Session already renewed by another request");
                return Ok(current.clone());
            }
        }

        if let Some(old) = state.clear() {
            if let Err(e) = self.close_on_server(wss_url, &old.handle).await {
                debug!(error = %e, "Closing the stale session failed");
            }
        }

        let handle = self.request_session(wss_url, &state.configured).await?;
        Ok(state.install(handle))
    }

    async fn request_session(&self, wss_url: &str, method: &AuthenticationMethod) -> Result<SessionHandle> {
        info!(method = %method.description(), "Requesting session");

        let mut fields: Vec<(&str, &str)> = method.as_name_value().to_vec();
        fields.extend([("SERVICE", "WSS"), ("VERSION", "1.0"), ("REQUEST", "GetSession")]);

        let response = self
            .http
            .execute(self.http.post(format!("{}?", wss_url)).form(fields))
            .await
            .map_err(|e| {
                error!(error = %e, "GetSession request failed");
                Error::with_source(
                    ErrorKind::AuthenticationFailed(format!("GetSession request failed: {}", e)),
                    e,
                )
            })?;

        let payload = Payload::from(response);
        if payload.contains_exception() {
            return Err(Error::new(ErrorKind::AuthenticationFailed(
                payload.as_text().to_string(),
            )));
        }

        let handle = SessionHandle::new(payload.as_text());
        if !handle.is_valid() {
            return Err(Error::new(ErrorKind::AuthenticationFailed(
                "SessionID is empty or invalid".to_string(),
            )));
        }

        info!(id_len = handle.id().len(), "Session established");
        Ok(handle)
    }

    /// `CloseSession` for `handle`. I/O failures are logged and ignored; any
    /// other failure to issue the request is a [`ErrorKind::ServiceFailure`].
    async fn close_on_server(&self, wss_url: &str, handle: &SessionHandle) -> Result<()> {
        let request = self.http.post(format!("{}?", wss_url)).form([
            ("SERVICE", "WSS"),
            ("REQUEST", "CloseSession"),
            ("SESSIONID", handle.id()),
        ]);

        match self.http.execute(request).await {
            Ok(response) => {
                let payload = Payload::from(response);
                if payload.contains_exception() {
                    error!("CloseSession was answered with an exception report");
                    return Err(Error::new(ErrorKind::ServiceFailure(
                        payload.as_text().to_string(),
                    )));
                }
            }
            Err(e) if e.is_io() => info!(error = %e, "Could not perform CloseSession"),
            Err(e) => {
                return Err(Error::with_source(
                    ErrorKind::ServiceFailure(format!("Could not perform CloseSession: {}", e)),
                    e,
                ));
            }
        }

        debug!("Session closed");
        Ok(())
    }

    async fn send_do_service(
        &self,
        wss_url: &str,
        dcp_type: DcpType,
        request: &str,
        parameters: &[RequestParameter],
        facade_url: &str,
        session: &ActiveSession,
    ) -> Result<Payload> {
        let request = format!("{}&sessionID={}", request, session.handle.id());
        let envelope = build_do_service(
            dcp_type,
            &request,
            &session.authentication,
            parameters,
            facade_url,
        )?;

        let url = match dcp_type {
            DcpType::HttpGet => format!("{}?", wss_url),
            DcpType::HttpPost => wss_url.to_string(),
        };

        let response = self
            .http
            .execute(self.http.post(url).xml(envelope))
            .await
            .map_err(|e| {
                error!(error = %e, "doService request failed");
                Error::with_source(
                    ErrorKind::ServiceFailure(format!("doService request failed: {}", e)),
                    e,
                )
            })?;

        Ok(Payload::from(response))
    }
}
