//! HTTP client for a PDU's relay REST interface.

use pdu_core::{api, Outlet, PduError, Result};
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::digest::{DigestAuth, DigestChallenge};

/// Normalize a profile host into a base URL.
///
/// PDU firmware serves plain HTTP by default; a bare `host` or
/// `host:port` gets the `http://` scheme, while an explicit scheme is
/// kept as-is.
fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// HTTP client for one PDU's relay REST API.
///
/// The client binds a base URL and a Digest credential pair. It holds
/// no outlet state: every operation is a single request/response
/// round trip against the device, and queries always reflect what the
/// device reports at that moment.
///
/// There is no retry logic and no configured timeout; a command either
/// completes, fails with a [`PduError::Remote`] carrying the device's
/// status and body, or fails with [`PduError::Transport`].
///
/// # Examples
///
/// ```no_run
/// use pductl::client::PduClient;
///
/// # async fn example() -> pdu_core::Result<()> {
/// let client = PduClient::new("192.0.2.10", "admin", "secret")?;
/// let index = client.resolve_outlet("pump").await?;
/// client.turn_on(index).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PduClient {
    client: Client,
    base_url: String,
    auth: DigestAuth,
}

impl PduClient {
    /// Create a client for the device at `host` with Digest credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(host: &str, username: &str, password: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            api::CSRF_HEADER,
            header::HeaderValue::from_static(api::CSRF_VALUE),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("pductl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PduError::transport)?;

        Ok(Self {
            client,
            base_url: base_url(host),
            auth: DigestAuth::new(username, password),
        })
    }

    fn request(&self, method: &Method, url: &str, body: Option<bool>) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method.clone(), url);
        if let Some(state) = body {
            request = request.json(&state);
        }
        request
    }

    /// Send one request, answering a Digest challenge at most once.
    ///
    /// The first attempt goes out unauthenticated; a `401` carrying a
    /// Digest challenge is answered with a freshly computed
    /// `Authorization` header and the request is re-issued. Any other
    /// `401` is handed back to the caller unchanged.
    async fn send(&self, method: Method, path: &str, body: Option<bool>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "request");

        let response = self
            .request(&method, &url, body)
            .send()
            .await
            .map_err(PduError::transport)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(challenge) = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
        else {
            return Ok(response);
        };

        let challenge = DigestChallenge::parse(&challenge)?;
        debug!(realm = %challenge.realm, algorithm = challenge.algorithm.label(), "answering digest challenge");
        let authorization = self.auth.authorization(&challenge, method.as_str(), path);

        self.request(&method, &url, body)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(PduError::transport)
    }

    /// Parse a successful response body as JSON.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(PduError::transport)?;

        if !status.is_success() {
            return Err(PduError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Require a successful status, discarding the body.
    async fn ensure_success(response: Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PduError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Set an outlet's configured state.
    ///
    /// # Errors
    ///
    /// Fails with [`PduError::Remote`] when the device answers with a
    /// non-success status.
    pub async fn set_state(&self, index: usize, on: bool) -> Result<()> {
        let response = self
            .send(Method::PUT, &api::outlet_state_path(index), Some(on))
            .await?;
        Self::ensure_success(response).await
    }

    /// Switch an outlet on.
    pub async fn turn_on(&self, index: usize) -> Result<()> {
        self.set_state(index, true).await
    }

    /// Switch an outlet off.
    pub async fn turn_off(&self, index: usize) -> Result<()> {
        self.set_state(index, false).await
    }

    /// Power-cycle an outlet.
    ///
    /// Returns as soon as the device acknowledges the command; the
    /// cycle itself completes on the device after its configured
    /// delay, without this client waiting or polling.
    pub async fn cycle(&self, index: usize) -> Result<()> {
        let response = self
            .send(Method::POST, &api::outlet_cycle_path(index), None)
            .await?;
        Self::ensure_success(response).await
    }

    /// The outlet's configured (setpoint) state.
    pub async fn configured_state(&self, index: usize) -> Result<bool> {
        let response = self
            .send(Method::GET, &api::outlet_state_path(index), None)
            .await?;
        Self::read_json(response).await
    }

    /// The outlet's observed real-world state.
    ///
    /// May disagree with [`configured_state`](Self::configured_state),
    /// e.g. mid-cycle or when the relay hardware fails to respond.
    pub async fn physical_state(&self, index: usize) -> Result<bool> {
        let response = self
            .send(Method::GET, &api::outlet_physical_state_path(index), None)
            .await?;
        Self::read_json(response).await
    }

    /// All outlets, in device order (index = position in the result).
    pub async fn list_outlets(&self) -> Result<Vec<Outlet>> {
        let response = self.send(Method::GET, api::OUTLETS_PATH, None).await?;
        Self::read_json(response).await
    }

    /// Resolve an outlet argument to its numeric index.
    ///
    /// A numeric token is taken verbatim as the index without any
    /// network traffic, even when an outlet carries that number as its
    /// name. Anything else must exactly match one outlet name from
    /// [`list_outlets`](Self::list_outlets).
    ///
    /// # Errors
    ///
    /// Fails with [`PduError::OutletNotFound`] when no outlet name
    /// matches.
    pub async fn resolve_outlet(&self, token: &str) -> Result<usize> {
        if let Ok(index) = token.parse::<usize>() {
            return Ok(index);
        }

        let outlets = self.list_outlets().await?;
        outlets
            .iter()
            .position(|outlet| outlet.name == token)
            .ok_or_else(|| PduError::OutletNotFound(token.to_string()))
    }
}
