//! Test utilities for CLI testing
//!
//! Provides a mock PDU device for integration testing: the five relay
//! REST routes over shared outlet state, the anti-forgery header
//! check, and a real Digest challenge/verify handshake so the client's
//! auth path is exercised end to end.

use anyhow::Result;
use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use pdu_core::{api, Outlet};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::digest::{self, DigestAlgorithm};

/// Realm announced in the mock device's challenges.
pub const MOCK_REALM: &str = "Mock PDU";

/// Fixed server nonce; good enough for a single-process test device.
pub const MOCK_NONCE: &str = "8c2f0e8b11d0f600bfb0c093dcd98b71";

/// Shared state behind the mock device's routes.
#[derive(Debug, Clone)]
pub struct MockPduState {
    /// Outlets in device order
    pub outlets: Arc<Mutex<Vec<Outlet>>>,
    /// Indices that received a cycle command, in arrival order
    pub cycles: Arc<Mutex<Vec<usize>>>,
    /// Number of authorized outlet-list fetches served
    pub list_hits: Arc<Mutex<u32>>,
    /// When set, write endpoints answer with this status instead
    pub fail_with: Arc<Mutex<Option<u16>>>,
    /// Accepted credentials
    pub username: String,
    pub password: String,
}

/// Mock PDU device.
#[derive(Debug)]
pub struct MockPdu {
    state: MockPduState,
    port: u16,
}

impl MockPdu {
    pub const USERNAME: &'static str = "admin";
    pub const PASSWORD: &'static str = "hunter2";

    /// Create a mock device seeded with `outlets`.
    pub fn new(outlets: Vec<Outlet>) -> Self {
        Self {
            state: MockPduState {
                outlets: Arc::new(Mutex::new(outlets)),
                cycles: Arc::new(Mutex::new(Vec::new())),
                list_hits: Arc::new(Mutex::new(0)),
                fail_with: Arc::new(Mutex::new(None)),
                username: Self::USERNAME.to_string(),
                password: Self::PASSWORD.to_string(),
            },
            port: 0,
        }
    }

    /// Start a mock device and return it with its base URL.
    pub async fn start(outlets: Vec<Outlet>) -> Result<(Self, String)> {
        let mut server = Self::new(outlets);
        let app = server.router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        server.port = addr.port();

        let url = format!("http://127.0.0.1:{}", server.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock PDU error: {e}");
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if tokio::net::TcpStream::connect(("127.0.0.1", server.port))
                .await
                .is_ok()
            {
                break;
            }
        }

        Ok((server, url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the device state
    pub fn state(&self) -> &MockPduState {
        &self.state
    }

    /// Make every subsequent write endpoint fail with `status`.
    pub fn fail_writes_with(&self, status: u16) {
        *self.state.fail_with.lock().unwrap() = Some(status);
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/restapi/relay/outlets/", get(outlets_handler))
            .route(
                "/restapi/relay/outlets/:index/state/",
                get(state_handler).put(set_state_handler),
            )
            .route(
                "/restapi/relay/outlets/:index/physical_state/",
                get(physical_state_handler),
            )
            .route("/restapi/relay/outlets/:index/cycle/", post(cycle_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_digest,
            ))
            .with_state(self.state.clone())
    }
}

/// Reject requests without the anti-forgery header, then run the
/// Digest handshake: no/bad `Authorization` earns a 401 challenge.
async fn require_digest(State(state): State<MockPduState>, request: Request, next: Next) -> Response {
    let headers = request.headers();

    if headers
        .get(api::CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        != Some(api::CSRF_VALUE)
    {
        return StatusCode::FORBIDDEN.into_response();
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|value| {
            verify_authorization(
                &state,
                request.method().as_str(),
                request.uri().path(),
                value,
            )
        })
        .unwrap_or(false);

    if !authorized {
        let challenge =
            format!("Digest realm=\"{MOCK_REALM}\", nonce=\"{MOCK_NONCE}\", qop=\"auth\", algorithm=MD5");
        let mut response = StatusCode::UNAUTHORIZED.into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_str(&challenge).unwrap(),
        );
        return response;
    }

    next.run(request).await
}

/// Recompute the expected Digest response for this request and compare.
fn verify_authorization(state: &MockPduState, method: &str, path: &str, header_value: &str) -> bool {
    let Some(params) = header_value.strip_prefix("Digest ") else {
        return false;
    };
    let params: HashMap<String, String> = digest::parse_params(params).into_iter().collect();

    let (Some(username), Some(uri), Some(nonce), Some(response)) = (
        params.get("username"),
        params.get("uri"),
        params.get("nonce"),
        params.get("response"),
    ) else {
        return false;
    };

    if username != &state.username || uri != path || nonce != MOCK_NONCE {
        return false;
    }

    let nc = params
        .get("nc")
        .and_then(|v| u32::from_str_radix(v, 16).ok())
        .unwrap_or(0);
    let cnonce = params.get("cnonce").map(String::as_str).unwrap_or("");
    let qop = params.get("qop").map(String::as_str);

    let expected = digest::compute_response(
        DigestAlgorithm::Md5,
        username,
        MOCK_REALM,
        &state.password,
        nonce,
        nc,
        cnonce,
        qop,
        method,
        uri,
    );

    response == &expected
}

// Handler functions

async fn outlets_handler(State(state): State<MockPduState>) -> Json<Vec<Outlet>> {
    *state.list_hits.lock().unwrap() += 1;
    Json(state.outlets.lock().unwrap().clone())
}

async fn state_handler(
    Path(index): Path<usize>,
    State(state): State<MockPduState>,
) -> Result<Json<bool>, StatusCode> {
    let outlets = state.outlets.lock().unwrap();
    outlets
        .get(index)
        .map(|outlet| Json(outlet.state))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn physical_state_handler(
    Path(index): Path<usize>,
    State(state): State<MockPduState>,
) -> Result<Json<bool>, StatusCode> {
    let outlets = state.outlets.lock().unwrap();
    outlets
        .get(index)
        .map(|outlet| Json(outlet.physical_state))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn set_state_handler(
    Path(index): Path<usize>,
    State(state): State<MockPduState>,
    Json(desired): Json<bool>,
) -> StatusCode {
    if let Some(status) = *state.fail_with.lock().unwrap() {
        return StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let mut outlets = state.outlets.lock().unwrap();
    match outlets.get_mut(index) {
        Some(outlet) => {
            // The mock relay settles instantly
            outlet.state = desired;
            outlet.physical_state = desired;
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn cycle_handler(Path(index): Path<usize>, State(state): State<MockPduState>) -> StatusCode {
    if let Some(status) = *state.fail_with.lock().unwrap() {
        return StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if index >= state.outlets.lock().unwrap().len() {
        return StatusCode::NOT_FOUND;
    }

    // Acknowledge only; the cycle happens on the device's own schedule
    state.cycles.lock().unwrap().push(index);
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlets() -> Vec<Outlet> {
        vec![Outlet::new("lamp", true, true), Outlet::new("pump", false, false)]
    }

    #[tokio::test]
    async fn test_mock_pdu_startup() {
        let (server, url) = MockPdu::start(outlets()).await.unwrap();

        assert!(server.port() > 0);
        assert!(url.contains(&server.port().to_string()));
    }

    // The raw reqwest calls below stick to string header names and
    // numeric status checks: axum speaks http 1.x while reqwest 0.11
    // still speaks http 0.2, and their types don't mix.

    #[tokio::test]
    async fn test_missing_csrf_header_is_forbidden() {
        let (_server, url) = MockPdu::start(outlets()).await.unwrap();

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{url}{}", api::OUTLETS_PATH))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_unauthenticated_request_is_challenged() {
        let (_server, url) = MockPdu::start(outlets()).await.unwrap();

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{url}{}", api::OUTLETS_PATH))
            .header(api::CSRF_HEADER, api::CSRF_VALUE)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let challenge = response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(challenge.starts_with("Digest "));
        assert!(challenge.contains(MOCK_NONCE));
    }

    #[tokio::test]
    async fn test_forged_response_is_rejected() {
        let (_server, url) = MockPdu::start(outlets()).await.unwrap();

        let forged = format!(
            "Digest username=\"{}\", realm=\"{MOCK_REALM}\", nonce=\"{MOCK_NONCE}\", \
             uri=\"{}\", response=\"deadbeef\", algorithm=MD5, qop=auth, nc=00000001, \
             cnonce=\"00\"",
            MockPdu::USERNAME,
            api::OUTLETS_PATH,
        );

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{url}{}", api::OUTLETS_PATH))
            .header(api::CSRF_HEADER, api::CSRF_VALUE)
            .header("authorization", forged)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
    }
}
