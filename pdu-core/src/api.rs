//! REST contract for the PDU relay API
//!
//! Paths and headers assumed by this client, shared with the mock
//! device used in tests. All write endpoints require the anti-forgery
//! header; all endpoints sit behind HTTP Digest authentication.

/// Anti-forgery header name required by the device on every request.
pub const CSRF_HEADER: &str = "X-CSRF";

/// Fixed anti-forgery header value.
pub const CSRF_VALUE: &str = "X";

/// `GET`: enumerate all outlets in device order.
pub const OUTLETS_PATH: &str = "/restapi/relay/outlets/";

/// `GET` returns the configured state; `PUT` with a JSON boolean body
/// sets it.
pub fn outlet_state_path(index: usize) -> String {
    format!("/restapi/relay/outlets/{index}/state/")
}

/// `GET`: the observed real-world state of one outlet.
pub fn outlet_physical_state_path(index: usize) -> String {
    format!("/restapi/relay/outlets/{index}/physical_state/")
}

/// `POST`: trigger a power cycle; the device acknowledges receipt
/// before the cycle completes.
pub fn outlet_cycle_path(index: usize) -> String {
    format!("/restapi/relay/outlets/{index}/cycle/")
}
