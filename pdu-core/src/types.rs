//! Core types for networked PDU outlets

use serde::{Deserialize, Serialize};

/// One relay outlet as reported by the device.
///
/// Outlets are addressed by their zero-based position in the sequence
/// returned by the device; the device never reports an explicit index
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlet {
    /// Operator-assigned outlet name
    pub name: String,
    /// Configured (setpoint) state: the state last requested
    pub state: bool,
    /// Observed real-world state; may lag or disagree with `state`
    pub physical_state: bool,
    /// Power-cycle delay in seconds; `None` means the device default
    #[serde(default)]
    pub cycle_delay: Option<f64>,
}

impl Outlet {
    /// Create a new outlet description.
    pub fn new(name: impl Into<String>, state: bool, physical_state: bool) -> Self {
        Self {
            name: name.into(),
            state,
            physical_state,
            cycle_delay: None,
        }
    }

    /// Whether the configured and observed states currently agree.
    pub fn is_settled(&self) -> bool {
        self.state == self.physical_state
    }
}

/// Render a relay state as the conventional `on`/`off` label.
pub fn on_off(state: bool) -> &'static str {
    if state {
        "on"
    } else {
        "off"
    }
}
