//! Profile configuration
//!
//! PDU connection profiles live in a TOML file, one table per device:
//!
//! ```toml
//! [lab]
//! host = "192.0.2.10"
//! username = "admin"
//! password = "secret"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pdu_core::{PduError, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for one PDU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Network address of the device (`host` or `host:port`)
    pub host: String,
    /// Digest username
    pub username: String,
    /// Digest password
    pub password: String,
}

/// All profiles from one configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Profiles {
    profiles: HashMap<String, Profile>,
}

impl Profiles {
    /// Load profiles from `path`, or from the default location when
    /// no explicit path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| PduError::Config(format!("cannot read {}: {e}", path.display())))?;

        Self::parse(&content)
    }

    /// Parse profiles from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PduError::Config(e.to_string()))
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Fails with [`PduError::ProfileNotFound`] for unknown names.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| PduError::ProfileNotFound(name.to_string()))
    }

    /// Names of all configured profiles, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Default configuration file path.
///
/// `$XDG_CONFIG_HOME/pductl/config.toml` when the variable is set,
/// else `$HOME/.config/pductl/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        return Err(PduError::Config(
            "cannot determine config directory".to_string(),
        ));
    };

    Ok(config_dir.join("pductl").join("config.toml"))
}
