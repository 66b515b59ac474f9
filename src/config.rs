//! Startup configuration.
//!
//! Loaded once from TOML when the process starts:
//!
//! ```toml
//! log_level = "info"
//! builtin_plugins = true
//!
//! [[plugins]]
//! name = "tensorflow"
//! description = "Injects TF_CONFIG"
//! ```

use crate::core::error::AdmissionResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Admission gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdmissionConfig {
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// Whether the built-in job plugins are registered.
    pub builtin_plugins: bool,
    /// Extra plugins to register.
    pub plugins: Vec<PluginConfig>,
}

/// A plugin declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Plugin name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl AdmissionConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> AdmissionResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> AdmissionResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            builtin_plugins: true,
            plugins: Vec::new(),
        }
    }
}
