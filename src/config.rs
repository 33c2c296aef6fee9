//! Console configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! debuggable = true
//! logger = true
//! tracing_bridge = false
//! ```
//!
//! or from the environment (`CARTRIDGE_COMMON_DEBUGGABLE`,
//! `CARTRIDGE_COMMON_LOGGER`, `CARTRIDGE_COMMON_TRACING`).

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub const ENV_DEBUGGABLE: &str = "CARTRIDGE_COMMON_DEBUGGABLE";
pub const ENV_LOGGER: &str = "CARTRIDGE_COMMON_LOGGER";
pub const ENV_TRACING: &str = "CARTRIDGE_COMMON_TRACING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Install the breakpoint observer; `None` follows the build profile
    pub debuggable: Option<bool>,
    /// Install the default text logger
    pub logger: bool,
    /// Forward events to `tracing`
    pub tracing_bridge: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            debuggable: None,
            logger: true,
            tracing_bridge: false,
        }
    }
}

impl ConsoleConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Defaults overridden by any recognized environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).as_deref().and_then(parse_flag);

        let mut config = ConsoleConfig::default();
        if let Some(debuggable) = flag(ENV_DEBUGGABLE) {
            config.debuggable = Some(debuggable);
        }
        if let Some(logger) = flag(ENV_LOGGER) {
            config.logger = logger;
        }
        if let Some(tracing_bridge) = flag(ENV_TRACING) {
            config.tracing_bridge = tracing_bridge;
        }
        config
    }

    pub fn effective_debuggable(&self) -> bool {
        self.debuggable.unwrap_or(cfg!(debug_assertions))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
