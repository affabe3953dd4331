use std::path::Path;

use serde::Deserialize;

use crate::domain::SaveError;

pub const DEFAULT_REVOKE_TIMEOUT_MS: u64 = 40_000;

/// Defaults applied to every save call unless overridden per call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SaverConfig {
    /// Prepend a UTF-8 BOM to text and XML payloads.
    pub auto_bom: bool,
    /// Delay before a temporary object reference is released.
    pub revoke_timeout_ms: u64,
    /// Delay before the synthetic click is dispatched.
    pub click_delay_ms: u64,
    pub open_in_new_tab: bool,
    pub disable_click: bool,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            auto_bom: false,
            revoke_timeout_ms: DEFAULT_REVOKE_TIMEOUT_MS,
            click_delay_ms: 0,
            open_in_new_tab: false,
            disable_click: false,
        }
    }
}

impl SaverConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, SaveError> {
        toml::from_str(raw).map_err(|e| SaveError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SaveError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SaveError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }
}
