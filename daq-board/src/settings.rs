//! Emulator settings

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings file name, looked up in the working directory
pub const SETTINGS_FILE: &str = "daq-board.json";

/// Emulator settings
///
/// Every field has a default so a partial (or absent) settings file still
/// yields a runnable configuration; only the port has no useful default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Serial port the board is exposed on
    #[serde(default)]
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
    /// Optional board name prefixed to info replies
    #[serde(default)]
    pub board_name: Option<String>,
    /// Channel labels in catalog order
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Settle delay before the READY handshake, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_baud() -> u32 {
    115200
}

fn default_labels() -> Vec<String> {
    (0..6).map(|i| format!("A{i}")).collect()
}

fn default_settle_ms() -> u64 {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud(),
            board_name: None,
            labels: default_labels(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Save settings to `path` as pretty-printed JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
