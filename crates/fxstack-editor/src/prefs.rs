//! Persistent editor preferences.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fxstack_core::fs::atomic_write_json;
use fxstack_core::{FxStackError, Result};
use serde::{Deserialize, Serialize};

/// User preferences read by the filter stack editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPrefs {
    /// Show the compositing notice when an alpha filter is added.
    pub show_alpha_info_message: bool,
    /// Property poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Keep polling for writes that bypass the editor.
    pub poll_fallback: bool,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self {
            show_alpha_info_message: true,
            poll_interval_ms: 1000,
            poll_fallback: true,
        }
    }
}

impl EditorPrefs {
    /// Default preferences file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fxstack")
            .join("prefs.json")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Load preferences. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json)
            .map_err(|e| FxStackError::Config(format!("{}: {e}", path.display())))
    }

    /// Save preferences atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        atomic_write_json(path, self)
    }
}
