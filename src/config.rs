//! Settings store at ~/.zoneshift/config.json.
//!
//! Read once at startup. A malformed or out-of-range file is replaced by
//! validated defaults, and the repaired settings are written back — the only
//! write this crate ever makes to the store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default recheck interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Runtime settings, constructed once at startup and passed explicitly into
/// the poller. No process-wide mutable state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Recheck interval in seconds.
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,
    /// Whether event logging is on.
    #[serde(default = "default_log_events")]
    pub log_events: bool,
}

fn default_refresh() -> u64 {
    DEFAULT_REFRESH_SECS
}

fn default_log_events() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_secs: DEFAULT_REFRESH_SECS,
            log_events: true,
        }
    }
}

impl Settings {
    /// Load from the default location (~/.zoneshift/config.json).
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path (for testing and --config).
    ///
    /// Missing file → defaults, nothing written. Unreadable, unparseable, or
    /// invalid file → defaults, persisted back so the next start reads a
    /// well-formed store.
    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str::<Settings>(&data) {
            Ok(settings) if settings.is_valid() => settings,
            _ => {
                let repaired = Self::default();
                repaired.persist(path);
                repaired
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.refresh_secs > 0
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".zoneshift")
            .join("config.json")
    }

    /// Write settings to disk. Best-effort; a failed persist only means the
    /// repair happens again next start.
    pub fn persist(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, json);
        }
    }
}
