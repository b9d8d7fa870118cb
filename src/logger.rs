//! Append-only event log.
//!
//! Line-oriented, timestamped, gated by the `log_events` setting. Logging is
//! strictly best-effort: a failed write is swallowed, never propagated — the
//! pipeline must keep running even if the log file is gone.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Handle to the event log. Cheap to clone; each write opens the file in
/// append mode so concurrent handles never hold it open across cycles.
#[derive(Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
    enabled: bool,
}

impl EventLog {
    /// A log writing to the given file. `enabled = false` makes every write
    /// a no-op.
    pub fn to_file(path: PathBuf, enabled: bool) -> Self {
        Self { path: Some(path), enabled }
    }

    /// A log mirroring to stderr only (no file configured).
    pub fn to_stderr(enabled: bool) -> Self {
        Self { path: None, enabled }
    }

    /// A log that drops everything.
    pub fn disabled() -> Self {
        Self { path: None, enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one timestamped line. Failures are swallowed.
    pub fn write(&self, msg: &str) {
        if !self.enabled {
            return;
        }
        let line = format!("{} {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), msg);
        match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{}", line);
                }
            }
            None => eprintln!("{}", line),
        }
    }
}
