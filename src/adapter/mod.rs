//! OS timezone adapter boundary.
//!
//! The core never touches an OS API directly: it reads the active zone key,
//! fetches a zone's canonical rule definition, and hands that definition back
//! to the mutator, all through `OsTimezoneAdapter`. The definition payload is
//! opaque to the core — copied verbatim from catalog to mutator, offsets never
//! computed here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(windows)]
pub mod windows;

/// The elevated right required to change the system timezone.
pub const TIME_ZONE_PRIVILEGE: &str = "SeTimeZonePrivilege";

/// Identifier of a timezone in the host OS's own catalog, e.g.
/// `"Romance Standard Time"`. Comparison is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeZoneKey(String);

impl NativeZoneKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NativeZoneKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// A transition date in the OS's own calendar encoding. Opaque payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemDate {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub milliseconds: u16,
}

/// Bias and transition rules for one zone, as the OS catalog stores them.
/// Field mapping is strictly one-to-one between catalog and mutator; the
/// standard and daylight dates are never swapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneRules {
    /// Minutes west of UTC.
    pub bias: i32,
    pub standard_bias: i32,
    pub daylight_bias: i32,
    pub standard_date: SystemDate,
    pub daylight_date: SystemDate,
}

/// The full definition the mutator expects: key, display names, rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDefinition {
    pub key: NativeZoneKey,
    pub standard_name: String,
    pub daylight_name: String,
    pub rules: ZoneRules,
}

/// Adapter failure, carrying the OS-level cause as text.
#[derive(Debug, Clone)]
pub struct AdapterError(pub String);

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AdapterError {}

/// Per-OS timezone access. One implementation per target platform; tests use
/// a scriptable in-memory one.
pub trait OsTimezoneAdapter: Send {
    /// The currently active native zone key.
    fn read_active(&self) -> Result<NativeZoneKey, AdapterError>;

    /// The catalog's canonical definition for `key`. Read-only query,
    /// separate from the mutating call.
    fn fetch_definition(&self, key: &NativeZoneKey) -> Result<ZoneDefinition, AdapterError>;

    /// Atomically make `definition` the active system timezone.
    fn set_active(&self, definition: &ZoneDefinition) -> Result<(), AdapterError>;

    /// Add the named elevated right to the process token.
    fn acquire_privilege(&self, name: &str) -> Result<(), AdapterError>;

    /// Remove the named elevated right from the process token.
    fn release_privilege(&self, name: &str) -> Result<(), AdapterError>;

    /// Tell other OS components that locale settings changed. Best-effort,
    /// bounded wait; the implementation abandons the broadcast on timeout.
    fn broadcast_change(&self) -> Result<(), AdapterError>;
}
