//! Zoneshift — keeps the OS timezone in sync with the current GPS position.
//!
//! Pipeline, leaves first: a position source samples coordinates, the
//! resolver turns them into an IANA zone id, the translation table maps that
//! to the OS's native zone key, and the applier commits the change — only on
//! a real mismatch, under a briefly-held elevated privilege, with observers
//! notified afterward. The poller drives the pipeline on a fixed interval and
//! contains every failure to the cycle it happened in.

pub mod adapter;
pub mod apply;
pub mod config;
pub mod logger;
pub mod notify;
pub mod poller;
pub mod position;
pub mod resolver;
pub mod translate;

pub use adapter::{NativeZoneKey, OsTimezoneAdapter};
pub use apply::{ApplyError, ApplyOutcome, TimezoneApplier};
pub use config::Settings;
pub use logger::EventLog;
pub use poller::{CycleOutcome, PollerHandle, ZonePoller};
pub use position::{GeoPosition, PositionSource};
pub use resolver::{Resolution, ZoneResolver};
