//! Coordinate → IANA zone resolution.
//!
//! Resolution flow: no-fix short-circuit → geographic lookup service →
//! validate the returned id against the tz database. No caching — each call
//! is independent and side-effect-free; identical coordinates just resolve
//! identically again.

use crate::position::GeoPosition;
use chrono_tz::Tz;
use std::fmt;

/// The geographic lookup boundary: coordinates in, IANA id out.
pub trait ZoneLookup: Send {
    fn lookup(&self, lat: f64, lon: f64) -> Result<String, LookupError>;
}

/// Failure of the lookup service itself (network down, dataset absent).
#[derive(Debug, Clone)]
pub enum LookupError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid lookup response: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No GPS fix this cycle — benign, the cycle is skipped.
    NoFix,
    /// The position resolved to this zone.
    Zone(Tz),
}

/// Resolution failure.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// The lookup service failed.
    Lookup(LookupError),
    /// The service answered with something that is not an IANA zone id.
    UnknownZone(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup(e) => write!(f, "zone lookup failed: {}", e),
            Self::UnknownZone(id) => write!(f, "lookup returned unknown zone id '{}'", id),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves a sampled position to an IANA zone.
pub struct ZoneResolver {
    lookup: Box<dyn ZoneLookup>,
}

impl ZoneResolver {
    pub fn new(lookup: Box<dyn ZoneLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve a position. A no-fix position returns `Resolution::NoFix`
    /// without touching the lookup service.
    pub fn resolve(&self, position: &GeoPosition) -> Result<Resolution, ResolveError> {
        if !position.has_fix() {
            return Ok(Resolution::NoFix);
        }

        let id = self
            .lookup
            .lookup(position.latitude, position.longitude)
            .map_err(ResolveError::Lookup)?;

        let tz: Tz = id.parse().map_err(|_| ResolveError::UnknownZone(id))?;
        Ok(Resolution::Zone(tz))
    }
}

// ─── HTTP lookup service ────────────────────────────────────────

/// Coordinate → timezone via timeapi.io. Free, no key, answers in well under
/// the 3 second timeout when healthy.
pub struct HttpZoneLookup {
    timeout: std::time::Duration,
}

impl HttpZoneLookup {
    pub fn new() -> Self {
        Self { timeout: std::time::Duration::from_secs(3) }
    }
}

impl Default for HttpZoneLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneLookup for HttpZoneLookup {
    fn lookup(&self, lat: f64, lon: f64) -> Result<String, LookupError> {
        let url = format!(
            "https://www.timeapi.io/api/timezone/coordinate?latitude={}&longitude={}",
            lat, lon
        );

        let response = ureq::get(&url)
            .set("User-Agent", "zoneshift/0.2")
            .timeout(self.timeout)
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let val: serde_json::Value = response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        val.get("timeZone")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LookupError::InvalidResponse("no timeZone field".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedLookup {
        answer: Result<String, LookupError>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedLookup {
        fn answering(id: &str) -> Self {
            Self { answer: Ok(id.to_string()), calls: Arc::new(AtomicUsize::new(0)) }
        }

        fn failing() -> Self {
            Self {
                answer: Err(LookupError::Network("dataset absent".into())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ZoneLookup for ScriptedLookup {
        fn lookup(&self, _lat: f64, _lon: f64) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn test_no_fix_skips_lookup_entirely() {
        let lookup = ScriptedLookup::answering("Europe/Paris");
        let calls = lookup.calls.clone();
        let resolver = ZoneResolver::new(Box::new(lookup));

        let result = resolver.resolve(&GeoPosition::new(0.0, 0.0)).unwrap();
        assert_eq!(result, Resolution::NoFix);
        // The lookup service was never consulted.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolves_paris() {
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup::answering("Europe/Paris")));
        let result = resolver.resolve(&GeoPosition::new(48.8566, 2.3522)).unwrap();
        assert_eq!(result, Resolution::Zone(chrono_tz::Europe::Paris));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup::answering("Europe/London")));
        let pos = GeoPosition::new(51.5074, -0.1278);
        let first = resolver.resolve(&pos).unwrap();
        let second = resolver.resolve(&pos).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup::failing()));
        let err = resolver.resolve(&GeoPosition::new(48.8566, 2.3522)).unwrap_err();
        assert!(matches!(err, ResolveError::Lookup(LookupError::Network(_))));
    }

    #[test]
    fn test_unknown_zone_id_rejected() {
        let resolver = ZoneResolver::new(Box::new(ScriptedLookup::answering("Mars/Olympus_Mons")));
        let err = resolver.resolve(&GeoPosition::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownZone(id) if id == "Mars/Olympus_Mons"));
    }
}
