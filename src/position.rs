//! GPS position model and position sources.
//!
//! The navigation collaborator hands back latitude/longitude as strings; both
//! being exactly zero is the sentinel for "no fix yet", not a real position.

use serde::Deserialize;

/// A sampled GPS position. Transient — produced fresh each poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse from the raw string form the position source supplies.
    /// Unparseable fields collapse to 0.0, which reads as "no fix".
    pub fn from_raw(latitude: &str, longitude: &str) -> Self {
        Self {
            latitude: latitude.trim().parse().unwrap_or(0.0),
            longitude: longitude.trim().parse().unwrap_or(0.0),
        }
    }

    /// `(0,0)` means the receiver has no fix yet. The equator/prime-meridian
    /// intersection is open ocean; treating it as a sentinel is safe here.
    pub fn has_fix(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }

    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Supplies the latest known position once per poll cycle.
///
/// Returning a no-fix position is legitimate and expected; a source that
/// cannot answer at all reports the sentinel rather than an error.
pub trait PositionSource: Send {
    fn current_position(&self) -> GeoPosition;
}

/// Fixed coordinates from the command line. Used for one-shot runs and tests.
pub struct FixedPosition(pub GeoPosition);

impl PositionSource for FixedPosition {
    fn current_position(&self) -> GeoPosition {
        self.0
    }
}

// ─── IP-based position source ───────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Coarse position via IP geolocation. Good enough to pick a timezone when no
/// GPS receiver is wired up.
pub struct IpPositionSource;

impl PositionSource for IpPositionSource {
    fn current_position(&self) -> GeoPosition {
        let response = match ureq::get("https://ipapi.co/json/")
            .set("User-Agent", "zoneshift/0.2")
            .timeout(std::time::Duration::from_secs(5))
            .call()
        {
            Ok(response) => response,
            Err(_) => return GeoPosition::new(0.0, 0.0),
        };

        match response.into_json::<IpApiResult>() {
            Ok(r) => GeoPosition::new(r.latitude.unwrap_or(0.0), r.longitude.unwrap_or(0.0)),
            Err(_) => GeoPosition::new(0.0, 0.0),
        }
    }
}
