//! IANA zone id → native (Windows) zone key translation.
//!
//! Hand-curated, many-to-one, and knowingly incomplete: several IANA ids share
//! one native key, and plenty of ids have no entry at all. An unmapped id is
//! an expected, recoverable outcome — it must surface as a distinct miss,
//! never a silent default. The table is data; additions are table edits only.
//!
//! Zone pairings follow the CLDR windowsZones mapping
//! (unicode.org/cldr/charts/latest/supplemental/zone_tzid.html).

use crate::adapter::NativeZoneKey;
use std::fmt;

/// Failure to translate an IANA id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// The id has no entry in the table. Distinct from any OS-side failure.
    UnmappedZone { id: String },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedZone { id } => write!(f, "no native zone key mapped for '{}'", id),
        }
    }
}

impl std::error::Error for TranslationError {}

/// Look up the native zone key for an IANA id.
pub fn translate(id: &str) -> Result<NativeZoneKey, TranslationError> {
    TABLE
        .iter()
        .find(|(iana, _)| *iana == id)
        .map(|(_, native)| NativeZoneKey::from(*native))
        .ok_or_else(|| TranslationError::UnmappedZone { id: id.to_string() })
}

/// Number of table entries.
pub fn table_len() -> usize {
    TABLE.len()
}

const TABLE: &[(&str, &str)] = &[
    ("Africa/Casablanca", "Morocco Standard Time"),
    ("Africa/Windhoek", "Namibia Standard Time"),
    ("Africa/Lagos", "W. Central Africa Standard Time"),
    ("Africa/Johannesburg", "South Africa Standard Time"),
    ("Africa/Nairobi", "E. Africa Standard Time"),
    ("Africa/Cairo", "Egypt Standard Time"),
    ("America/Regina", "Canada Central Standard Time"),
    ("America/Buenos_Aires", "Argentina Standard Time"),
    ("America/Anchorage", "Alaskan Standard Time"),
    ("America/Halifax", "Atlantic Standard Time"),
    ("America/Bahia", "Bahia Standard Time"),
    ("America/Guatemala", "Central America Standard Time"),
    ("America/Cuiaba", "Central Brazilian Standard Time"),
    ("America/Chicago", "Central Standard Time"),
    ("America/Mexico_City", "Central Standard Time (Mexico)"),
    ("America/Godthab", "Greenland Standard Time"),
    ("America/Sao_Paulo", "E. South America Standard Time"),
    ("America/New_York", "Eastern Standard Time"),
    ("America/Denver", "Mountain Standard Time"),
    ("America/Chihuahua", "Mountain Standard Time (Mexico)"),
    ("America/Montevideo", "Montevideo Standard Time"),
    ("America/St_Johns", "Newfoundland Standard Time"),
    ("America/Santiago", "Pacific SA Standard Time"),
    ("America/Los_Angeles", "Pacific Standard Time"),
    ("America/Santa_Isabel", "Pacific Standard Time (Mexico)"),
    ("America/Asuncion", "Paraguay Standard Time"),
    ("America/Cayenne", "SA Eastern Standard Time"),
    ("America/Bogota", "SA Pacific Standard Time"),
    ("America/La_Paz", "SA Western Standard Time"),
    ("America/Caracas", "Venezuela Standard Time"),
    ("America/Indianapolis", "US Eastern Standard Time"),
    ("America/Phoenix", "US Mountain Standard Time"),
    ("Arctic/Longyearbyen", "W. Europe Standard Time"),
    ("Asia/Kabul", "Afghanistan Standard Time"),
    ("Asia/Riyadh", "Arab Standard Time"),
    ("Asia/Baghdad", "Arabic Standard Time"),
    ("Asia/Baku", "Azerbaijan Standard Time"),
    ("Asia/Shanghai", "China Standard Time"),
    ("Asia/Dhaka", "Bangladesh Standard Time"),
    ("Asia/Yerevan", "Caucasus Standard Time"),
    ("Asia/Almaty", "Central Asia Standard Time"),
    ("Asia/Nicosia", "E. Europe Standard Time"),
    ("Asia/Yekaterinburg", "Ekaterinburg Standard Time"),
    ("Asia/Tbilisi", "Georgian Standard Time"),
    ("Asia/Calcutta", "India Standard Time"),
    ("Asia/Kolkata", "India Standard Time"),
    ("Asia/Tehran", "Iran Standard Time"),
    ("Asia/Jerusalem", "Israel Standard Time"),
    ("Asia/Amman", "Jordan Standard Time"),
    ("Asia/Seoul", "Korea Standard Time"),
    ("Asia/Beirut", "Middle East Standard Time"),
    ("Asia/Rangoon", "Myanmar Standard Time"),
    ("Asia/Novosibirsk", "N. Central Asia Standard Time"),
    ("Asia/Katmandu", "Nepal Standard Time"),
    ("Asia/Irkutsk", "North Asia East Standard Time"),
    ("Asia/Krasnoyarsk", "North Asia Standard Time"),
    ("Asia/Karachi", "Pakistan Standard Time"),
    ("Asia/Bangkok", "SE Asia Standard Time"),
    ("Asia/Singapore", "Singapore Standard Time"),
    ("Asia/Colombo", "Sri Lanka Standard Time"),
    ("Asia/Damascus", "Syria Standard Time"),
    ("Asia/Taipei", "Taipei Standard Time"),
    ("Asia/Tokyo", "Tokyo Standard Time"),
    ("Asia/Ulaanbaatar", "Ulaanbaatar Standard Time"),
    ("Asia/Vladivostok", "Vladivostok Standard Time"),
    ("Asia/Tashkent", "West Asia Standard Time"),
    ("Asia/Yakutsk", "Yakutsk Standard Time"),
    ("Atlantic/Azores", "Azores Standard Time"),
    ("Atlantic/Cape_Verde", "Cape Verde Standard Time"),
    ("Atlantic/Reykjavik", "Greenwich Standard Time"),
    ("Australia/Darwin", "AUS Central Standard Time"),
    ("Australia/Adelaide", "Cen. Australia Standard Time"),
    ("Australia/Broken_Hill", "Cen. Australia Standard Time"),
    ("Australia/Brisbane", "E. Australia Standard Time"),
    ("Australia/Sydney", "E. Australia Standard Time"),
    ("Australia/Melbourne", "E. Australia Standard Time"),
    ("Australia/Lindeman", "E. Australia Standard Time"),
    ("Australia/Perth", "W. Australia Standard Time"),
    ("Australia/Hobart", "Tasmania Standard Time"),
    ("Australia/Currie", "Tasmania Standard Time"),
    ("Europe/Budapest", "Central Europe Standard Time"),
    ("Europe/Warsaw", "Central European Standard Time"),
    ("Europe/Tirane", "Central European Standard Time"),
    ("Europe/Prague", "Central European Standard Time"),
    ("Europe/Podgorica", "Central European Standard Time"),
    ("Europe/Belgrade", "Central European Standard Time"),
    ("Europe/Ljubljana", "Central European Standard Time"),
    ("Europe/Bratislava", "Central European Standard Time"),
    ("Europe/Sarajevo", "Central European Standard Time"),
    ("Europe/Zagreb", "Central European Standard Time"),
    ("Europe/Skopje", "Central European Standard Time"),
    ("Europe/Kiev", "FLE Standard Time"),
    ("Europe/Mariehamn", "FLE Standard Time"),
    ("Europe/Sofia", "FLE Standard Time"),
    ("Europe/Tallinn", "FLE Standard Time"),
    ("Europe/Helsinki", "FLE Standard Time"),
    ("Europe/Vilnius", "FLE Standard Time"),
    ("Europe/Riga", "FLE Standard Time"),
    ("Europe/Uzhgorod", "FLE Standard Time"),
    ("Europe/Zaporozhye", "FLE Standard Time"),
    ("Europe/London", "GMT Standard Time"),
    ("Europe/Lisbon", "GMT Standard Time"),
    ("Europe/Guernsey", "GMT Standard Time"),
    ("Europe/Dublin", "GMT Standard Time"),
    ("Europe/Isle_of_Man", "GMT Standard Time"),
    ("Europe/Jersey", "GMT Standard Time"),
    ("Atlantic/Madeira", "GMT Standard Time"),
    ("Europe/Athens", "GTB Standard Time"),
    ("Europe/Bucharest", "GTB Standard Time"),
    ("Europe/Kaliningrad", "Kaliningrad Standard Time"),
    ("Europe/Paris", "Romance Standard Time"),
    ("Europe/Brussels", "Romance Standard Time"),
    ("Europe/Copenhagen", "Romance Standard Time"),
    ("Europe/Madrid", "Romance Standard Time"),
    ("Europe/Moscow", "Russian Standard Time"),
    ("Europe/Simferopol", "Russian Standard Time"),
    ("Europe/Volgograd", "Russian Standard Time"),
    ("Europe/Istanbul", "Turkey Standard Time"),
    ("Europe/Berlin", "W. Europe Standard Time"),
    ("Europe/Andorra", "W. Europe Standard Time"),
    ("Europe/Vienna", "W. Europe Standard Time"),
    ("Europe/Zurich", "W. Europe Standard Time"),
    ("Europe/Busingen", "W. Europe Standard Time"),
    ("Europe/Gibraltar", "W. Europe Standard Time"),
    ("Europe/Rome", "W. Europe Standard Time"),
    ("Europe/Vaduz", "W. Europe Standard Time"),
    ("Europe/Luxembourg", "W. Europe Standard Time"),
    ("Europe/Monaco", "W. Europe Standard Time"),
    ("Europe/Malta", "W. Europe Standard Time"),
    ("Europe/Amsterdam", "W. Europe Standard Time"),
    ("Europe/Oslo", "W. Europe Standard Time"),
    ("Europe/Stockholm", "W. Europe Standard Time"),
    ("Europe/San_Marino", "W. Europe Standard Time"),
    ("Europe/Vatican", "W. Europe Standard Time"),
    ("Indian/Mauritius", "Mauritius Standard Time"),
    ("Pacific/Guadalcanal", "Central Pacific Standard Time"),
    ("Pacific/Fiji", "Fiji Standard Time"),
    ("Pacific/Honolulu", "Hawaiian Standard Time"),
    ("Pacific/Auckland", "New Zealand Standard Time"),
    ("Pacific/Apia", "Samoa Standard Time"),
    ("Pacific/Tongatapu", "Tonga Standard Time"),
    ("Pacific/Port_Moresby", "West Pacific Standard Time"),
    ("Etc/GMT-12", "UTC+12"),
    ("Etc/GMT", "UTC"),
    ("Etc/GMT+2", "UTC-02"),
    ("Etc/GMT+11", "UTC-11"),
    ("Etc/GMT+12", "Dateline Standard Time"),
];
