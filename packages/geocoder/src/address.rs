//! Address cleaning for parking ticket locations.
//!
//! Ticket agents record locations in many shapes:
//! - Plain addresses: `"123 MAIN ST"`
//! - With position prefixes: `"F/O 123 MAIN ST"`, `"N/S W 34 ST"`
//! - Intersections: `"E 14 ST @ 3 AVE"`, `"BROADWAY & W 4 ST"`
//! - Placeholders: `"UNKNOWN"`, `"N/A"`
//!
//! This module normalizes these into a query suitable for geocoding.

use regex::Regex;
use std::sync::LazyLock;

/// Position prefixes: front of, opposite, north side, and so on.
static POSITION_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:F/O|I/F/O|IFO|O/S|[NSEW]/S|C/O|OPP|OPPOSITE|REAR OF|FRONT OF)\s+")
        .expect("valid regex")
});

/// Regex for direction abbreviations at the end of a fragment.
static DIRECTION_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(EB|WB|NB|SB)$").expect("valid regex"));

/// Runs of whitespace.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Non-geocodable address patterns.
static SKIP_PATTERNS: &[&str] = &[
    "UNKNOWN",
    "N/A",
    "NA",
    "NONE",
    "NOT AVAILABLE",
    "UNDETERMINED",
];

/// Result of cleaning a ticket address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanedAddress {
    /// A street address suitable for geocoding.
    Street(String),
    /// An intersection of two streets.
    Intersection {
        /// First street.
        street1: String,
        /// Second street.
        street2: String,
    },
    /// The address is not geocodable (empty, unknown, garbage).
    NotGeocodable,
}

impl CleanedAddress {
    /// One-line geocoder query scoped to New York City, or `None` if the
    /// address is not geocodable.
    #[must_use]
    pub fn query(&self) -> Option<String> {
        match self {
            Self::Street(street) => Some(format!("{street}, New York, NY")),
            Self::Intersection { street1, street2 } => {
                Some(format!("{street1} & {street2}, New York, NY"))
            }
            Self::NotGeocodable => None,
        }
    }
}

/// Cleans and normalizes a ticket address for geocoding.
#[must_use]
pub fn clean_ticket_address(raw: &str) -> CleanedAddress {
    let addr = WHITESPACE_RE
        .replace_all(raw.trim(), " ")
        .to_uppercase();

    if addr.is_empty() || SKIP_PATTERNS.iter().any(|p| addr == *p) {
        return CleanedAddress::NotGeocodable;
    }

    let addr = POSITION_PREFIX_RE.replace(&addr, "").to_string();

    for sep in [" @ ", " & ", " / ", " AND ", " AT "] {
        if let Some(idx) = addr.find(sep) {
            let street1 = strip_direction(&addr[..idx]);
            let street2 = strip_direction(&addr[idx + sep.len()..]);
            if !street1.is_empty() && !street2.is_empty() {
                return CleanedAddress::Intersection { street1, street2 };
            }
        }
    }

    let addr = strip_direction(&addr);
    if addr.is_empty() {
        return CleanedAddress::NotGeocodable;
    }

    CleanedAddress::Street(addr)
}

fn strip_direction(fragment: &str) -> String {
    DIRECTION_SUFFIX_RE
        .replace_all(fragment.trim(), "")
        .trim()
        .to_string()
}
