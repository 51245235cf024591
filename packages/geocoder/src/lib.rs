#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borough geocoding for parking ticket addresses.
//!
//! Ticket records usually name their borough through a county code or a
//! precinct number. When neither is usable, the street address is sent to
//! a [`BoroughGeocoder`]. The production implementation is
//! [`google::GoogleGeocoder`]; [`NullGeocoder`] disables the fallback.
//!
//! Also provides address cleaning for the abbreviations ticket agents use
//! (`"F/O 123 MAIN ST"`, `"E 14 ST @ 3 AVE"`).

pub mod address;
pub mod google;

use async_trait::async_trait;
use plate_lookup_violation_models::Borough;
use thiserror::Error;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves a street address to the borough it lies in.
#[async_trait]
pub trait BoroughGeocoder: Send + Sync {
    /// Returns `Ok(None)` when the address cannot be placed in a borough.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider request fails.
    async fn borough(&self, address: &str) -> Result<Option<Borough>, GeocodeError>;
}

/// A geocoder that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeocoder;

#[async_trait]
impl BoroughGeocoder for NullGeocoder {
    async fn borough(&self, _address: &str) -> Result<Option<Borough>, GeocodeError> {
        Ok(None)
    }
}

/// Maps a place name from a geocoder response to a borough.
///
/// Accepts borough names and their county names, with or without a
/// trailing `"County"`.
#[must_use]
pub fn borough_from_place_name(name: &str) -> Option<Borough> {
    let name = name.trim();
    let name = name.strip_suffix(" County").unwrap_or(name);
    match name.to_ascii_lowercase().as_str() {
        "manhattan" | "new york" => Some(Borough::Manhattan),
        "brooklyn" | "kings" => Some(Borough::Brooklyn),
        "bronx" | "the bronx" => Some(Borough::Bronx),
        "queens" => Some(Borough::Queens),
        "staten island" | "richmond" => Some(Borough::StatenIsland),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_borough_and_county_names() {
        assert_eq!(borough_from_place_name("Brooklyn"), Some(Borough::Brooklyn));
        assert_eq!(
            borough_from_place_name("Kings County"),
            Some(Borough::Brooklyn)
        );
        assert_eq!(borough_from_place_name("The Bronx"), Some(Borough::Bronx));
        assert_eq!(
            borough_from_place_name("Richmond County"),
            Some(Borough::StatenIsland)
        );
        assert_eq!(borough_from_place_name("Hoboken"), None);
    }

    #[tokio::test]
    async fn null_geocoder_resolves_nothing() {
        assert!(
            NullGeocoder
                .borough("1 Centre St")
                .await
                .unwrap()
                .is_none()
        );
    }
}
