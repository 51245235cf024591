//! Google Geocoding API client.
//!
//! Only the borough is extracted from the response: the
//! `sublocality_level_1` component for addresses in the five boroughs,
//! falling back to the county (`administrative_area_level_2`).
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use async_trait::async_trait;
use plate_lookup_violation_models::Borough;

use crate::address::clean_ticket_address;
use crate::{BoroughGeocoder, GeocodeError, borough_from_place_name};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Address component types that name a borough, in preference order.
const BOROUGH_COMPONENT_TYPES: &[&str] = &[
    "sublocality_level_1",
    "sublocality",
    "administrative_area_level_2",
];

/// Geocodes ticket addresses through the Google Geocoding API.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads the key from [`API_KEY_ENV`]. Returns `None` when it is unset
    /// or empty, which disables geocoding.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    /// Points the client at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl BoroughGeocoder for GoogleGeocoder {
    async fn borough(&self, address: &str) -> Result<Option<Borough>, GeocodeError> {
        let Some(query) = clean_ticket_address(address).query() else {
            log::debug!("not geocodable: {address:?}");
            return Ok(None);
        };

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("address", query.as_str()),
                ("components", "administrative_area:NY|country:US"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        let borough = parse_response(&body)?;
        log::debug!("geocoded {query:?} to {borough:?}");
        Ok(borough)
    }
}

/// Parses a Geocoding API response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Borough>, GeocodeError> {
    match body["status"].as_str() {
        Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(None),
        Some("OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT") => return Err(GeocodeError::RateLimited),
        other => {
            return Err(GeocodeError::Parse {
                message: format!(
                    "geocoder status {other:?}: {}",
                    body["error_message"].as_str().unwrap_or("no message")
                ),
            });
        }
    }

    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };
    let components = first["address_components"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing address_components in geocoder response".to_string(),
        })?;

    for &wanted in BOROUGH_COMPONENT_TYPES {
        let found = components.iter().find_map(|component| {
            let has_type = component["types"]
                .as_array()
                .is_some_and(|types| types.iter().any(|t| t.as_str() == Some(wanted)));
            if !has_type {
                return None;
            }
            component["long_name"]
                .as_str()
                .and_then(borough_from_place_name)
        });
        if found.is_some() {
            return Ok(found);
        }
    }

    Ok(None)
}
