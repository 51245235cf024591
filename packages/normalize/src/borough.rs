//! Borough resolution.
//!
//! Tried in order, first hit wins:
//!
//! 1. the county code on the ticket,
//! 2. the NYPD precinct,
//! 3. a [`BoroughGeocoder`] on the street address.
//!
//! The first two happen during [`crate::normalize`]; the geocoder runs once
//! per lookup after deduplication through [`fill_missing_boroughs`].

use std::collections::HashMap;

use plate_lookup_geocoder::BoroughGeocoder;
use plate_lookup_violation_models::{Borough, Violation};

/// Maps a ticket county code to its borough.
#[must_use]
pub fn county_borough(county: &str) -> Option<Borough> {
    match county.trim().to_ascii_uppercase().as_str() {
        "BX" | "BRONX" => Some(Borough::Bronx),
        "K" | "BK" | "KINGS" | "BROOKLYN" => Some(Borough::Brooklyn),
        "NY" | "MN" | "MAN" | "MANHATTAN" => Some(Borough::Manhattan),
        "Q" | "QN" | "QNS" | "QUEEN" | "QUEENS" => Some(Borough::Queens),
        "R" | "RICH" | "RICHMOND" | "ST" | "SI" => Some(Borough::StatenIsland),
        _ => None,
    }
}

/// Maps an NYPD precinct number to its borough.
#[must_use]
pub fn precinct_borough(precinct: &str) -> Option<Borough> {
    match precinct.trim().parse::<u32>().ok()? {
        1..=34 => Some(Borough::Manhattan),
        40..=52 => Some(Borough::Bronx),
        60..=94 => Some(Borough::Brooklyn),
        100..=115 => Some(Borough::Queens),
        120..=123 => Some(Borough::StatenIsland),
        _ => None,
    }
}

/// Resolves a borough from the county code, then the precinct.
#[must_use]
pub fn resolve_static(county: Option<&str>, precinct: Option<&str>) -> Option<Borough> {
    county
        .and_then(county_borough)
        .or_else(|| precinct.and_then(precinct_borough))
}

/// Geocodes the address of every violation that has no borough yet.
///
/// Each distinct address is geocoded at most once. Geocoder failures leave
/// the borough unresolved. Returns how many violations were resolved.
pub async fn fill_missing_boroughs(
    violations: &mut [Violation],
    geocoder: &dyn BoroughGeocoder,
) -> usize {
    let mut memo: HashMap<String, Option<Borough>> = HashMap::new();
    let mut resolved = 0;

    for violation in violations.iter_mut().filter(|v| v.borough.is_none()) {
        let Some(address) = violation.street_address() else {
            continue;
        };

        let borough = if let Some(cached) = memo.get(&address) {
            *cached
        } else {
            let borough = match geocoder.borough(&address).await {
                Ok(borough) => borough,
                Err(e) => {
                    log::debug!("geocoding {address:?} failed: {e}");
                    None
                }
            };
            memo.insert(address, borough);
            borough
        };

        if borough.is_some() {
            violation.borough = borough;
            resolved += 1;
        }
    }

    if !memo.is_empty() {
        log::debug!(
            "geocoded {} distinct addresses, resolved {resolved} violations",
            memo.len()
        );
    }

    resolved
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use plate_lookup_geocoder::GeocodeError;

    use super::*;

    #[test]
    fn county_wins_over_precinct() {
        assert_eq!(resolve_static(Some("BX"), Some("75")), Some(Borough::Bronx));
    }

    #[test]
    fn precinct_used_when_county_unknown() {
        assert_eq!(
            resolve_static(Some("??"), Some("075")),
            Some(Borough::Brooklyn)
        );
        assert_eq!(resolve_static(None, Some("122")), Some(Borough::StatenIsland));
    }

    #[test]
    fn unknown_precincts_are_unresolved() {
        assert_eq!(precinct_borough("0"), None);
        assert_eq!(precinct_borough("35"), None);
        assert_eq!(precinct_borough("abc"), None);
        assert_eq!(resolve_static(None, None), None);
    }

    #[test]
    fn county_codes() {
        assert_eq!(county_borough("k"), Some(Borough::Brooklyn));
        assert_eq!(county_borough("NY"), Some(Borough::Manhattan));
        assert_eq!(county_borough("QNS"), Some(Borough::Queens));
        assert_eq!(county_borough("R"), Some(Borough::StatenIsland));
        assert_eq!(county_borough(""), None);
    }

    struct CountingGeocoder {
        calls: AtomicUsize,
        answer: Result<Option<Borough>, ()>,
    }

    #[async_trait]
    impl BoroughGeocoder for CountingGeocoder {
        async fn borough(&self, _address: &str) -> Result<Option<Borough>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.map_err(|()| GeocodeError::RateLimited)
        }
    }

    fn at(street: &str) -> Violation {
        let mut v = Violation::new(street);
        v.street_name = Some(street.to_string());
        v
    }

    #[tokio::test]
    async fn geocodes_each_address_once() {
        let geocoder = CountingGeocoder {
            calls: AtomicUsize::new(0),
            answer: Ok(Some(Borough::Queens)),
        };
        let mut placed = at("BROADWAY");
        placed.borough = Some(Borough::Manhattan);
        let mut violations = vec![at("QUEENS BLVD"), at("QUEENS BLVD"), placed, Violation::new("x")];

        let resolved = fill_missing_boroughs(&mut violations, &geocoder).await;

        assert_eq!(resolved, 2);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(violations[0].borough, Some(Borough::Queens));
        assert_eq!(violations[1].borough, Some(Borough::Queens));
        assert_eq!(violations[2].borough, Some(Borough::Manhattan));
        assert_eq!(violations[3].borough, None);
    }

    #[tokio::test]
    async fn geocoder_failure_leaves_borough_empty() {
        let geocoder = CountingGeocoder {
            calls: AtomicUsize::new(0),
            answer: Err(()),
        };
        let mut violations = vec![at("MAIN ST")];

        assert_eq!(fill_missing_boroughs(&mut violations, &geocoder).await, 0);
        assert_eq!(violations[0].borough, None);
    }
}
