#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical violation record shared across the plate lookup system.
//!
//! Every open-data table (fiscal-year parking tables and the Open Parking
//! and Camera Violations table) is normalized into a [`Violation`]. The
//! same physical ticket seen in several tables collapses into one
//! [`Violation`] whose [`Violation::from_databases`] lists every source.

pub mod descriptions;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five boroughs of New York City.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum Borough {
    /// The Bronx (Bronx County)
    Bronx,
    /// Brooklyn (Kings County)
    Brooklyn,
    /// Manhattan (New York County)
    Manhattan,
    /// Queens (Queens County)
    Queens,
    /// Staten Island (Richmond County)
    StatenIsland,
}

impl Borough {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Bronx,
            Self::Brooklyn,
            Self::Manhattan,
            Self::Queens,
            Self::StatenIsland,
        ]
    }
}

/// Automated camera programs whose violations count toward streaks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraViolationKind {
    /// School zone speed camera
    SchoolZoneSpeed,
    /// Red light camera
    RedLight,
    /// Bus lane camera (fixed or bus-mounted)
    BusLane,
}

/// Provenance entry recording one open-data table that reported a
/// violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromDatabase {
    /// Full resource URL of the table.
    pub endpoint: String,
    /// Human-readable table name.
    pub name: String,
    /// When the table's data was last refreshed, if the metadata said so.
    pub data_updated_at: Option<DateTime<Utc>>,
}

/// A parking or camera violation normalized to the canonical schema.
///
/// Optional fields are `None` when no source table supplied them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Ticket identifier, unique across all tables.
    pub summons_number: String,

    /// Plate as recorded on the ticket.
    pub plate_id: Option<String>,
    /// DMV plate type (e.g. `PAS`, `COM`, `OMT`).
    pub plate_type: Option<String>,
    /// Two-letter registration state.
    pub registration_state: Option<String>,

    /// Issue date exactly as the source reported it.
    pub issue_date: Option<String>,
    /// Violation time exactly as the source reported it.
    pub violation_time: Option<String>,
    /// Wall-clock issue time in New York.
    pub formatted_time: Option<NaiveDateTime>,
    /// Issue time with the `America/New_York` offset applied.
    pub formatted_time_eastern: Option<DateTime<FixedOffset>>,
    /// Issue time in UTC.
    pub formatted_time_utc: Option<DateTime<Utc>>,

    /// Violation code (fiscal-year tables only).
    pub violation_code: Option<String>,
    /// Raw description text from the source.
    pub raw_description: Option<String>,
    /// Human-readable description resolved for the issue date.
    pub humanized_description: Option<String>,

    /// Street number.
    pub house_number: Option<String>,
    /// Street name.
    pub street_name: Option<String>,
    /// Cross street.
    pub intersecting_street: Option<String>,
    /// Free-form location text.
    pub violation_location: Option<String>,
    /// County code as reported (e.g. `BX`, `K`, `NY`).
    pub violation_county: Option<String>,
    /// NYPD precinct as reported.
    pub violation_precinct: Option<String>,
    /// Resolved borough.
    pub borough: Option<Borough>,

    /// Agency that issued the ticket.
    pub issuing_agency: Option<String>,
    /// Vehicle body type.
    pub vehicle_body_type: Option<String>,
    /// Vehicle make.
    pub vehicle_make: Option<String>,
    /// Vehicle color.
    pub vehicle_color: Option<String>,
    /// Vehicle model year.
    pub vehicle_year: Option<String>,

    /// Base fine.
    pub fine_amount: Option<f64>,
    /// Late penalty.
    pub penalty_amount: Option<f64>,
    /// Interest accrued.
    pub interest_amount: Option<f64>,
    /// Reduction granted.
    pub reduction_amount: Option<f64>,
    /// Amount paid.
    pub payment_amount: Option<f64>,
    /// Amount still owed.
    pub amount_due: Option<f64>,

    /// `fine + penalty + interest` over whichever of the three are known.
    /// `None` when none of them are known.
    pub fined: Option<f64>,
    /// Amount outstanding.
    pub outstanding: Option<f64>,
    /// Amount paid.
    pub paid: Option<f64>,
    /// Amount reduced.
    pub reduced: Option<f64>,

    /// Adjudication status (OPACV only).
    pub violation_status: Option<String>,
    /// Date a judgment was entered (OPACV only).
    pub judgment_entry_date: Option<String>,
    /// Link to the scanned summons (OPACV only).
    pub summons_image_url: Option<String>,

    /// Every table that reported this summons, in first-seen order.
    pub from_databases: Vec<FromDatabase>,
}

impl Violation {
    /// Creates a violation with only its summons number set.
    #[must_use]
    pub fn new(summons_number: impl Into<String>) -> Self {
        Self {
            summons_number: summons_number.into(),
            plate_id: None,
            plate_type: None,
            registration_state: None,
            issue_date: None,
            violation_time: None,
            formatted_time: None,
            formatted_time_eastern: None,
            formatted_time_utc: None,
            violation_code: None,
            raw_description: None,
            humanized_description: None,
            house_number: None,
            street_name: None,
            intersecting_street: None,
            violation_location: None,
            violation_county: None,
            violation_precinct: None,
            borough: None,
            issuing_agency: None,
            vehicle_body_type: None,
            vehicle_make: None,
            vehicle_color: None,
            vehicle_year: None,
            fine_amount: None,
            penalty_amount: None,
            interest_amount: None,
            reduction_amount: None,
            payment_amount: None,
            amount_due: None,
            fined: None,
            outstanding: None,
            paid: None,
            reduced: None,
            violation_status: None,
            judgment_entry_date: None,
            summons_image_url: None,
            from_databases: Vec::new(),
        }
    }

    /// Which camera program issued this violation, if any.
    #[must_use]
    pub fn camera_kind(&self) -> Option<CameraViolationKind> {
        descriptions::camera_kind(self.humanized_description.as_deref()?)
    }

    /// Best-available street address for geocoding.
    ///
    /// Prefers `house number + street`, then `street & cross street`, then
    /// the free-form location text.
    #[must_use]
    pub fn street_address(&self) -> Option<String> {
        let street = self.street_name.as_deref().filter(|s| !s.trim().is_empty());
        let house = self.house_number.as_deref().filter(|s| !s.trim().is_empty());
        let cross = self
            .intersecting_street
            .as_deref()
            .filter(|s| !s.trim().is_empty());

        match (house, street, cross) {
            (Some(house), Some(street), _) => Some(format!("{} {}", house.trim(), street.trim())),
            (None, Some(street), Some(cross)) => {
                Some(format!("{} & {}", street.trim(), cross.trim()))
            }
            (None, Some(street), None) => Some(street.trim().to_string()),
            _ => self
                .violation_location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }

    /// Folds another record of the same summons into this one.
    ///
    /// Values already present on `self` win; `other` only fills gaps.
    /// Provenance entries are appended unless the same endpoint is already
    /// listed.
    pub fn absorb(&mut self, other: Self) {
        debug_assert_eq!(self.summons_number, other.summons_number);

        fill(&mut self.plate_id, other.plate_id);
        fill(&mut self.plate_type, other.plate_type);
        fill(&mut self.registration_state, other.registration_state);
        fill(&mut self.issue_date, other.issue_date);
        fill(&mut self.violation_time, other.violation_time);
        fill(&mut self.formatted_time, other.formatted_time);
        fill(&mut self.formatted_time_eastern, other.formatted_time_eastern);
        fill(&mut self.formatted_time_utc, other.formatted_time_utc);
        fill(&mut self.violation_code, other.violation_code);
        fill(&mut self.raw_description, other.raw_description);
        fill(&mut self.humanized_description, other.humanized_description);
        fill(&mut self.house_number, other.house_number);
        fill(&mut self.street_name, other.street_name);
        fill(&mut self.intersecting_street, other.intersecting_street);
        fill(&mut self.violation_location, other.violation_location);
        fill(&mut self.violation_county, other.violation_county);
        fill(&mut self.violation_precinct, other.violation_precinct);
        fill(&mut self.borough, other.borough);
        fill(&mut self.issuing_agency, other.issuing_agency);
        fill(&mut self.vehicle_body_type, other.vehicle_body_type);
        fill(&mut self.vehicle_make, other.vehicle_make);
        fill(&mut self.vehicle_color, other.vehicle_color);
        fill(&mut self.vehicle_year, other.vehicle_year);
        fill(&mut self.fine_amount, other.fine_amount);
        fill(&mut self.penalty_amount, other.penalty_amount);
        fill(&mut self.interest_amount, other.interest_amount);
        fill(&mut self.reduction_amount, other.reduction_amount);
        fill(&mut self.payment_amount, other.payment_amount);
        fill(&mut self.amount_due, other.amount_due);
        fill(&mut self.fined, other.fined);
        fill(&mut self.outstanding, other.outstanding);
        fill(&mut self.paid, other.paid);
        fill(&mut self.reduced, other.reduced);
        fill(&mut self.violation_status, other.violation_status);
        fill(&mut self.judgment_entry_date, other.judgment_entry_date);
        fill(&mut self.summons_image_url, other.summons_image_url);

        for source in other.from_databases {
            if !self
                .from_databases
                .iter()
                .any(|existing| existing.endpoint == source.endpoint)
            {
                self.from_databases.push(source);
            }
        }
    }
}

/// Sets `slot` to `value` only if `slot` is empty.
fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(endpoint: &str) -> FromDatabase {
        FromDatabase {
            endpoint: endpoint.to_string(),
            name: endpoint.to_string(),
            data_updated_at: None,
        }
    }

    #[test]
    fn absorb_fills_gaps_without_overwriting() {
        let mut first = Violation::new("1234");
        first.plate_id = Some("ABC1234".to_string());
        first.violation_county = Some("BX".to_string());
        first.from_databases.push(source("fy"));

        let mut second = Violation::new("1234");
        second.plate_id = Some("XYZ".to_string());
        second.fine_amount = Some(65.0);
        second.from_databases.push(source("opacv"));

        first.absorb(second);

        assert_eq!(first.plate_id.as_deref(), Some("ABC1234"));
        assert_eq!(first.violation_county.as_deref(), Some("BX"));
        assert_eq!(first.fine_amount, Some(65.0));
        assert_eq!(first.from_databases.len(), 2);
        assert_eq!(first.from_databases[1].endpoint, "opacv");
    }

    #[test]
    fn absorb_never_blanks_existing_values() {
        let mut first = Violation::new("1");
        first.street_name = Some("BROADWAY".to_string());

        first.absorb(Violation::new("1"));

        assert_eq!(first.street_name.as_deref(), Some("BROADWAY"));
    }

    #[test]
    fn absorb_skips_repeated_endpoint() {
        let mut first = Violation::new("1");
        first.from_databases.push(source("fy"));
        let mut again = Violation::new("1");
        again.from_databases.push(source("fy"));

        first.absorb(again);

        assert_eq!(first.from_databases.len(), 1);
    }

    #[test]
    fn street_address_prefers_house_number() {
        let mut v = Violation::new("1");
        v.house_number = Some("100".to_string());
        v.street_name = Some("W 42ND ST".to_string());
        v.intersecting_street = Some("6TH AVE".to_string());
        assert_eq!(v.street_address().as_deref(), Some("100 W 42ND ST"));
    }

    #[test]
    fn street_address_uses_cross_street() {
        let mut v = Violation::new("1");
        v.street_name = Some("W 42ND ST".to_string());
        v.intersecting_street = Some("6TH AVE".to_string());
        assert_eq!(v.street_address().as_deref(), Some("W 42ND ST & 6TH AVE"));
    }

    #[test]
    fn street_address_falls_back_to_location() {
        let mut v = Violation::new("1");
        v.violation_location = Some(" 0014 ".to_string());
        assert_eq!(v.street_address().as_deref(), Some("0014"));
        assert!(Violation::new("2").street_address().is_none());
    }

    #[test]
    fn borough_display_is_title_case() {
        assert_eq!(Borough::StatenIsland.to_string(), "Staten Island");
        assert_eq!(Borough::Bronx.to_string(), "Bronx");
    }

    #[test]
    fn violation_serializes_camel_case() {
        let mut v = Violation::new("99");
        v.from_databases.push(source("fy"));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["summonsNumber"], "99");
        assert_eq!(json["fromDatabases"][0]["endpoint"], "fy");
        assert!(json["fined"].is_null());
    }
}
