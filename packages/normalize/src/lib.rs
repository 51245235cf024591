#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization of raw open-data records into canonical [`Violation`]s.
//!
//! [`normalize`] maps one [`RawViolation`] from either schema family into
//! a [`Violation`] carrying a single provenance entry. [`dedup`] then
//! collapses records of the same summons reported by several tables, and
//! [`borough::fill_missing_boroughs`] geocodes whatever the county and
//! precinct tables could not place.

pub mod borough;
pub mod dedup;
pub mod descriptions;
pub mod fines;
pub mod time;

use plate_lookup_source_models::{FiscalYearRecord, OpacvRecord, RawViolation};
use plate_lookup_violation_models::{FromDatabase, Violation};
use thiserror::Error;

pub use dedup::merge_violations;

/// Errors raised while normalizing a record.
///
/// Any of these is fatal for the lookup: a misread time or description
/// would miscount fines and streaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Violation time in neither `HHMM[AP]` nor `HH:MM[AP]` form.
    #[error("Unexpected time format: {value}")]
    UnexpectedTimeFormat {
        /// The offending value.
        value: String,
    },

    /// Issue date in neither `YYYY-MM-DD...` nor `MM/DD/YYYY` form.
    #[error("Unexpected date format: {value}")]
    UnexpectedDateFormat {
        /// The offending value.
        value: String,
    },

    /// No definition of the code was in effect on the issue date.
    #[error("Unrecognized time period for fiscal year violation description: {code}")]
    UnrecognizedTimePeriod {
        /// Code or raw description that failed to resolve.
        code: String,
    },
}

/// Normalizes one raw record from the table described by `source`.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the issue date, violation time or
/// description cannot be interpreted.
pub fn normalize(raw: RawViolation, source: &FromDatabase) -> Result<Violation, NormalizeError> {
    let mut violation = match raw {
        RawViolation::FiscalYear(record) => from_fiscal_year(record)?,
        RawViolation::Opacv(record) => from_opacv(record)?,
    };

    violation.borough = borough::resolve_static(
        violation.violation_county.as_deref(),
        violation.violation_precinct.as_deref(),
    );
    fines::apply_fines(&mut violation);
    violation.from_databases = vec![source.clone()];

    Ok(violation)
}

fn from_fiscal_year(record: FiscalYearRecord) -> Result<Violation, NormalizeError> {
    let mut violation = Violation::new(record.summons_number);
    let at = apply_timestamp(
        &mut violation,
        record.issue_date,
        record.violation_time,
    )?;

    let resolved = match (&record.violation_code, &record.violation_description) {
        (Some(code), _) if !code.trim().is_empty() => descriptions::resolve_code(code, at)?,
        (_, Some(description)) => descriptions::resolve_raw_description(description, at)?,
        _ => None,
    };

    violation.violation_code = resolved
        .map(|r| r.code.to_string())
        .or_else(|| non_empty(record.violation_code));
    violation.humanized_description = resolved.map(|r| r.humanized.to_string());
    violation.raw_description = non_empty(record.violation_description);

    violation.plate_id = non_empty(record.plate_id);
    violation.registration_state = non_empty(record.registration_state);
    violation.plate_type = non_empty(record.plate_type);
    violation.violation_county = non_empty(record.violation_county);
    violation.violation_precinct = non_empty(record.violation_precinct);
    violation.violation_location = non_empty(record.violation_location);
    violation.house_number = non_empty(record.house_number);
    violation.street_name = non_empty(record.street_name);
    violation.intersecting_street = non_empty(record.intersecting_street);
    violation.issuing_agency = non_empty(record.issuing_agency);
    violation.vehicle_body_type = non_empty(record.vehicle_body_type);
    violation.vehicle_make = non_empty(record.vehicle_make);
    violation.vehicle_color = non_empty(record.vehicle_color);
    violation.vehicle_year = non_empty(record.vehicle_year);

    Ok(violation)
}

fn from_opacv(record: OpacvRecord) -> Result<Violation, NormalizeError> {
    let mut violation = Violation::new(record.summons_number);
    let at = apply_timestamp(
        &mut violation,
        record.issue_date,
        record.violation_time,
    )?;

    let resolved = match record.violation.as_deref() {
        Some(description) if !description.trim().is_empty() => {
            descriptions::resolve_raw_description(description, at)?
        }
        _ => None,
    };
    violation.violation_code = resolved.map(|r| r.code.to_string());
    violation.humanized_description = resolved.map(|r| r.humanized.to_string());
    violation.raw_description = non_empty(record.violation);

    violation.plate_id = non_empty(record.plate);
    violation.registration_state = non_empty(record.state);
    violation.plate_type = non_empty(record.license_type);
    violation.violation_county = non_empty(record.county);
    violation.violation_precinct = non_empty(record.precinct);
    violation.issuing_agency = non_empty(record.issuing_agency);

    violation.fine_amount = fines::parse_amount(record.fine_amount.as_deref());
    violation.penalty_amount = fines::parse_amount(record.penalty_amount.as_deref());
    violation.interest_amount = fines::parse_amount(record.interest_amount.as_deref());
    violation.reduction_amount = fines::parse_amount(record.reduction_amount.as_deref());
    violation.payment_amount = fines::parse_amount(record.payment_amount.as_deref());
    violation.amount_due = fines::parse_amount(record.amount_due.as_deref());

    violation.violation_status = non_empty(record.violation_status);
    violation.judgment_entry_date = non_empty(record.judgment_entry_date);
    violation.summons_image_url = record.summons_image.and_then(|image| non_empty(image.url));

    Ok(violation)
}

/// Sets the raw and derived time fields. Returns the local timestamp used
/// for description resolution, `None` when the record has no issue date.
fn apply_timestamp(
    violation: &mut Violation,
    issue_date: Option<String>,
    violation_time: Option<String>,
) -> Result<Option<chrono::NaiveDateTime>, NormalizeError> {
    let issue_date = non_empty(issue_date);
    let violation_time = non_empty(violation_time);

    let parsed = issue_date
        .as_deref()
        .map(|date| time::parse_timestamp(date, violation_time.as_deref()))
        .transpose()?;

    violation.issue_date = issue_date;
    violation.violation_time = violation_time;
    if let Some(parsed) = parsed {
        violation.formatted_time = Some(parsed.local);
        violation.formatted_time_eastern = Some(parsed.eastern);
        violation.formatted_time_utc = Some(parsed.utc);
    }

    Ok(parsed.map(|p| p.local))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use plate_lookup_source_models::SummonsImage;
    use plate_lookup_violation_models::Borough;
    use plate_lookup_violation_models::descriptions::{
        MOBILE_BUS_LANE_CAMERA, NO_STANDING_SNOW_EMERGENCY, SCHOOL_ZONE_SPEED_CAMERA,
    };

    use super::*;

    fn source(name: &str) -> FromDatabase {
        FromDatabase {
            endpoint: format!("https://data.cityofnewyork.us/resource/{name}.json"),
            name: name.to_string(),
            data_updated_at: None,
        }
    }

    fn fiscal_year(code: &str, date: &str) -> RawViolation {
        RawViolation::FiscalYear(FiscalYearRecord {
            summons_number: "1477633194".to_string(),
            plate_id: Some("GTR1234".to_string()),
            registration_state: Some("NY".to_string()),
            plate_type: Some("PAS".to_string()),
            issue_date: Some(date.to_string()),
            violation_code: Some(code.to_string()),
            violation_description: Some("RAW TEXT".to_string()),
            violation_time: Some("0911A".to_string()),
            violation_county: Some("K".to_string()),
            ..FiscalYearRecord::default()
        })
    }

    #[test]
    fn normalizes_fiscal_year_record() {
        let v = normalize(fiscal_year("21", "2023-06-09T00:00:00.000"), &source("fy")).unwrap();

        assert_eq!(v.summons_number, "1477633194");
        assert_eq!(v.plate_id.as_deref(), Some("GTR1234"));
        assert_eq!(v.violation_code.as_deref(), Some("21"));
        assert_eq!(
            v.humanized_description.as_deref(),
            Some("No Parking - Street Cleaning")
        );
        assert_eq!(v.raw_description.as_deref(), Some("RAW TEXT"));
        assert_eq!(v.borough, Some(Borough::Brooklyn));
        assert_eq!(
            v.formatted_time_eastern.map(|t| t.to_rfc3339()).as_deref(),
            Some("2023-06-09T09:11:00-04:00")
        );
        assert_eq!(v.fined, None);
        assert_eq!(v.from_databases, vec![source("fy")]);
    }

    #[test]
    fn code_12_resolves_by_issue_date() {
        let before = normalize(fiscal_year("12", "2019-12-05T00:00:00.000"), &source("fy")).unwrap();
        let after = normalize(fiscal_year("12", "2019-12-06T00:00:00.000"), &source("fy")).unwrap();

        assert_eq!(
            before.humanized_description.as_deref(),
            Some(NO_STANDING_SNOW_EMERGENCY)
        );
        assert_eq!(
            after.humanized_description.as_deref(),
            Some(MOBILE_BUS_LANE_CAMERA)
        );
    }

    #[test]
    fn bad_time_fails_the_record() {
        let RawViolation::FiscalYear(mut record) = fiscal_year("21", "2023-06-09T00:00:00.000")
        else {
            unreachable!()
        };
        record.violation_time = Some("123A".to_string());

        let err = normalize(RawViolation::FiscalYear(record), &source("fy")).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected time format: 123A");
    }

    #[test]
    fn unknown_code_keeps_raw_text() {
        let v = normalize(fiscal_year("54", "2023-06-09T00:00:00.000"), &source("fy")).unwrap();
        assert_eq!(v.violation_code.as_deref(), Some("54"));
        assert_eq!(v.humanized_description, None);
        assert_eq!(v.raw_description.as_deref(), Some("RAW TEXT"));
    }

    #[test]
    fn normalizes_opacv_record() {
        let raw = RawViolation::Opacv(OpacvRecord {
            summons_number: "4715634610".to_string(),
            plate: Some("GTR1234".to_string()),
            state: Some("NY".to_string()),
            license_type: Some("PAS".to_string()),
            issue_date: Some("06/09/2023".to_string()),
            violation_time: Some("09:11A".to_string()),
            violation: Some("PHTO SCHOOL ZN SPEED VIOLATION".to_string()),
            county: Some("BX".to_string()),
            precinct: Some("014".to_string()),
            fine_amount: Some("50".to_string()),
            penalty_amount: Some("25".to_string()),
            payment_amount: Some("0".to_string()),
            amount_due: Some("75".to_string()),
            violation_status: Some("HEARING HELD-GUILTY".to_string()),
            summons_image: Some(SummonsImage {
                url: Some("http://example.test/img".to_string()),
                description: None,
            }),
            ..OpacvRecord::default()
        });

        let v = normalize(raw, &source("opacv")).unwrap();

        assert_eq!(v.plate_type.as_deref(), Some("PAS"));
        assert_eq!(v.violation_code.as_deref(), Some("36"));
        assert_eq!(
            v.humanized_description.as_deref(),
            Some(SCHOOL_ZONE_SPEED_CAMERA)
        );
        assert_eq!(v.borough, Some(Borough::Bronx));
        assert_eq!(v.fined, Some(75.0));
        assert_eq!(v.outstanding, Some(75.0));
        assert_eq!(v.paid, Some(0.0));
        assert_eq!(v.reduced, None);
        assert_eq!(v.violation_status.as_deref(), Some("HEARING HELD-GUILTY"));
        assert_eq!(
            v.summons_image_url.as_deref(),
            Some("http://example.test/img")
        );
    }

    #[test]
    fn missing_issue_date_leaves_times_empty() {
        let raw = RawViolation::Opacv(OpacvRecord {
            summons_number: "1".to_string(),
            violation: Some("FIRE HYDRANT".to_string()),
            ..OpacvRecord::default()
        });

        let v = normalize(raw, &source("opacv")).unwrap();

        assert_eq!(v.formatted_time, None);
        assert_eq!(v.humanized_description.as_deref(), Some("Fire Hydrant"));
    }

    #[test]
    fn undated_record_with_shared_description_normalizes() {
        let raw = RawViolation::Opacv(OpacvRecord {
            summons_number: "1".to_string(),
            violation: Some("NO PARKING-EXC. AUTH. VEHICLE".to_string()),
            ..OpacvRecord::default()
        });

        let v = normalize(raw, &source("opacv")).unwrap();

        assert_eq!(v.violation_code.as_deref(), Some("17"));
        assert_eq!(v.formatted_time, None);
    }

    #[test]
    fn blank_fields_are_absent() {
        let raw = RawViolation::Opacv(OpacvRecord {
            summons_number: "1".to_string(),
            plate: Some("   ".to_string()),
            county: Some(String::new()),
            ..OpacvRecord::default()
        });

        let v = normalize(raw, &source("opacv")).unwrap();

        assert_eq!(v.plate_id, None);
        assert_eq!(v.violation_county, None);
        assert_eq!(v.borough, None);
    }
}
