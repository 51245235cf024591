#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Open-data table definitions and the raw record shapes they return.
//!
//! Two schema families exist: the eleven fiscal-year parking tables share
//! one shape ([`FiscalYearRecord`]) and the Open Parking and Camera
//! Violations table has another ([`OpacvRecord`]). The only field they
//! agree on is the summons number.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which raw schema a table returns.
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
#[strum(serialize_all = "snake_case")]
pub enum SchemaFamily {
    /// One of the "Parking Violations Issued - Fiscal Year" tables
    FiscalYear,
    /// The "Open Parking and Camera Violations" table
    Opacv,
}

impl SchemaFamily {
    /// Query parameter holding the plate.
    #[must_use]
    pub const fn plate_field(self) -> &'static str {
        match self {
            Self::FiscalYear => "plate_id",
            Self::Opacv => "plate",
        }
    }

    /// Query parameter holding the registration state.
    #[must_use]
    pub const fn state_field(self) -> &'static str {
        match self {
            Self::FiscalYear => "registration_state",
            Self::Opacv => "state",
        }
    }

    /// Column holding the plate type, used in `$where` filters.
    #[must_use]
    pub const fn plate_type_field(self) -> &'static str {
        match self {
            Self::FiscalYear => "plate_type",
            Self::Opacv => "license_type",
        }
    }
}

/// A violation table on the open-data portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDefinition {
    /// Unique identifier (e.g., `"fy_2024"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Socrata four-by-four resource identifier (e.g., `"pvqr-7yc4"`).
    pub resource_id: String,
    /// Raw schema returned by this table.
    pub schema: SchemaFamily,
}

/// Dataset metadata from the portal's metadata API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseMetadata {
    /// Resource identifier.
    pub id: String,
    /// Timestamp of the last data refresh, as returned.
    #[serde(default)]
    pub data_updated_at: Option<String>,
    /// Canonical data URI.
    #[serde(default)]
    pub data_uri: Option<String>,
}

/// One grouped row of the medallion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedallionMatch {
    /// DMV plate registered to the medallion.
    #[serde(default, alias = "dmvLicensePlateNumber")]
    pub dmv_license_plate_number: Option<String>,
    /// Most recent `last_updated_date` for that plate.
    #[serde(default, alias = "maxLastUpdatedDate")]
    pub max_last_updated_date: Option<String>,
}

/// A record from a fiscal-year parking table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalYearRecord {
    pub summons_number: String,
    pub plate_id: Option<String>,
    pub registration_state: Option<String>,
    pub plate_type: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS.fff`
    pub issue_date: Option<String>,
    pub violation_code: Option<String>,
    pub violation_description: Option<String>,
    /// `HHMM` followed by `A` or `P`.
    pub violation_time: Option<String>,
    pub violation_county: Option<String>,
    pub violation_precinct: Option<String>,
    pub violation_location: Option<String>,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub intersecting_street: Option<String>,
    pub issuing_agency: Option<String>,
    pub vehicle_body_type: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_color: Option<String>,
    pub vehicle_year: Option<String>,
}

/// Link to the scanned summons image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummonsImage {
    pub url: Option<String>,
    pub description: Option<String>,
}

/// A record from the Open Parking and Camera Violations table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacvRecord {
    pub summons_number: String,
    pub plate: Option<String>,
    pub state: Option<String>,
    pub license_type: Option<String>,
    /// `MM/DD/YYYY`
    pub issue_date: Option<String>,
    /// `HH:MM` followed by `A` or `P`.
    pub violation_time: Option<String>,
    pub violation: Option<String>,
    pub county: Option<String>,
    pub precinct: Option<String>,
    pub issuing_agency: Option<String>,
    pub fine_amount: Option<String>,
    pub penalty_amount: Option<String>,
    pub interest_amount: Option<String>,
    pub reduction_amount: Option<String>,
    pub payment_amount: Option<String>,
    pub amount_due: Option<String>,
    pub violation_status: Option<String>,
    pub judgment_entry_date: Option<String>,
    pub summons_image: Option<SummonsImage>,
}

/// A raw record tagged by the schema family of the table it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawViolation {
    /// Fiscal-year table record.
    FiscalYear(FiscalYearRecord),
    /// OPACV table record.
    Opacv(OpacvRecord),
}

impl RawViolation {
    /// The cross-table join key.
    #[must_use]
    pub fn summons_number(&self) -> &str {
        match self {
            Self::FiscalYear(record) => &record.summons_number,
            Self::Opacv(record) => &record.summons_number,
        }
    }

    /// Schema family of the producing table.
    #[must_use]
    pub const fn schema(&self) -> SchemaFamily {
        match self {
            Self::FiscalYear(_) => SchemaFamily::FiscalYear,
            Self::Opacv(_) => SchemaFamily::Opacv,
        }
    }
}
