#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for plate lookup analytics.
//!
//! Every type here is an immutable snapshot computed from one lookup's
//! merged violations.

use chrono::{DateTime, Utc};
use plate_lookup_violation_models::CameraViolationKind;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A group of camera violations counted together for streaks.
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
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum StreakCategory {
    /// School zone speed cameras
    SchoolZoneSpeed,
    /// Red light cameras
    RedLight,
    /// Bus lane cameras
    BusLane,
    /// Speed and red light cameras
    AllCamera,
    /// Speed, red light and bus lane cameras
    AllCameraInclBusLane,
}

impl StreakCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SchoolZoneSpeed,
            Self::RedLight,
            Self::BusLane,
            Self::AllCamera,
            Self::AllCameraInclBusLane,
        ]
    }

    /// Whether violations from `kind` count toward this category.
    #[must_use]
    pub const fn includes(self, kind: CameraViolationKind) -> bool {
        match self {
            Self::SchoolZoneSpeed => matches!(kind, CameraViolationKind::SchoolZoneSpeed),
            Self::RedLight => matches!(kind, CameraViolationKind::RedLight),
            Self::BusLane => matches!(kind, CameraViolationKind::BusLane),
            Self::AllCamera => matches!(
                kind,
                CameraViolationKind::SchoolZoneSpeed | CameraViolationKind::RedLight
            ),
            Self::AllCameraInclBusLane => true,
        }
    }
}

/// The busiest 365-day window for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStreak {
    /// Violations in the category, regardless of window.
    pub total: u64,
    /// Most violations inside any `[t, t + 365 days)` window.
    pub max_streak: u64,
    /// First violation of that window.
    pub streak_start: Option<DateTime<Utc>>,
    /// Last violation of that window.
    pub streak_end: Option<DateTime<Utc>>,
}

/// Streaks for every [`StreakCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStreakData {
    pub school_zone_speed: CameraStreak,
    pub red_light: CameraStreak,
    pub bus_lane: CameraStreak,
    pub all_camera: CameraStreak,
    pub all_camera_incl_bus_lane: CameraStreak,
}

impl CameraStreakData {
    #[must_use]
    pub const fn get(&self, category: StreakCategory) -> &CameraStreak {
        match category {
            StreakCategory::SchoolZoneSpeed => &self.school_zone_speed,
            StreakCategory::RedLight => &self.red_light,
            StreakCategory::BusLane => &self.bus_lane,
            StreakCategory::AllCamera => &self.all_camera,
            StreakCategory::AllCameraInclBusLane => &self.all_camera_incl_bus_lane,
        }
    }

    pub const fn get_mut(&mut self, category: StreakCategory) -> &mut CameraStreak {
        match category {
            StreakCategory::SchoolZoneSpeed => &mut self.school_zone_speed,
            StreakCategory::RedLight => &mut self.red_light,
            StreakCategory::BusLane => &mut self.bus_lane,
            StreakCategory::AllCamera => &mut self.all_camera,
            StreakCategory::AllCameraInclBusLane => &mut self.all_camera_incl_bus_lane,
        }
    }
}

/// Money totals across a plate's violations.
///
/// Each total only sums violations where that amount is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineSummary {
    pub fined: f64,
    pub paid: f64,
    pub reduced: f64,
    pub outstanding: f64,
}

/// Count of violations sharing one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    /// Description, borough or year.
    pub label: String,
    /// Number of violations.
    pub count: u64,
}

/// Violation counts grouped three ways. Each list is sorted by count,
/// descending, then by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationBreakdown {
    pub by_description: Vec<LabelCount>,
    pub by_borough: Vec<LabelCount>,
    pub by_year: Vec<LabelCount>,
}

/// Boot/impound statute a plate can qualify under.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Statute {
    /// Dangerous Vehicle Abatement Act
    Dvaa,
    /// Reckless Driving Accountability Act
    Rdaa,
}

/// One threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdCheck {
    pub statute: Statute,
    pub category: StreakCategory,
    /// Violations needed inside one 365-day window.
    pub threshold: u64,
    /// The plate's busiest window for the category.
    pub max_streak: u64,
    pub met: bool,
}

/// Whether a plate meets any boot/impound threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub dvaa_eligible: bool,
    pub rdaa_eligible: bool,
    /// Every comparison made, met or not.
    pub checks: Vec<ThresholdCheck>,
}

impl EligibilityReport {
    /// Whether any statute applies.
    #[must_use]
    pub const fn eligible(&self) -> bool {
        self.dvaa_eligible || self.rdaa_eligible
    }
}
