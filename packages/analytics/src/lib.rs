#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived signals over a plate's merged violations.
//!
//! [`streaks::camera_streaks`] finds the busiest 365-day window for each
//! camera category, [`eligibility::evaluate`] compares those windows to the
//! boot/impound thresholds, and [`summary`] totals fines and counts
//! violations by description, borough and year.

pub mod eligibility;
pub mod streaks;
pub mod summary;

pub use eligibility::evaluate;
pub use streaks::{camera_streaks, streak};
pub use summary::{breakdown, fine_summary};
