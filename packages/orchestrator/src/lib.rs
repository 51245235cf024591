#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! One plate lookup, end to end.
//!
//! [`LookupService::lookup`] resolves medallion plates, queries every
//! violation table, normalizes and merges the records, geocodes missing
//! boroughs, and computes fines, camera streaks and boot/impound
//! eligibility. Failures reach the caller as either a bad gateway
//! (upstream portal trouble) or a parse error (data the normalizer could
//! not interpret).

pub mod history;
pub mod lookup;

use plate_lookup_normalize::NormalizeError;
use plate_lookup_source::{ConfigError, SourceError};
use thiserror::Error;

pub use history::{HistoryError, InMemoryLookupHistory, LookupHistory, PreviousLookups};
pub use lookup::{LookupRequest, LookupResult, LookupService};

/// Errors surfaced by a lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The open-data portal failed after retries.
    #[error("Bad gateway looking up {state}:{plate}: {source}")]
    BadGateway {
        plate: String,
        state: String,
        #[source]
        source: SourceError,
    },

    /// A record could not be normalized.
    #[error("Could not parse violations for {state}:{plate}: {source}")]
    Parse {
        plate: String,
        state: String,
        #[source]
        source: NormalizeError,
    },

    /// Configuration was missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The lookup history backend failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl LookupError {
    /// Whether the failure lies with the upstream portal.
    #[must_use]
    pub const fn is_bad_gateway(&self) -> bool {
        matches!(self, Self::BadGateway { .. })
    }

    fn bad_gateway(plate: &str, state: &str, source: SourceError) -> Self {
        Self::BadGateway {
            plate: plate.to_string(),
            state: state.to_string(),
            source,
        }
    }

    fn parse(plate: &str, state: &str, source: NormalizeError) -> Self {
        Self::Parse {
            plate: plate.to_string(),
            state: state.to_string(),
            source,
        }
    }
}
