#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request orchestration for the NYC open-data violation tables.
//!
//! Every outbound call goes through one process-wide [`queue::RequestQueue`]
//! (bounded concurrency with priority admission) and is retried with
//! exponential backoff by [`retry::retry_with_backoff`]. Table metadata is
//! memoised in a [`cache::ResponseCache`]. On top of those,
//! [`medallion::rectify_plate`] resolves taxi medallions to DMV plates and
//! [`fetch::fetch_all`] fans out one request per violation table.

pub mod cache;
pub mod client;
pub mod config;
pub mod fetch;
pub mod medallion;
pub mod parsing;
pub mod queue;
pub mod registry;
pub mod retry;
pub mod socrata;

use std::sync::Arc;

pub use client::OpenDataClient;
pub use config::{ConfigError, OpenDataConfig};

/// Errors that can occur while talking to the open-data portal.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The portal answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Request URL with the app token removed.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// Configuration was missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A failure observed through a shared in-flight request.
    #[error("{0}")]
    Shared(Arc<SourceError>),
}
