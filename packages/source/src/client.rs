//! HTTP client for the open-data portal.
//!
//! All requests share one [`RequestQueue`] and go through
//! [`retry_with_backoff`]. Metadata requests are additionally memoised in
//! a [`ResponseCache`]; violation queries are not.

use std::sync::Arc;
use std::time::Instant;

use plate_lookup_source_models::{
    DatabaseDefinition, DatabaseMetadata, FiscalYearRecord, MedallionMatch, OpacvRecord,
    RawViolation, SchemaFamily,
};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::cache::ResponseCache;
use crate::config::OpenDataConfig;
use crate::fetch::DatabaseResponse;
use crate::queue::RequestQueue;
use crate::registry::{MEDALLION_RESOURCE_ID, all_databases};
use crate::retry::{RetryPolicy, always_retry, retry_with_backoff};
use crate::socrata::{
    APP_TOKEN_PARAM, PlateQuery, medallion_query, metadata_url, resource_url, violation_query,
};
use crate::SourceError;

/// Cache of table metadata keyed by request URL.
pub type MetadataCache = ResponseCache<DatabaseMetadata, Arc<SourceError>>;

/// Cheaply cloneable handle to the portal.
#[derive(Debug, Clone)]
pub struct OpenDataClient {
    http: reqwest::Client,
    config: Arc<OpenDataConfig>,
    queue: Arc<RequestQueue>,
    metadata_cache: Arc<MetadataCache>,
    retry: RetryPolicy,
}

impl OpenDataClient {
    /// Creates a client sharing `queue` and `metadata_cache` with every
    /// other client built from them.
    #[must_use]
    pub fn new(
        config: OpenDataConfig,
        queue: Arc<RequestQueue>,
        metadata_cache: Arc<MetadataCache>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            queue,
            metadata_cache,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides the underlying HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OpenDataConfig {
        &self.config
    }

    #[must_use]
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Public resource URL of a table.
    #[must_use]
    pub fn resource_url(&self, database: &DatabaseDefinition) -> String {
        resource_url(&self.config.base_url, &database.resource_id)
    }

    /// Fetches table metadata, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Shared`] wrapping the final failure once
    /// retries are exhausted.
    pub async fn fetch_metadata(
        &self,
        database: &DatabaseDefinition,
        priority: i32,
    ) -> Result<DatabaseMetadata, SourceError> {
        let url = self.build_url(&metadata_url(&self.config.base_url, &database.resource_id), &[])?;
        let key = url.to_string();
        let this = self.clone();
        self.metadata_cache
            .get_or_load(&key, move || async move {
                this.get_json::<DatabaseMetadata>(&url, priority)
                    .await
                    .map_err(Arc::new)
            })
            .await
            .map_err(SourceError::Shared)
    }

    /// Fetches every record for `query` from one table.
    ///
    /// # Errors
    ///
    /// Returns the final failure once retries are exhausted.
    pub async fn fetch_violations(
        &self,
        database: &DatabaseDefinition,
        query: &PlateQuery,
        priority: i32,
    ) -> Result<Vec<RawViolation>, SourceError> {
        let params = violation_query(database.schema, query, &self.config.app_token);
        let url = self.build_url(&self.resource_url(database), &params)?;

        let records = match database.schema {
            SchemaFamily::FiscalYear => self
                .get_json::<Vec<FiscalYearRecord>>(&url, priority)
                .await?
                .into_iter()
                .map(RawViolation::FiscalYear)
                .collect::<Vec<_>>(),
            SchemaFamily::Opacv => self
                .get_json::<Vec<OpacvRecord>>(&url, priority)
                .await?
                .into_iter()
                .map(RawViolation::Opacv)
                .collect(),
        };

        log::debug!(
            "{}: {} record(s) for {}:{}",
            database.id,
            records.len(),
            query.state,
            query.plate
        );
        Ok(records)
    }

    /// Queries every configured table for `query`. See [`crate::fetch::fetch_all`].
    ///
    /// # Errors
    ///
    /// Fails as a whole if any table fails after its retries.
    pub async fn fetch_all(
        &self,
        query: &PlateQuery,
        priority: i32,
    ) -> Result<Vec<DatabaseResponse>, SourceError> {
        crate::fetch::fetch_all(self, &all_databases(), query, priority).await
    }

    /// Queries the medallion table for DMV plates registered to `plate`.
    ///
    /// # Errors
    ///
    /// Returns the final failure once retries are exhausted.
    pub async fn fetch_medallion_matches(
        &self,
        plate: &str,
        priority: i32,
    ) -> Result<Vec<MedallionMatch>, SourceError> {
        let params = medallion_query(plate, &self.config.app_token);
        let url = self.build_url(
            &resource_url(&self.config.base_url, MEDALLION_RESOURCE_ID),
            &params,
        )?;
        self.get_json(&url, priority).await
    }

    fn build_url(&self, url: &str, params: &[(String, String)]) -> Result<Url, SourceError> {
        let request = self.http.get(url).query(params).build()?;
        Ok(request.url().clone())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        priority: i32,
    ) -> Result<T, SourceError> {
        let shown = redact(url);
        retry_with_backoff(
            &self.queue,
            priority,
            &self.retry,
            always_retry,
            |attempt, _e, delay| {
                log::debug!("{shown}: attempt {} failed, waiting {delay:?}", attempt + 1);
            },
            || self.send_once(url, &shown),
        )
        .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        shown: &str,
    ) -> Result<T, SourceError> {
        log::trace!("GET {shown}");
        let start = Instant::now();
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: shown.to_string(),
                status,
            });
        }
        let body = response.text().await?;
        let parsed = serde_json::from_str(&body)?;
        log::debug!(
            "GET {shown}: {status} in {}ms",
            start.elapsed().as_millis()
        );
        Ok(parsed)
    }
}

/// Renders `url` without the application token.
fn redact(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != APP_TOKEN_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut clean = url.clone();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
