//! The lookup pipeline.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use plate_lookup_analytics::{breakdown, camera_streaks, evaluate, fine_summary};
use plate_lookup_analytics_models::{
    CameraStreakData, EligibilityReport, FineSummary, ViolationBreakdown,
};
use plate_lookup_geocoder::google::GoogleGeocoder;
use plate_lookup_geocoder::{BoroughGeocoder, NullGeocoder};
use plate_lookup_normalize::borough::fill_missing_boroughs;
use plate_lookup_normalize::{merge_violations, normalize};
use plate_lookup_source::cache::ResponseCache;
use plate_lookup_source::medallion::rectify_plate;
use plate_lookup_source::queue::{PRIORITY_BACKGROUND, PRIORITY_INTERACTIVE, RequestQueue};
use plate_lookup_source::socrata::PlateQuery;
use plate_lookup_source::{OpenDataClient, OpenDataConfig};
use plate_lookup_violation_models::{FromDatabase, Violation};
use serde::Serialize;

use crate::LookupError;
use crate::history::{InMemoryLookupHistory, LookupHistory, PreviousLookups};

/// A plate to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub plate: String,
    /// Two-letter registration state.
    pub state: String,
    /// Restricts results to these plate types when non-empty.
    pub plate_types: Vec<String>,
    /// Queues requests behind new lookups.
    pub background: bool,
}

impl LookupRequest {
    #[must_use]
    pub fn new(plate: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            state: state.into(),
            plate_types: Vec::new(),
            background: false,
        }
    }

    #[must_use]
    pub fn with_plate_types(mut self, plate_types: Vec<String>) -> Self {
        self.plate_types = plate_types;
        self
    }

    #[must_use]
    pub const fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Queue priority for this lookup's requests. Plates already looked up
    /// yield to new ones, as do explicit background requests.
    #[must_use]
    pub const fn priority(&self, previous: &PreviousLookups) -> i32 {
        if self.background || previous.count > 0 {
            PRIORITY_BACKGROUND
        } else {
            PRIORITY_INTERACTIVE
        }
    }
}

/// Everything known about a plate after one lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    /// Plate as requested.
    pub plate: String,
    /// Plate the tables were queried with (differs for medallions).
    pub rectified_plate: String,
    pub state: String,
    pub plate_types: Vec<String>,
    /// Merged violations, one per summons number.
    pub violations: Vec<Violation>,
    pub camera_streaks: CameraStreakData,
    pub fines: FineSummary,
    pub breakdown: ViolationBreakdown,
    pub eligibility: EligibilityReport,
    /// Every table queried, with its refresh time.
    pub databases: Vec<FromDatabase>,
    /// How many times this plate has been looked up, this one included.
    pub frequency: u64,
    pub previous_lookup_at: Option<DateTime<Utc>>,
    pub looked_up_at: DateTime<Utc>,
}

/// Runs plate lookups against shared request infrastructure.
#[derive(Clone)]
pub struct LookupService {
    client: OpenDataClient,
    geocoder: Arc<dyn BoroughGeocoder>,
    history: Arc<dyn LookupHistory>,
}

impl std::fmt::Debug for LookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupService")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl LookupService {
    #[must_use]
    pub fn new(
        client: OpenDataClient,
        geocoder: Arc<dyn BoroughGeocoder>,
        history: Arc<dyn LookupHistory>,
    ) -> Self {
        Self {
            client,
            geocoder,
            history,
        }
    }

    /// Builds a service from environment configuration with a fresh queue,
    /// metadata cache and in-memory history. Geocoding is disabled unless
    /// a Google API key is set.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the app token is missing.
    pub fn from_env() -> Result<Self, LookupError> {
        let config = OpenDataConfig::from_env()?;
        let client = OpenDataClient::new(
            config,
            Arc::new(RequestQueue::default()),
            Arc::new(ResponseCache::default()),
        );
        let geocoder: Arc<dyn BoroughGeocoder> = match GoogleGeocoder::from_env() {
            Some(google) => Arc::new(google),
            None => {
                log::warn!("No geocoder API key set; boroughs limited to county and precinct");
                Arc::new(NullGeocoder)
            }
        };
        Ok(Self::new(
            client,
            geocoder,
            Arc::new(InMemoryLookupHistory::new()),
        ))
    }

    #[must_use]
    pub const fn client(&self) -> &OpenDataClient {
        &self.client
    }

    /// Looks up every violation for a plate.
    ///
    /// # Errors
    ///
    /// * [`LookupError::BadGateway`] if medallion resolution or any table
    ///   query fails after retries
    /// * [`LookupError::Parse`] if any record cannot be normalized
    /// * [`LookupError::History`] if the lookup cannot be recorded
    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, LookupError> {
        let start = Instant::now();
        let plate = request.plate.trim().to_uppercase();
        let state = request.state.trim().to_uppercase();
        let priority = request.priority(&self.history.previous_lookups(&plate, &state).await?);
        log::debug!("{state}:{plate}: queue priority {priority}");

        let rectified = rectify_plate(&self.client, &plate, priority)
            .await
            .map_err(|e| LookupError::bad_gateway(&plate, &state, e))?;

        let query = PlateQuery::new(&rectified, &state, &request.plate_types);
        let responses = self
            .client
            .fetch_all(&query, priority)
            .await
            .map_err(|e| LookupError::bad_gateway(&plate, &state, e))?;

        let mut databases = Vec::with_capacity(responses.len());
        let mut normalized = Vec::new();
        for response in responses {
            let source = response.provenance();
            for record in response.records {
                let violation = normalize(record, &source)
                    .map_err(|e| LookupError::parse(&plate, &state, e))?;
                normalized.push(violation);
            }
            databases.push(source);
        }

        let raw_count = normalized.len();
        let mut violations = merge_violations(normalized);
        fill_missing_boroughs(&mut violations, self.geocoder.as_ref()).await;

        let streaks = camera_streaks(&violations);
        let eligibility = evaluate(&streaks);
        let fines = fine_summary(&violations);
        let counts = breakdown(&violations);

        let looked_up_at = Utc::now();
        let previous = self
            .history
            .record_lookup(&plate, &state, looked_up_at)
            .await?;

        log::info!(
            "{state}:{plate}: {raw_count} raw record(s), {} violation(s) in {:.1}s",
            violations.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(LookupResult {
            plate,
            rectified_plate: query.plate,
            state,
            plate_types: query.plate_types,
            violations,
            camera_streaks: streaks,
            fines,
            breakdown: counts,
            eligibility,
            databases,
            frequency: previous.count + 1,
            previous_lookup_at: previous.last_lookup_at,
            looked_up_at,
        })
    }
}
