//! Fan-out across every violation table.

use chrono::{DateTime, Utc};
use futures::future::{try_join, try_join_all};
use plate_lookup_source_models::{DatabaseDefinition, DatabaseMetadata, RawViolation};
use plate_lookup_violation_models::FromDatabase;

use crate::client::OpenDataClient;
use crate::parsing::parse_data_updated_at;
use crate::socrata::{PlateQuery, portal_url};
use crate::SourceError;

/// Everything one table returned for a lookup.
#[derive(Debug, Clone)]
pub struct DatabaseResponse {
    pub database: DatabaseDefinition,
    /// Resource URL the records were fetched from.
    pub endpoint: String,
    pub metadata: DatabaseMetadata,
    pub records: Vec<RawViolation>,
}

impl DatabaseResponse {
    /// When the table was last refreshed, if the metadata says.
    #[must_use]
    pub fn data_updated_at(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .data_updated_at
            .as_deref()
            .and_then(parse_data_updated_at)
    }

    /// Human-readable dataset page.
    #[must_use]
    pub fn portal_url(&self) -> Option<String> {
        portal_url(&self.endpoint)
    }

    /// Provenance entry attached to every violation from this table.
    #[must_use]
    pub fn provenance(&self) -> FromDatabase {
        FromDatabase {
            endpoint: self.endpoint.clone(),
            name: self.database.name.clone(),
            data_updated_at: self.data_updated_at(),
        }
    }
}

/// Queries every table in `databases` for `query`, along with each table's
/// metadata.
///
/// All requests are issued concurrently (subject to the shared queue).
/// The result preserves the order of `databases`.
///
/// # Errors
///
/// Fails as a whole if any table fails after its retries; partial results
/// are discarded.
pub async fn fetch_all(
    client: &OpenDataClient,
    databases: &[DatabaseDefinition],
    query: &PlateQuery,
    priority: i32,
) -> Result<Vec<DatabaseResponse>, SourceError> {
    log::debug!(
        "fetching {}:{} from {} table(s)",
        query.state,
        query.plate,
        databases.len()
    );

    let requests = databases.iter().map(|database| async move {
        let (records, metadata) = try_join(
            client.fetch_violations(database, query, priority),
            client.fetch_metadata(database, priority),
        )
        .await?;
        Ok::<_, SourceError>(DatabaseResponse {
            database: database.clone(),
            endpoint: client.resource_url(database),
            metadata,
            records,
        })
    });

    let responses = try_join_all(requests).await?;
    log::info!(
        "{}:{}: {} raw record(s) from {} table(s)",
        query.state,
        query.plate,
        responses.iter().map(|r| r.records.len()).sum::<usize>(),
        responses.len()
    );
    Ok(responses)
}
