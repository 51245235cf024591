//! Lookup frequency tracking.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from a [`LookupHistory`] backend.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The backing store failed.
    #[error("Lookup history storage error: {message}")]
    Storage {
        /// Description of the failure.
        message: String,
    },
}

/// What is known about earlier lookups of a plate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviousLookups {
    pub count: u64,
    pub last_lookup_at: Option<DateTime<Utc>>,
}

/// Records plate lookups so repeat lookups can be counted.
#[async_trait]
pub trait LookupHistory: Send + Sync {
    /// Earlier lookups of `state:plate`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store cannot be read.
    async fn previous_lookups(&self, plate: &str, state: &str)
    -> Result<PreviousLookups, HistoryError>;

    /// Records a lookup of `state:plate` at `at` and returns the lookups
    /// that preceded it. Concurrent calls for one plate each see a
    /// distinct count.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store cannot be written.
    async fn record_lookup(
        &self,
        plate: &str,
        state: &str,
        at: DateTime<Utc>,
    ) -> Result<PreviousLookups, HistoryError>;
}

/// Process-local history, lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryLookupHistory {
    lookups: Mutex<HashMap<(String, String), Vec<DateTime<Utc>>>>,
}

impl InMemoryLookupHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(plate: &str, state: &str) -> (String, String) {
    (plate.to_ascii_uppercase(), state.to_ascii_uppercase())
}

fn summarize(times: &[DateTime<Utc>]) -> PreviousLookups {
    PreviousLookups {
        count: times.len() as u64,
        last_lookup_at: times.iter().max().copied(),
    }
}

#[async_trait]
impl LookupHistory for InMemoryLookupHistory {
    async fn previous_lookups(
        &self,
        plate: &str,
        state: &str,
    ) -> Result<PreviousLookups, HistoryError> {
        let lookups = self.lookups.lock().await;
        Ok(lookups
            .get(&key(plate, state))
            .map(Vec::as_slice)
            .map_or_else(PreviousLookups::default, summarize))
    }

    async fn record_lookup(
        &self,
        plate: &str,
        state: &str,
        at: DateTime<Utc>,
    ) -> Result<PreviousLookups, HistoryError> {
        let mut lookups = self.lookups.lock().await;
        let times = lookups.entry(key(plate, state)).or_default();
        let previous = summarize(times);
        times.push(at);
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[tokio::test]
    async fn counts_lookups_per_plate() {
        let history = InMemoryLookupHistory::new();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

        assert_eq!(
            history.previous_lookups("ABC", "NY").await.unwrap(),
            PreviousLookups::default()
        );

        history.record_lookup("abc", "ny", first).await.unwrap();
        let before_second = history.record_lookup("ABC", "NY", second).await.unwrap();
        history.record_lookup("ABC", "NJ", second).await.unwrap();

        assert_eq!(before_second.count, 1);
        assert_eq!(before_second.last_lookup_at, Some(first));

        let previous = history.previous_lookups("ABC", "NY").await.unwrap();
        assert_eq!(previous.count, 2);
        assert_eq!(previous.last_lookup_at, Some(second));
    }

    #[tokio::test]
    async fn concurrent_records_see_distinct_counts() {
        let history = InMemoryLookupHistory::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let (a, b) = tokio::join!(
            history.record_lookup("ABC", "NY", at),
            history.record_lookup("ABC", "NY", at),
        );

        let mut counts = vec![a.unwrap().count, b.unwrap().count];
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 1]);
    }
}
