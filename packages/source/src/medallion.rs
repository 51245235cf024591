//! Taxi medallion to DMV plate resolution.

use chrono::{DateTime, Utc};
use plate_lookup_source_models::MedallionMatch;

use crate::client::OpenDataClient;
use crate::parsing::parse_socrata_date;
use crate::SourceError;

/// Returns the DMV plate most recently registered to `plate` if it is a
/// medallion number, otherwise `plate` unchanged.
///
/// # Errors
///
/// Returns the final failure once retries against the medallion table are
/// exhausted.
pub async fn rectify_plate(
    client: &OpenDataClient,
    plate: &str,
    priority: i32,
) -> Result<String, SourceError> {
    let matches = client.fetch_medallion_matches(plate, priority).await?;
    Ok(select_dmv_plate(&matches).map_or_else(
        || plate.to_string(),
        |dmv| {
            log::info!("medallion {plate} resolved to DMV plate {dmv}");
            dmv.to_string()
        },
    ))
}

/// Picks the plate with the latest `max_last_updated_date`. Rows without a
/// plate are skipped; rows with an unparseable date sort before any dated
/// row. The first row wins ties.
#[must_use]
pub fn select_dmv_plate(matches: &[MedallionMatch]) -> Option<&str> {
    let mut best: Option<(Option<DateTime<Utc>>, &str)> = None;
    for row in matches {
        let Some(plate) = row
            .dmv_license_plate_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        else {
            continue;
        };
        let updated = row
            .max_last_updated_date
            .as_deref()
            .and_then(parse_socrata_date);
        match best {
            Some((best_updated, _)) if updated <= best_updated => {}
            _ => best = Some((updated, plate)),
        }
    }
    best.map(|(_, plate)| plate)
}
