//! Rolling 365-day camera violation streaks.

use chrono::{DateTime, TimeDelta, Utc};
use plate_lookup_analytics_models::{CameraStreak, CameraStreakData, StreakCategory};
use plate_lookup_violation_models::Violation;

/// Window length for a streak.
pub const STREAK_WINDOW: TimeDelta = TimeDelta::days(365);

/// Computes the busiest `[t, t + 365 days)` window over `timestamps`.
///
/// Each window starts at one of the timestamps. When several windows tie,
/// the earliest wins.
#[must_use]
pub fn streak(timestamps: &[DateTime<Utc>]) -> CameraStreak {
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let mut result = CameraStreak {
        total: sorted.len() as u64,
        ..CameraStreak::default()
    };

    let mut end = 0;
    for (start, &opened) in sorted.iter().enumerate() {
        let close = opened + STREAK_WINDOW;
        end = end.max(start);
        while end < sorted.len() && sorted[end] < close {
            end += 1;
        }

        let count = (end - start) as u64;
        if count > result.max_streak {
            result.max_streak = count;
            result.streak_start = Some(opened);
            result.streak_end = Some(sorted[end - 1]);
        }
    }

    result
}

/// Computes streaks for every category over `violations`.
///
/// Only violations with a camera description and a timestamp count.
#[must_use]
pub fn camera_streaks(violations: &[Violation]) -> CameraStreakData {
    let cameras: Vec<_> = violations
        .iter()
        .filter_map(|v| Some((v.camera_kind()?, v.formatted_time_utc?)))
        .collect();

    let mut data = CameraStreakData::default();
    for &category in StreakCategory::all() {
        let timestamps: Vec<_> = cameras
            .iter()
            .filter(|(kind, _)| category.includes(*kind))
            .map(|(_, at)| *at)
            .collect();
        *data.get_mut(category) = streak(&timestamps);
    }

    log::debug!(
        "camera streaks: {} camera violations, all-camera max {}",
        cameras.len(),
        data.all_camera.max_streak
    );

    data
}
