//! Boot/impound eligibility under New York City's camera statutes.
//!
//! The Dangerous Vehicle Abatement Act applies to 15 school zone speed
//! camera violations or 5 red light camera violations within twelve
//! months. The Reckless Driving Accountability Act applies to 5 speed or
//! red light camera violations combined within twelve months.

use plate_lookup_analytics_models::{
    CameraStreakData, EligibilityReport, Statute, StreakCategory, ThresholdCheck,
};

/// `(statute, category, violations needed in one window)`.
pub const THRESHOLDS: &[(Statute, StreakCategory, u64)] = &[
    (Statute::Dvaa, StreakCategory::SchoolZoneSpeed, 15),
    (Statute::Dvaa, StreakCategory::RedLight, 5),
    (Statute::Rdaa, StreakCategory::AllCamera, 5),
];

/// Compares `streaks` against every threshold.
#[must_use]
pub fn evaluate(streaks: &CameraStreakData) -> EligibilityReport {
    let checks: Vec<ThresholdCheck> = THRESHOLDS
        .iter()
        .map(|&(statute, category, threshold)| {
            let max_streak = streaks.get(category).max_streak;
            ThresholdCheck {
                statute,
                category,
                threshold,
                max_streak,
                met: max_streak >= threshold,
            }
        })
        .collect();

    let met = |statute: Statute| checks.iter().any(|c| c.statute == statute && c.met);

    let report = EligibilityReport {
        dvaa_eligible: met(Statute::Dvaa),
        rdaa_eligible: met(Statute::Rdaa),
        checks,
    };
    if report.eligible() {
        log::info!(
            "plate meets boot/impound threshold (DVAA: {}, RDAA: {})",
            report.dvaa_eligible,
            report.rdaa_eligible
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(category: StreakCategory, max_streak: u64) -> CameraStreakData {
        let mut data = CameraStreakData::default();
        data.get_mut(category).max_streak = max_streak;
        data
    }

    #[test]
    fn nothing_is_not_eligible() {
        let report = evaluate(&CameraStreakData::default());
        assert!(!report.eligible());
        assert_eq!(report.checks.len(), THRESHOLDS.len());
    }

    #[test]
    fn fifteen_speed_cameras_meet_dvaa() {
        assert!(!evaluate(&with(StreakCategory::SchoolZoneSpeed, 14)).dvaa_eligible);
        assert!(evaluate(&with(StreakCategory::SchoolZoneSpeed, 15)).dvaa_eligible);
    }

    #[test]
    fn five_red_lights_meet_dvaa() {
        let report = evaluate(&with(StreakCategory::RedLight, 5));
        assert!(report.dvaa_eligible);
        assert!(!report.rdaa_eligible);
    }

    #[test]
    fn five_combined_meet_rdaa() {
        let report = evaluate(&with(StreakCategory::AllCamera, 5));
        assert!(report.rdaa_eligible);
        assert!(!report.dvaa_eligible);
        assert!(report.eligible());
    }

    #[test]
    fn bus_lanes_never_count() {
        assert!(!evaluate(&with(StreakCategory::AllCameraInclBusLane, 100)).eligible());
    }
}
