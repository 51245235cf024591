//! Fine totals and violation counts.

use std::collections::HashMap;

use chrono::Datelike as _;
use plate_lookup_analytics_models::{FineSummary, LabelCount, ViolationBreakdown};
use plate_lookup_violation_models::Violation;

/// Label used when a violation has no value for the grouped field.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Sums the money fields of `violations`, skipping unknown amounts.
#[must_use]
pub fn fine_summary(violations: &[Violation]) -> FineSummary {
    violations
        .iter()
        .fold(FineSummary::default(), |mut summary, v| {
            summary.fined += v.fined.unwrap_or_default();
            summary.paid += v.paid.unwrap_or_default();
            summary.reduced += v.reduced.unwrap_or_default();
            summary.outstanding += v.outstanding.unwrap_or_default();
            summary
        })
}

/// Counts violations by description, borough and issue year.
#[must_use]
pub fn breakdown(violations: &[Violation]) -> ViolationBreakdown {
    ViolationBreakdown {
        by_description: count_by(violations, |v| {
            v.humanized_description
                .clone()
                .or_else(|| v.raw_description.clone())
        }),
        by_borough: count_by(violations, |v| v.borough.map(|b| b.to_string())),
        by_year: count_by(violations, |v| {
            v.formatted_time.map(|t| t.year().to_string())
        }),
    }
}

fn count_by(violations: &[Violation], label: impl Fn(&Violation) -> Option<String>) -> Vec<LabelCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for v in violations {
        let key = label(v).unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        *counts.entry(key).or_default() += 1;
    }

    let mut counts: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use plate_lookup_violation_models::Borough;

    use super::*;

    fn violation(description: Option<&str>, borough: Option<Borough>, year: Option<i32>) -> Violation {
        let mut v = Violation::new("1");
        v.humanized_description = description.map(String::from);
        v.borough = borough;
        v.formatted_time = year.and_then(|y| {
            NaiveDate::from_ymd_opt(y, 6, 1).and_then(|d| d.and_hms_opt(12, 0, 0))
        });
        v
    }

    #[test]
    fn sums_known_amounts() {
        let mut a = Violation::new("1");
        a.fined = Some(115.0);
        a.paid = Some(115.0);
        let mut b = Violation::new("2");
        b.fined = Some(50.0);
        b.outstanding = Some(50.0);
        b.reduced = Some(10.0);

        let summary = fine_summary(&[a, b, Violation::new("3")]);

        assert!((summary.fined - 165.0).abs() < f64::EPSILON);
        assert!((summary.paid - 115.0).abs() < f64::EPSILON);
        assert!((summary.reduced - 10.0).abs() < f64::EPSILON);
        assert!((summary.outstanding - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_violations_sum_to_zero() {
        assert_eq!(fine_summary(&[]), FineSummary::default());
    }

    #[test]
    fn counts_sorted_by_count_then_label() {
        let violations = vec![
            violation(Some("Fire Hydrant"), Some(Borough::Queens), Some(2022)),
            violation(Some("Double Parking"), Some(Borough::Queens), Some(2023)),
            violation(Some("Fire Hydrant"), None, Some(2023)),
            violation(None, Some(Borough::Bronx), None),
        ];

        let counts = breakdown(&violations);

        assert_eq!(counts.by_description[0].label, "Fire Hydrant");
        assert_eq!(counts.by_description[0].count, 2);
        assert_eq!(counts.by_description[1].label, "Double Parking");
        assert_eq!(counts.by_description[2].label, UNKNOWN_LABEL);
        assert_eq!(counts.by_borough[0].label, "Queens");
        assert_eq!(counts.by_borough[0].count, 2);
        assert_eq!(counts.by_year[0].label, "2023");
        assert_eq!(counts.by_year[0].count, 2);
    }
}
