//! Fine arithmetic.
//!
//! A missing amount is unknown, not zero. `fined` is only computed when at
//! least one of fine, penalty or interest is present.

use plate_lookup_violation_models::Violation;

/// Parses a dollar amount as reported by the portal (`"65"`, `"65.00"`).
#[must_use]
pub fn parse_amount(value: Option<&str>) -> Option<f64> {
    let value = value?.trim().trim_start_matches('$');
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(amount),
        _ => {
            log::debug!("ignoring unparseable amount {value:?}");
            None
        }
    }
}

/// Sums whichever of `parts` are present. `None` when none are.
#[must_use]
pub fn total_fined(parts: [Option<f64>; 3]) -> Option<f64> {
    parts
        .into_iter()
        .flatten()
        .fold(None, |sum, amount| Some(sum.unwrap_or(0.0) + amount))
}

/// Fills the derived money fields from the sub-amounts.
pub fn apply_fines(violation: &mut Violation) {
    violation.fined = total_fined([
        violation.fine_amount,
        violation.penalty_amount,
        violation.interest_amount,
    ]);
    violation.outstanding = violation.amount_due;
    violation.paid = violation.payment_amount;
    violation.reduced = violation.reduction_amount;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount(Some("65")), Some(65.0));
        assert_eq!(parse_amount(Some(" 115.50 ")), Some(115.5));
        assert_eq!(parse_amount(Some("$10")), Some(10.0));
        assert_eq!(parse_amount(Some("")), None);
        assert_eq!(parse_amount(Some("n/a")), None);
        assert_eq!(parse_amount(Some("NaN")), None);
        assert_eq!(parse_amount(None), None);
    }

    #[test]
    fn nothing_known_is_not_zero() {
        assert_eq!(total_fined([None, None, None]), None);
    }

    #[test]
    fn penalty_alone_counts() {
        assert_eq!(total_fined([None, parse_amount(Some("10")), None]), Some(10.0));
    }

    #[test]
    fn sums_present_parts() {
        assert_eq!(total_fined([Some(65.0), Some(10.0), Some(0.5)]), Some(75.5));
        assert_eq!(total_fined([Some(0.0), None, None]), Some(0.0));
    }

    #[test]
    fn apply_fines_passes_through_totals() {
        let mut v = Violation::new("1");
        v.fine_amount = Some(50.0);
        v.reduction_amount = Some(5.0);
        v.payment_amount = Some(45.0);
        v.amount_due = Some(0.0);

        apply_fines(&mut v);

        assert_eq!(v.fined, Some(50.0));
        assert_eq!(v.reduced, Some(5.0));
        assert_eq!(v.paid, Some(45.0));
        assert_eq!(v.outstanding, Some(0.0));
    }
}
