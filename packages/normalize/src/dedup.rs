//! Cross-table deduplication by summons number.

use std::collections::HashMap;

use plate_lookup_violation_models::Violation;

/// Collapses violations sharing a summons number into one record.
///
/// Output order is the order each summons number was first seen. Earlier
/// records win field by field and provenance lists are concatenated (see
/// [`Violation::absorb`]).
#[must_use]
pub fn merge_violations(violations: impl IntoIterator<Item = Violation>) -> Vec<Violation> {
    let mut merged: Vec<Violation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for violation in violations {
        if let Some(&i) = index.get(&violation.summons_number) {
            merged[i].absorb(violation);
        } else {
            index.insert(violation.summons_number.clone(), merged.len());
            merged.push(violation);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use plate_lookup_violation_models::FromDatabase;

    use super::*;

    fn from(summons: &str, endpoint: &str) -> Violation {
        let mut v = Violation::new(summons);
        v.from_databases.push(FromDatabase {
            endpoint: endpoint.to_string(),
            name: endpoint.to_string(),
            data_updated_at: None,
        });
        v
    }

    #[test]
    fn merges_same_summons_across_tables() {
        let mut fy = from("1", "fy_2023");
        fy.violation_code = Some("36".to_string());
        let mut opacv = from("1", "opacv");
        opacv.fine_amount = Some(50.0);
        let other = from("2", "fy_2023");

        let merged = merge_violations(vec![fy, other, opacv]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].summons_number, "1");
        assert_eq!(merged[1].summons_number, "2");
        assert_eq!(merged[0].violation_code.as_deref(), Some("36"));
        assert_eq!(merged[0].fine_amount, Some(50.0));
        let endpoints: Vec<_> = merged[0]
            .from_databases
            .iter()
            .map(|d| d.endpoint.as_str())
            .collect();
        assert_eq!(endpoints, ["fy_2023", "opacv"]);
    }

    #[test]
    fn later_records_never_blank_earlier_values() {
        let mut first = from("1", "a");
        first.street_name = Some("BROADWAY".to_string());
        let second = from("1", "b");

        let merged = merge_violations(vec![first, second]);

        assert_eq!(merged[0].street_name.as_deref(), Some("BROADWAY"));
    }

    #[test]
    fn merging_is_idempotent() {
        let mut a = from("1", "fy_2023");
        a.plate_id = Some("ABC".to_string());
        let b = from("1", "opacv");
        let c = from("2", "opacv");
        let input = vec![a, b, c];

        let once = merge_violations(input.clone());
        let doubled = merge_violations(input.iter().cloned().chain(input.iter().cloned()));
        let again = merge_violations(once.clone());

        assert_eq!(doubled, once);
        assert_eq!(again, once);
        assert_eq!(once[0].from_databases.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(merge_violations(Vec::new()).is_empty());
    }
}
