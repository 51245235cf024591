//! Socrata (SODA) URL and query construction.

use plate_lookup_source_models::SchemaFamily;

/// Row cap for a single violation query.
pub const VIOLATION_LIMIT: u32 = 10_000;

/// Query parameter carrying the application token.
pub const APP_TOKEN_PARAM: &str = "$$app_token";

/// What to look up: a plate in a registration state, optionally narrowed
/// to plate types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateQuery {
    /// Upper-case plate.
    pub plate: String,
    /// Upper-case two-letter registration state.
    pub state: String,
    /// Upper-case plate types; empty means any.
    pub plate_types: Vec<String>,
}

impl PlateQuery {
    /// Normalizes case and surrounding whitespace.
    #[must_use]
    pub fn new(plate: &str, state: &str, plate_types: &[String]) -> Self {
        Self {
            plate: plate.trim().to_uppercase(),
            state: state.trim().to_uppercase(),
            plate_types: plate_types
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Returns a copy querying `plate` instead.
    #[must_use]
    pub fn with_plate(&self, plate: &str) -> Self {
        Self {
            plate: plate.trim().to_uppercase(),
            ..self.clone()
        }
    }
}

/// `{base}/resource/{id}.json`
#[must_use]
pub fn resource_url(base_url: &str, resource_id: &str) -> String {
    format!("{base_url}/resource/{resource_id}.json")
}

/// `{base}/api/views/metadata/v1/{id}.json`
#[must_use]
pub fn metadata_url(base_url: &str, resource_id: &str) -> String {
    format!("{base_url}/api/views/metadata/v1/{resource_id}.json")
}

/// Derives the human-readable dataset page from a resource URL.
///
/// `https://data.cityofnewyork.us/resource/pvqr-7yc4.json`
/// -> `https://data.cityofnewyork.us/d/pvqr-7yc4`
#[must_use]
pub fn portal_url(resource_url: &str) -> Option<String> {
    resource_url.find("/resource/").map(|idx| {
        let base = &resource_url[..idx];
        let rest = &resource_url[idx + "/resource/".len()..];
        let dataset_id = rest.strip_suffix(".json").unwrap_or(rest);
        format!("{base}/d/{dataset_id}")
    })
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Query parameters for a plate lookup against one table.
#[must_use]
pub fn violation_query(
    schema: SchemaFamily,
    query: &PlateQuery,
    app_token: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        (schema.plate_field().to_string(), query.plate.clone()),
        (schema.state_field().to_string(), query.state.clone()),
    ];
    if !query.plate_types.is_empty() {
        let types: Vec<String> = query.plate_types.iter().map(|t| quote(t)).collect();
        params.push((
            "$where".to_string(),
            format!("{} in({})", schema.plate_type_field(), types.join(",")),
        ));
    }
    params.push(("$limit".to_string(), VIOLATION_LIMIT.to_string()));
    params.push((APP_TOKEN_PARAM.to_string(), app_token.to_string()));
    params
}

/// Query parameters asking the medallion table which DMV plates a
/// medallion has been registered to, with the latest update per plate.
#[must_use]
pub fn medallion_query(plate: &str, app_token: &str) -> Vec<(String, String)> {
    vec![
        ("license_number".to_string(), plate.to_string()),
        ("$group".to_string(), "dmv_license_plate_number".to_string()),
        (
            "$select".to_string(),
            "dmv_license_plate_number, max(last_updated_date)".to_string(),
        ),
        (APP_TOKEN_PARAM.to_string(), app_token.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn plate_query_normalizes_case() {
        let query = PlateQuery::new(" abc1234 ", "ny", &["pas".to_string(), " ".to_string()]);
        assert_eq!(query.plate, "ABC1234");
        assert_eq!(query.state, "NY");
        assert_eq!(query.plate_types, vec!["PAS"]);
    }

    #[test]
    fn fiscal_year_query_uses_fiscal_year_columns() {
        let query = PlateQuery::new("ABC1234", "NY", &[]);
        let params = violation_query(SchemaFamily::FiscalYear, &query, "tok");
        assert_eq!(param(&params, "plate_id"), Some("ABC1234"));
        assert_eq!(param(&params, "registration_state"), Some("NY"));
        assert_eq!(param(&params, "$limit"), Some("10000"));
        assert_eq!(param(&params, "$$app_token"), Some("tok"));
        assert_eq!(param(&params, "$where"), None);
    }

    #[test]
    fn opacv_query_filters_on_license_type() {
        let query = PlateQuery::new("ABC1234", "NY", &["PAS".to_string(), "COM".to_string()]);
        let params = violation_query(SchemaFamily::Opacv, &query, "tok");
        assert_eq!(param(&params, "plate"), Some("ABC1234"));
        assert_eq!(param(&params, "state"), Some("NY"));
        assert_eq!(
            param(&params, "$where"),
            Some("license_type in('PAS','COM')")
        );
    }

    #[test]
    fn quotes_are_escaped_in_where_clause() {
        let query = PlateQuery::new("X", "NY", &["O'K".to_string()]);
        let params = violation_query(SchemaFamily::FiscalYear, &query, "tok");
        assert_eq!(param(&params, "$where"), Some("plate_type in('O''K')"));
    }

    #[test]
    fn medallion_query_groups_by_dmv_plate() {
        let params = medallion_query("5J55", "tok");
        assert_eq!(param(&params, "license_number"), Some("5J55"));
        assert_eq!(param(&params, "$group"), Some("dmv_license_plate_number"));
    }

    #[test]
    fn derives_portal_url() {
        let url = resource_url("https://data.cityofnewyork.us", "pvqr-7yc4");
        assert_eq!(
            portal_url(&url).as_deref(),
            Some("https://data.cityofnewyork.us/d/pvqr-7yc4")
        );
        assert!(portal_url("https://example.test/other").is_none());
    }

    #[test]
    fn builds_metadata_url() {
        assert_eq!(
            metadata_url("https://data.cityofnewyork.us", "nc67-uf89"),
            "https://data.cityofnewyork.us/api/views/metadata/v1/nc67-uf89.json"
        );
    }
}
