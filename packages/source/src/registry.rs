//! Violation table registry, loaded from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/databases/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a fiscal year is a
//! matter of creating a new TOML file and adding it to the list below.

use plate_lookup_source_models::DatabaseDefinition;

/// Resource identifier of the taxi medallion table.
pub const MEDALLION_RESOURCE_ID: &str = "rhe8-mgbb";

/// TOML configs embedded at compile time.
const DATABASE_TOMLS: &[(&str, &str)] = &[
    // ── Parking Violations Issued, by fiscal year ────────────────────
    ("fy_2014", include_str!("../databases/fy_2014.toml")),
    ("fy_2015", include_str!("../databases/fy_2015.toml")),
    ("fy_2016", include_str!("../databases/fy_2016.toml")),
    ("fy_2017", include_str!("../databases/fy_2017.toml")),
    ("fy_2018", include_str!("../databases/fy_2018.toml")),
    ("fy_2019", include_str!("../databases/fy_2019.toml")),
    ("fy_2020", include_str!("../databases/fy_2020.toml")),
    ("fy_2021", include_str!("../databases/fy_2021.toml")),
    ("fy_2022", include_str!("../databases/fy_2022.toml")),
    ("fy_2023", include_str!("../databases/fy_2023.toml")),
    ("fy_2024", include_str!("../databases/fy_2024.toml")),
    // ── Open Parking and Camera Violations ───────────────────────────
    ("opacv", include_str!("../databases/opacv.toml")),
];

/// Total number of configured tables (used in tests).
#[cfg(test)]
const EXPECTED_DATABASE_COUNT: usize = 12;

/// Parses a single table definition.
///
/// # Errors
///
/// Returns the TOML error message if the config is malformed.
pub fn parse_database_toml(toml_str: &str) -> Result<DatabaseDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns every violation table, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this surfaces in tests rather than in production).
#[must_use]
pub fn all_databases() -> Vec<DatabaseDefinition> {
    DATABASE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_database_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a table by id.
#[must_use]
pub fn find_database(id: &str) -> Option<DatabaseDefinition> {
    all_databases().into_iter().find(|db| db.id == id)
}
