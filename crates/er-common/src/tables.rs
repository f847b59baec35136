use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to open {table} table at {path}: {source}")]
    Open {
        table: &'static str,
        path: String,
        source: csv::Error,
    },
    #[error("failed to read {table} row: {source}")]
    Row {
        table: &'static str,
        source: csv::Error,
    },
}

/// One row of the long-form executive attribute table. A single executive
/// spans many rows, one per attribute type; collection-valued attributes
/// arrive in `json_value`, plain strings in `string_value`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecAttributeRecord {
    pub exec_entity_id: Option<i64>,
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(default)]
    pub json_value: Option<String>,
    #[serde(default)]
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityRecord {
    pub assignment_id: Option<i64>,
    #[serde(default)]
    pub sectors: Option<String>,
    #[serde(default)]
    pub sub_sectors: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub scale: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    pub assignment_id: Option<i64>,
    pub exec_entity_id: Option<i64>,
    pub outcome: Option<f64>,
}

fn load_table<T, P>(path: P, table: &'static str) -> Result<Vec<T>, TableError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|source| TableError::Open {
        table,
        path: path.display().to_string(),
        source,
    })?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|source| TableError::Row { table, source })?);
    }

    tracing::info!(table, rows = rows.len(), path = %path.display(), "loaded table");
    Ok(rows)
}

pub fn load_exec_attributes<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ExecAttributeRecord>, TableError> {
    load_table(path, "exec_roles")
}

pub fn load_opportunities<P: AsRef<Path>>(path: P) -> Result<Vec<OpportunityRecord>, TableError> {
    load_table(path, "opp")
}

pub fn load_matches<P: AsRef<Path>>(path: P) -> Result<Vec<MatchRecord>, TableError> {
    load_table(path, "match")
}
