//! `show`: load datasets for display.

use crate::client::CatalogClient;
use crate::error::CommandError;
use crate::record::DatasetRecord;

use super::fetch_datasets;

/// Loads the requested datasets (or all datasets when `ids` is empty).
pub async fn run<C: CatalogClient>(
    client: &C,
    ids: &[String],
) -> Result<Vec<DatasetRecord>, CommandError> {
    fetch_datasets(client, ids).await
}

/// One display line per dataset: `name: <record JSON>`.
pub fn format_record(record: &DatasetRecord) -> String {
    let json = serde_json::to_string(record).unwrap_or_else(|e| format!("<unserializable: {e}>"));
    format!("{}: {}", record.name, json)
}
