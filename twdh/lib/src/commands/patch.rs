//! `patch`: set arbitrary top-level fields on datasets.

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::CatalogClient;
use crate::error::CommandError;

use super::{RunOptions, RunSummary, fetch_datasets, report_write_failure};

/// Parses the `--patch-data` argument, which must be a JSON object.
///
/// ## Errors
///
/// Returns [`CommandError::MalformedInput`] for invalid JSON or any
/// non-object value.
pub fn parse_patch_data(raw: &str) -> Result<Map<String, Value>, CommandError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CommandError::MalformedInput(format!(
            "patch data must be a JSON object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(CommandError::MalformedInput(format!("patch data parse error: {e}"))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Patches `fields` onto the requested datasets (or every dataset).
pub async fn run<C: CatalogClient>(
    client: &C,
    ids: &[String],
    fields: &Map<String, Value>,
    options: RunOptions,
) -> Result<RunSummary, CommandError> {
    let datasets = fetch_datasets(client, ids).await?;
    let payload = Value::Object(fields.clone());
    let mut summary = RunSummary::default();

    for record in &datasets {
        summary.datasets += 1;
        info!(dataset = %record.name, id = %record.id, patch = %payload, "patching dataset");

        if options.dry_run {
            info!(dataset = %record.name, "dry run: update not applied");
            summary.pending += 1;
            continue;
        }

        match client.package_patch(&record.id, fields).await {
            Ok(patched) => {
                info!(dataset = %record.name, title = patched.display_title(), "update complete");
                summary.updated += 1;
            }
            Err(err) => {
                report_write_failure(&record.name, &err);
                summary.failed += 1;
            }
        }
    }

    if summary.failed > 0 {
        warn!(failed = summary.failed, "some patches were rejected");
    }
    Ok(summary)
}
