//! `update-rolling-dates`: import from/to dates from a JSON file.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::client::CatalogClient;
use crate::error::CommandError;
use crate::files::{RollingDateList, RollingDates, read_json};

use super::{RunOptions, RunSummary, revise, show_or_count};

const ROLLING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the field update for one entry.
///
/// The range is written as `"<from> - <to>"` using the same `YYYY-MM-DD`
/// form as the from/to fields, and any `end_date` is cleared.
///
/// ## Errors
///
/// Returns [`CommandError::MalformedInput`] when either date is not
/// `YYYY-MM-DD`.
pub fn rolling_update(entry: &RollingDates) -> Result<Map<String, Value>, CommandError> {
    let parse = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value.trim(), ROLLING_DATE_FORMAT).map_err(|e| {
            CommandError::MalformedInput(format!("{}: {field} '{value}': {e}", entry.name))
        })
    };
    let from = parse("from_date", &entry.from_date)?;
    let to = parse("to_date", &entry.to_date)?;

    let mut update = Map::new();
    update.insert(
        "date_range".to_string(),
        json!(format!(
            "{} - {}",
            from.format(ROLLING_DATE_FORMAT),
            to.format(ROLLING_DATE_FORMAT)
        )),
    );
    update.insert("from_date".to_string(), json!(entry.from_date.trim()));
    update.insert("to_date".to_string(), json!(entry.to_date.trim()));
    update.insert("end_date".to_string(), json!(""));
    Ok(update)
}

/// Applies every entry of the rolling dates file at `path`.
///
/// Unknown datasets are counted as not found; entries with invalid dates are
/// counted as failed. Neither stops the batch.
pub async fn run<C: CatalogClient>(
    client: &C,
    path: &Path,
    options: RunOptions,
) -> Result<RunSummary, CommandError> {
    let list: RollingDateList = read_json(path)?;
    info!(path = %path.display(), entries = list.datasets.len(), "updating rolling dates");

    let mut summary = RunSummary::default();
    for entry in &list.datasets {
        let Some(record) = show_or_count(client, &entry.name, &mut summary).await else {
            continue;
        };
        info!(dataset = %record.name, title = record.display_title(), "updating rolling dates");

        let update = match rolling_update(entry) {
            Ok(update) => update,
            Err(err) => {
                warn!(dataset = %record.name, error = %err, "invalid rolling dates");
                summary.failed += 1;
                continue;
            }
        };
        revise(client, &record, update, options, &mut summary).await;
    }

    Ok(summary)
}
