//! `update-dates`: roll the date range of automatically updated datasets.

use chrono::NaiveDate;
use serde_json::{Map, json};
use tracing::{info, warn};

use crate::client::{CatalogClient, SearchQuery};
use crate::date_range::{RangeDecision, SkipReason, parse_from_date, recalculate};
use crate::error::CommandError;

use super::{RunOptions, RunSummary, revise, scan_datasets};

/// Recalculates and writes the date range of every dataset with
/// `update_type:automatic`, as of `today`.
pub async fn run<C: CatalogClient>(
    client: &C,
    today: NaiveDate,
    options: RunOptions,
) -> Result<RunSummary, CommandError> {
    info!(%today, "updating date ranges");
    let datasets = scan_datasets(client, &SearchQuery::automatic_updates()).await?;

    let mut summary = RunSummary::default();
    for record in &datasets {
        summary.datasets += 1;
        info!(
            dataset = %record.name,
            title = record.display_title(),
            update_type = record.update_type.as_deref().unwrap_or(""),
            update_frequency = record.update_frequency.as_deref().unwrap_or(""),
            "checking date range"
        );

        let from_date = record.from_date.as_deref().and_then(parse_from_date);
        let decision = recalculate(
            record.frequency(),
            from_date,
            today,
            record.date_range.as_deref(),
        );

        let new_range = match decision {
            RangeDecision::NewRange(text) => text,
            RangeDecision::Skip(reason) => {
                match reason {
                    SkipReason::FromAfterTo | SkipReason::MissingFromDate => {
                        warn!(dataset = %record.name, %reason, "skipping update")
                    }
                    _ => info!(dataset = %record.name, %reason, "skipping update"),
                }
                summary.skipped += 1;
                continue;
            }
        };

        info!(
            dataset = %record.name,
            old = record.date_range.as_deref().unwrap_or(""),
            new = %new_range,
            "date range changed"
        );
        let mut update = Map::new();
        update.insert("date_range".to_string(), json!(new_range));
        revise(client, record, update, options, &mut summary).await;
    }

    Ok(summary)
}
