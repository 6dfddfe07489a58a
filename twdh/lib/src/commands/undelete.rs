//! `undelete`: restore soft-deleted datasets to the active state.

use serde_json::{Map, json};
use tracing::{info, warn};

use crate::client::CatalogClient;
use crate::error::CommandError;

use super::{RunOptions, RunSummary, fetch_datasets, revise};

/// State of one dataset after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetState {
    pub id: String,
    /// `None` when the dataset could not be re-read.
    pub state: Option<String>,
}

/// Outcome of an undelete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndeleteReport {
    pub summary: RunSummary,
    pub states: Vec<DatasetState>,
}

/// Sets `state` to `active` on each dataset in `ids`, then re-reads it.
///
/// The write is issued even for datasets that are already active.
///
/// Every id must resolve before anything is written.
pub async fn run<C: CatalogClient>(
    client: &C,
    ids: &[String],
    options: RunOptions,
) -> Result<UndeleteReport, CommandError> {
    if ids.is_empty() {
        return Err(CommandError::MalformedInput(
            "undelete needs at least one dataset id".to_string(),
        ));
    }

    let datasets = fetch_datasets(client, ids).await?;
    let mut report = UndeleteReport::default();

    for (id, record) in ids.iter().zip(&datasets) {
        report.summary.datasets += 1;
        let current = record.state.as_deref().unwrap_or("unknown");
        info!(dataset = %record.name, id = %id, state = current, "restoring dataset");

        let mut update = Map::new();
        update.insert("state".to_string(), json!("active"));
        revise(client, record, update, options, &mut report.summary).await;

        let state = match client.package_show(id).await {
            Ok(reloaded) => reloaded.state,
            Err(err) => {
                warn!(id = %id, error = %err, "could not re-read dataset");
                None
            }
        };
        report.states.push(DatasetState {
            id: id.clone(),
            state,
        });
    }

    Ok(report)
}
