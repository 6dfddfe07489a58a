//! `update-tags`: import primary and secondary tags from a tag list file.

use std::path::Path;

use serde_json::{Map, json};
use tracing::{debug, info, warn};

use crate::client::CatalogClient;
use crate::error::CommandError;
use crate::files::{TagList, read_json};

use super::{RunOptions, RunSummary, revise, show_or_count};

/// Applies every entry of the tag list at `path`.
///
/// Entries whose dataset cannot be found are counted and skipped. A missing
/// tag array is written as empty.
pub async fn run<C: CatalogClient>(
    client: &C,
    path: &Path,
    options: RunOptions,
) -> Result<RunSummary, CommandError> {
    let list: TagList = read_json(path)?;
    info!(path = %path.display(), entries = list.datasets.len(), "updating tags");

    let mut summary = RunSummary::default();
    for entry in &list.datasets {
        let Some(record) = show_or_count(client, &entry.name, &mut summary).await else {
            continue;
        };
        info!(dataset = %record.name, title = record.display_title(), "updating tags");

        let primary = entry.primary_tags.clone().unwrap_or_else(|| {
            warn!(dataset = %record.name, "no primary_tags field present");
            Vec::new()
        });
        let secondary = entry.secondary_tags.clone().unwrap_or_else(|| {
            warn!(dataset = %record.name, "no secondary_tags field present");
            Vec::new()
        });
        info!(dataset = %record.name, ?primary, ?secondary, "new tags");
        debug!(
            dataset = %record.name,
            combined = ?primary.iter().chain(&secondary).collect::<Vec<_>>(),
            "combined tags"
        );

        let mut update = Map::new();
        update.insert("primary_tags".to_string(), json!(primary));
        update.insert("secondary_tags".to_string(), json!(secondary));
        revise(client, &record, update, options, &mut summary).await;
    }

    Ok(summary)
}
