//! `fetch-tags`: export primary, secondary and native tags to JSON.

use std::path::Path;

use tracing::{info, warn};

use crate::client::{CatalogClient, SearchQuery};
use crate::error::CommandError;
use crate::files::{DatasetTags, TagList, write_json};
use crate::record::DatasetRecord;

use super::{ExportSummary, scan_datasets};

/// File written when no `--filename` is given.
pub const DEFAULT_FILENAME: &str = "./taglist.json";

/// Tag values of one dataset, with missing lists exported as empty.
pub fn tags_of(record: &DatasetRecord) -> DatasetTags {
    DatasetTags {
        name: record.name.clone(),
        primary_tags: Some(record.primary_tags.clone().unwrap_or_default()),
        secondary_tags: Some(record.secondary_tags.clone().unwrap_or_default()),
        tags: record.tag_names(),
    }
}

/// Writes the tags of every dataset to `path`.
pub async fn run<C: CatalogClient>(client: &C, path: &Path) -> Result<ExportSummary, CommandError> {
    let datasets = scan_datasets(client, &SearchQuery::all_datasets()).await?;
    let mut list = TagList::default();

    for record in &datasets {
        info!(dataset = %record.name, title = record.display_title(), "collecting tags");
        let tags = tags_of(record);

        if tags.primary_tags.as_ref().is_none_or(Vec::is_empty) {
            warn!(dataset = %record.name, "no primary tags set");
        }
        if tags.secondary_tags.as_ref().is_none_or(Vec::is_empty) {
            warn!(dataset = %record.name, "no secondary tags set");
        }
        if tags.tags.is_empty() {
            warn!(dataset = %record.name, "no native tags set");
        }

        list.datasets.push(tags);
    }

    write_json(path, &list)?;
    Ok(ExportSummary {
        datasets: datasets.len(),
        exported: list.datasets.len(),
        failed: 0,
        path: path.to_path_buf(),
    })
}
