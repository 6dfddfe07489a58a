//! `fetch-dictionaries`: export datastore data dictionaries to JSON.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::client::{CatalogClient, SearchQuery};
use crate::error::CommandError;
use crate::files::{DataDictionary, DictionaryList, write_json};

use super::{ExportSummary, scan_datasets};

/// `./data-dictionary-list-YYYY-MM-DD.json`
pub fn default_filename(today: NaiveDate) -> String {
    format!("./data-dictionary-list-{}.json", today.format("%Y-%m-%d"))
}

/// Collects the data dictionary of every dataset whose first resource is in
/// the datastore and writes them to `path`.
///
/// A dictionary that cannot be loaded is logged and counted; the export is
/// still written with the remaining entries.
pub async fn run<C: CatalogClient>(
    client: &C,
    host: &str,
    path: &Path,
) -> Result<ExportSummary, CommandError> {
    info!(host, "fetching data dictionaries");
    let datasets = scan_datasets(client, &SearchQuery::all_datasets()).await?;

    let mut summary = ExportSummary {
        path: path.to_path_buf(),
        ..Default::default()
    };
    let mut list = DictionaryList::default();

    for record in &datasets {
        summary.datasets += 1;

        let Some(resource_id) = record.datastore_resource().and_then(|r| r.id.as_deref()) else {
            continue;
        };
        info!(dataset = %record.name, title = record.display_title(), resource_id, "datastore resource");

        match client.datastore_search(resource_id).await {
            Ok(info) => {
                list.data_dictionaries.push(DataDictionary::new(
                    host,
                    &record.name,
                    &info.resource_id,
                    info.fields,
                ));
                summary.exported += 1;
            }
            Err(err) => {
                warn!(dataset = %record.name, resource_id, error = %err, "data dictionary not loaded");
                summary.failed += 1;
            }
        }
    }

    write_json(path, &list)?;
    Ok(summary)
}
