//! Bulk maintenance commands.
//!
//! Every command follows the same shape: resolve a set of datasets, apply a
//! per-record transform, issue a write (unless dry-run) and tally the outcome
//! in a [`RunSummary`]. Write failures are logged and counted; they never
//! abort the batch.

pub mod fetch_dictionaries;
pub mod fetch_tags;
pub mod patch;
pub mod show;
pub mod spatial_stats;
pub mod undelete;
pub mod update_dates;
pub mod update_rolling_dates;
pub mod update_tags;

use std::ops::AddAssign;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::{CatalogClient, SearchQuery};
use crate::error::{CatalogError, CommandError, ErrorKind};
use crate::record::DatasetRecord;

/// Options shared by every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Run every read and transform but issue no writes.
    pub dry_run: bool,
}

/// Outcome counters for one command run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Datasets loaded and examined.
    pub datasets: usize,
    /// Writes the catalog accepted.
    pub updated: usize,
    /// Writes withheld because of dry-run.
    pub pending: usize,
    /// Datasets that needed no write.
    pub skipped: usize,
    /// Names from an input file that did not resolve.
    pub not_found: usize,
    /// Writes the catalog rejected.
    pub failed: usize,
}

impl RunSummary {
    /// Human-readable summary lines, omitting zero error counters.
    ///
    /// ## Examples
    ///
    /// ```
    /// use twdh_lib::RunSummary;
    ///
    /// let summary = RunSummary { datasets: 2, updated: 1, skipped: 1, ..Default::default() };
    /// assert_eq!(
    ///     summary.lines(),
    ///     vec!["1 dataset updated", "1 dataset skipped", "2 datasets checked"]
    /// );
    /// ```
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} updated", pluralize(self.updated, "dataset"))];
        if self.pending > 0 {
            lines.push(format!("{} not updated (dry run)", pluralize(self.pending, "dataset")));
        }
        lines.push(format!("{} skipped", pluralize(self.skipped, "dataset")));
        if self.failed > 0 {
            lines.push(format!("{} failed", pluralize(self.failed, "dataset")));
        }
        if self.not_found > 0 {
            lines.push(format!("{} not found", pluralize(self.not_found, "dataset")));
        }
        lines.push(format!("{} checked", pluralize(self.datasets, "dataset")));
        lines
    }
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.datasets += other.datasets;
        self.updated += other.updated;
        self.pending += other.pending;
        self.skipped += other.skipped;
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

/// Outcome of a command that writes a local export file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Datasets examined.
    pub datasets: usize,
    /// Entries written to the file.
    pub exported: usize,
    /// Datasets whose entry could not be built.
    pub failed: usize,
    /// Where the export was written.
    pub path: PathBuf,
}

/// `"1 dataset"`, `"2 datasets"`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Resolves the datasets a command operates on.
///
/// With explicit ids each one is looked up in turn and the first failure
/// aborts. Without ids every dataset in the catalog is returned.
///
/// ## Errors
///
/// - [`CommandError::Lookup`] when an explicit id cannot be loaded
/// - [`CommandError::NoDatasets`] when the catalog search matches nothing
/// - [`CommandError::Catalog`] when the search itself fails
pub async fn fetch_datasets<C: CatalogClient>(
    client: &C,
    ids: &[String],
) -> Result<Vec<DatasetRecord>, CommandError> {
    if ids.is_empty() {
        info!("fetching all datasets");
        return search_datasets(client, &SearchQuery::all_datasets()).await;
    }

    info!(ids = %ids.join(" "), "fetching datasets");
    let mut datasets = Vec::with_capacity(ids.len());
    for id in ids {
        let record = client
            .package_show(id)
            .await
            .map_err(|source| CommandError::Lookup {
                id: id.clone(),
                source,
            })?;
        datasets.push(record);
    }
    Ok(datasets)
}

/// Runs a search, treating an empty result as an error.
async fn search_datasets<C: CatalogClient>(
    client: &C,
    query: &SearchQuery,
) -> Result<Vec<DatasetRecord>, CommandError> {
    let datasets = scan_datasets(client, query).await?;
    if datasets.is_empty() {
        return Err(CommandError::NoDatasets);
    }
    Ok(datasets)
}

/// Runs a search for a batch command. An empty catalog is a normal state
/// and yields an empty batch.
pub(crate) async fn scan_datasets<C: CatalogClient>(
    client: &C,
    query: &SearchQuery,
) -> Result<Vec<DatasetRecord>, CommandError> {
    let result = client.package_search(query).await?;
    if result.results.is_empty() {
        info!("no datasets matched");
    } else {
        info!(count = result.results.len(), "datasets loaded");
    }
    Ok(result.results)
}

/// Looks up a dataset named in an input file, counting it as not found on
/// failure.
pub(crate) async fn show_or_count<C: CatalogClient>(
    client: &C,
    name: &str,
    summary: &mut RunSummary,
) -> Option<DatasetRecord> {
    match client.package_show(name).await {
        Ok(record) => {
            summary.datasets += 1;
            Some(record)
        }
        Err(err) => {
            summary.not_found += 1;
            warn!(dataset = name, kind = %err.kind(), error = %err, "dataset not found");
            None
        }
    }
}

/// Applies `update` to `record` via `package_revise`, honoring dry-run and
/// tallying the result.
pub(crate) async fn revise<C: CatalogClient>(
    client: &C,
    record: &DatasetRecord,
    update: Map<String, Value>,
    options: RunOptions,
    summary: &mut RunSummary,
) -> Option<DatasetRecord> {
    if options.dry_run {
        info!(dataset = %record.name, "dry run: update not applied");
        summary.pending += 1;
        return None;
    }

    match client.package_revise(&record.id, &update).await {
        Ok(revised) => {
            info!(dataset = %record.name, "update complete");
            summary.updated += 1;
            Some(revised)
        }
        Err(err) => {
            report_write_failure(&record.name, &err);
            summary.failed += 1;
            None
        }
    }
}

pub(crate) fn report_write_failure(name: &str, err: &CatalogError) {
    match err.kind() {
        ErrorKind::Unauthorized => {
            warn!(dataset = name, error = %err, "authorization failure: update not completed")
        }
        kind => warn!(dataset = name, %kind, error = %err, "update not completed"),
    }
}
