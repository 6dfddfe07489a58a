//! `spatial-stats`: size statistics for gazetteer geometry payloads.
//!
//! The gazetteer extension stores a full-resolution geometry and a simplified
//! one per dataset. The report shows how much the simplification saves.

use tracing::info;

use crate::client::CatalogClient;
use crate::error::CommandError;
use crate::record::DatasetRecord;

use super::fetch_datasets;

/// Geometry sizes for one dataset, in UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialEntry {
    pub name: String,
    pub full_bytes: Option<usize>,
    pub simp_bytes: Option<usize>,
}

impl SpatialEntry {
    /// Measures the gazetteer payloads of a record.
    pub fn from_record(record: &DatasetRecord) -> Self {
        let gazetteer = record.gazetteer.as_ref();
        Self {
            name: record.name.clone(),
            full_bytes: gazetteer.and_then(|g| g.spatial_full.as_ref()).map(String::len),
            simp_bytes: gazetteer.and_then(|g| g.spatial_simp.as_ref()).map(String::len),
        }
    }

    /// A dataset counts as spatial when both geometries are present.
    pub fn is_spatial(&self) -> bool {
        self.full_bytes.is_some() && self.simp_bytes.is_some()
    }

    /// Size saved by simplification, as a percentage of the full geometry.
    pub fn reduction_percent(&self) -> Option<f64> {
        match (self.full_bytes, self.simp_bytes) {
            (Some(full), Some(simp)) => reduction_percent(full, simp),
            _ => None,
        }
    }
}

/// Aggregate geometry statistics for a set of datasets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialReport {
    pub entries: Vec<SpatialEntry>,
}

impl SpatialReport {
    pub fn spatial_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_spatial()).count()
    }

    pub fn nonspatial_count(&self) -> usize {
        self.entries.len() - self.spatial_count()
    }

    /// Total full-geometry bytes over every dataset that has one.
    pub fn full_total(&self) -> usize {
        self.entries.iter().filter_map(|e| e.full_bytes).sum()
    }

    /// Total simplified-geometry bytes over every dataset that has one.
    pub fn simp_total(&self) -> usize {
        self.entries.iter().filter_map(|e| e.simp_bytes).sum()
    }

    /// Overall reduction, `None` when there is no full geometry at all.
    pub fn reduction_percent(&self) -> Option<f64> {
        reduction_percent(self.full_total(), self.simp_total())
    }
}

fn reduction_percent(full: usize, simp: usize) -> Option<f64> {
    (full > 0).then(|| 100.0 - (simp as f64 / full as f64) * 100.0)
}

/// Measures the requested datasets (or all datasets when `ids` is empty).
pub async fn run<C: CatalogClient>(
    client: &C,
    ids: &[String],
) -> Result<SpatialReport, CommandError> {
    let datasets = fetch_datasets(client, ids).await?;

    let entries = datasets
        .iter()
        .map(|record| {
            let entry = SpatialEntry::from_record(record);
            info!(
                dataset = %entry.name,
                spatial_full = ?entry.full_bytes,
                spatial_simp = ?entry.simp_bytes,
                "measured geometry"
            );
            entry
        })
        .collect();

    Ok(SpatialReport { entries })
}
