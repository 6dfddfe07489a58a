//! Integration tests for the bulk command drivers.
//!
//! Each test runs a driver end to end against the in-memory catalog in
//! `common` and checks both the returned counters and the writes sent.

mod common;

use std::fs;

use chrono::NaiveDate;
use common::{FakeCatalog, dataset};
use serde_json::json;
use tempfile::TempDir;
use twdh_lib::commands::{
    fetch_dictionaries, fetch_tags, patch, show, spatial_stats, undelete, update_dates,
    update_rolling_dates, update_tags,
};
use twdh_lib::files::{DictionaryList, TagList, read_json};
use twdh_lib::{CommandError, ErrorKind, RunOptions, RunSummary, fetch_datasets};

const LIVE: RunOptions = RunOptions { dry_run: false };
const DRY_RUN: RunOptions = RunOptions { dry_run: true };

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn automatic(id: &str, frequency: &str, from: &str, range: Option<&str>) -> serde_json::Value {
    let mut record = dataset(id, id);
    record["update_type"] = json!("automatic");
    record["update_frequency"] = json!(frequency);
    record["from_date"] = json!(from);
    if let Some(range) = range {
        record["date_range"] = json!(range);
    }
    record
}

fn feb_10_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
}

#[tokio::test]
async fn explicit_ids_abort_on_first_unknown_id() {
    let catalog = FakeCatalog::with(vec![dataset("1", "wells"), dataset("2", "springs")]);

    let found = fetch_datasets(&catalog, &ids(&["springs", "1"])).await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, "2");

    let err = fetch_datasets(&catalog, &ids(&["1", "missing", "2"]))
        .await
        .unwrap_err();
    match err {
        CommandError::Lookup { id, source } => {
            assert_eq!(id, "missing");
            assert_eq!(source.kind(), ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_catalog_is_an_error() {
    let catalog = FakeCatalog::default();
    let err = fetch_datasets(&catalog, &[]).await.unwrap_err();
    assert!(matches!(err, CommandError::NoDatasets));
    assert_eq!(
        catalog.searches.borrow()[0].fq.as_deref(),
        Some("type:dataset")
    );
}

#[tokio::test]
async fn show_returns_all_datasets_without_ids() {
    let catalog = FakeCatalog::with(vec![dataset("1", "wells"), dataset("2", "springs")]);
    let records = show::run(&catalog, &[]).await.unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["wells", "springs"]);
}

#[tokio::test]
async fn spatial_stats_measures_gazetteer_payloads() {
    let mut spatial = dataset("1", "basins");
    spatial["gazetteer"] = json!({ "spatial_full": "0123456789", "spatial_simp": "01234" });
    let catalog = FakeCatalog::with(vec![spatial, dataset("2", "no-geometry")]);

    let report = spatial_stats::run(&catalog, &[]).await.unwrap();
    assert_eq!(report.spatial_count(), 1);
    assert_eq!(report.nonspatial_count(), 1);
    assert_eq!(report.full_total(), 10);
    assert_eq!(report.reduction_percent(), Some(50.0));
}

#[tokio::test]
async fn patch_applies_fields_and_counts_rejections() {
    let catalog = FakeCatalog::with(vec![dataset("1", "wells"), dataset("2", "springs")])
        .deny_writes("2");
    let fields = patch::parse_patch_data(r#"{"data_admin_approved": "approved"}"#).unwrap();

    let summary = patch::run(&catalog, &ids(&["1", "2"]), &fields, LIVE)
        .await
        .unwrap();

    assert_eq!(summary.datasets, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(catalog.get("1").extra["data_admin_approved"], json!("approved"));
    assert!(catalog.get("2").extra.get("data_admin_approved").is_none());
}

#[tokio::test]
async fn patch_dry_run_sends_nothing() {
    let catalog = FakeCatalog::with(vec![dataset("1", "wells")]);
    let fields = patch::parse_patch_data(r#"{"notes": "x"}"#).unwrap();

    let summary = patch::run(&catalog, &[], &fields, DRY_RUN).await.unwrap();
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.updated, 0);
    assert!(catalog.patches.borrow().is_empty());
}

#[tokio::test]
async fn update_dates_rewrites_only_stale_ranges() {
    let catalog = FakeCatalog::with(vec![
        automatic("stale", "monthly", "2015-10-01 00:00:00", Some("10/01/2015 - 12/01/2023")),
        automatic("current", "quarterly", "2015-10-01 00:00:00", Some("10/01/2015 - 11/01/2023")),
        automatic("blank", "monthly", "2015-10-01 00:00:00", Some("")),
        automatic("unknown", "fortnightly", "2015-10-01 00:00:00", Some("x")),
        automatic("future", "annually", "2024-01-15", Some("01/15/2024 - 01/15/2024")),
        automatic("locked", "daily", "2020-01-01", Some("01/01/2020 - 01/01/2024")),
        dataset("manual", "manual"),
    ])
    .deny_writes("locked");

    let summary = update_dates::run(&catalog, feb_10_2024(), LIVE).await.unwrap();

    assert_eq!(summary.datasets, 6);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        catalog.get("stale").date_range.as_deref(),
        Some("10/01/2015 - 01/01/2024")
    );
    assert_eq!(
        catalog.get("locked").date_range.as_deref(),
        Some("01/01/2020 - 01/01/2024")
    );

    let revisions = catalog.revisions.borrow();
    let revised: Vec<_> = revisions.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(revised, vec!["stale", "locked"]);
    assert_eq!(revisions[1].1["date_range"], json!("01/01/2020 - 02/10/2024"));
}

#[tokio::test]
async fn update_dates_is_idempotent() {
    let catalog = FakeCatalog::with(vec![automatic(
        "gauges",
        "real-time",
        "2019-03-04",
        Some("03/04/2019 - 01/01/2024"),
    )]);

    let first = update_dates::run(&catalog, feb_10_2024(), LIVE).await.unwrap();
    let second = update_dates::run(&catalog, feb_10_2024(), LIVE).await.unwrap();

    assert_eq!(first.updated, 1);
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 1);
}

#[tokio::test]
async fn update_dates_dry_run_leaves_catalog_untouched() {
    let catalog = FakeCatalog::with(vec![automatic(
        "gauges",
        "hourly",
        "2019-03-04",
        Some("03/04/2019 - 01/01/2024"),
    )]);

    let summary = update_dates::run(&catalog, feb_10_2024(), DRY_RUN).await.unwrap();

    assert_eq!(summary.pending, 1);
    assert!(catalog.revisions.borrow().is_empty());
    assert_eq!(
        catalog.get("gauges").date_range.as_deref(),
        Some("03/04/2019 - 01/01/2024")
    );
}

#[tokio::test]
async fn update_dates_with_no_automatic_datasets_is_a_quiet_run() {
    let catalog = FakeCatalog::with(vec![dataset("manual", "manual")]);

    let summary = update_dates::run(&catalog, feb_10_2024(), LIVE).await.unwrap();

    assert_eq!(summary, RunSummary::default());
    assert!(catalog.revisions.borrow().is_empty());
    assert_eq!(
        catalog.searches.borrow()[0].q.as_deref(),
        Some("update_type:automatic")
    );
}

#[tokio::test]
async fn update_tags_imports_file_and_counts_missing_datasets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taglist.json");
    fs::write(
        &path,
        json!({
            "datasets": [
                { "name": "wells", "primary_tags": ["Groundwater"], "secondary_tags": ["Wells"] },
                { "name": "springs", "primary_tags": ["Groundwater"] },
                { "name": "gone", "primary_tags": [] }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let catalog = FakeCatalog::with(vec![dataset("1", "wells"), dataset("2", "springs")]);
    let summary = update_tags::run(&catalog, &path, LIVE).await.unwrap();

    assert_eq!(summary.datasets, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.not_found, 1);
    assert_eq!(
        catalog.get("1").secondary_tags,
        Some(vec!["Wells".to_string()])
    );
    assert_eq!(catalog.get("2").secondary_tags, Some(vec![]));
}

#[tokio::test]
async fn update_tags_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taglist.json");
    fs::write(&path, "{ not json").unwrap();

    let catalog = FakeCatalog::with(vec![dataset("1", "wells")]);
    let err = update_tags::run(&catalog, &path, LIVE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}

#[tokio::test]
async fn undelete_revises_every_dataset_and_reports_state() {
    let mut deleted = dataset("1", "wells");
    deleted["state"] = json!("deleted");
    let mut active = dataset("2", "springs");
    active["state"] = json!("active");
    let catalog = FakeCatalog::with(vec![deleted, active]);

    let report = undelete::run(&catalog, &ids(&["1", "springs"]), LIVE)
        .await
        .unwrap();

    assert_eq!(report.summary.updated, 2);
    assert_eq!(report.summary.skipped, 0);
    assert_eq!(report.states[0].state.as_deref(), Some("active"));
    assert_eq!(report.states[1].id, "springs");
    assert_eq!(report.states[1].state.as_deref(), Some("active"));

    let revisions = catalog.revisions.borrow();
    let revised: Vec<_> = revisions.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(revised, vec!["1", "2"]);
    assert!(revisions.iter().all(|(_, update)| update["state"] == json!("active")));
}

#[tokio::test]
async fn undelete_aborts_before_writing_when_an_id_is_unknown() {
    let mut deleted = dataset("1", "wells");
    deleted["state"] = json!("deleted");
    let catalog = FakeCatalog::with(vec![deleted]);

    let err = undelete::run(&catalog, &ids(&["1", "nope"]), LIVE)
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::Lookup { .. }));
    assert!(catalog.revisions.borrow().is_empty());
}

#[tokio::test]
async fn update_rolling_dates_counts_each_outcome() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rolling.json");
    fs::write(
        &path,
        json!({
            "datasets": [
                { "name": "wells", "from_date": "2019-01-01", "to_date": "2024-06-30" },
                { "name": "springs", "from_date": "06/30/2024", "to_date": "2024-06-30" },
                { "name": "gone", "from_date": "2019-01-01", "to_date": "2024-06-30" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let catalog = FakeCatalog::with(vec![dataset("1", "wells"), dataset("2", "springs")]);
    let summary = update_rolling_dates::run(&catalog, &path, LIVE).await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.not_found, 1);
    let wells = catalog.get("1");
    assert_eq!(wells.date_range.as_deref(), Some("2019-01-01 - 2024-06-30"));
    assert_eq!(wells.to_date.as_deref(), Some("2024-06-30"));
    assert_eq!(wells.extra["end_date"], json!(""));
}

#[tokio::test]
async fn fetch_tags_writes_tag_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taglist.json");
    let mut wells = dataset("1", "wells");
    wells["primary_tags"] = json!(["Groundwater"]);
    wells["tags"] = json!([{ "name": "aquifer" }]);
    let catalog = FakeCatalog::with(vec![wells, dataset("2", "springs")]);

    let summary = fetch_tags::run(&catalog, &path).await.unwrap();
    assert_eq!(summary.exported, 2);

    let list: TagList = read_json(&path).unwrap();
    assert_eq!(list.datasets[0].tags, vec!["aquifer".to_string()]);
    assert_eq!(list.datasets[1].primary_tags, Some(vec![]));
}

#[tokio::test]
async fn fetch_dictionaries_exports_datastore_resources_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dd.json");

    let mut wells = dataset("1", "wells");
    wells["resources"] = json!([{ "id": "r-wells", "datastore_active": true }]);
    let mut springs = dataset("2", "springs");
    springs["resources"] = json!([{ "id": "r-springs", "datastore_active": false }]);
    let mut lakes = dataset("3", "lakes");
    lakes["resources"] = json!([{ "id": "r-lakes", "datastore_active": true }]);

    let catalog = FakeCatalog::with(vec![wells, springs, lakes])
        .with_dictionary("r-wells", vec![json!({ "id": "depth", "type": "numeric" })]);

    let summary = fetch_dictionaries::run(&catalog, "https://hub.example.org", &path)
        .await
        .unwrap();

    assert_eq!(summary.datasets, 3);
    assert_eq!(summary.exported, 1);
    assert_eq!(summary.failed, 1);

    let list: DictionaryList = read_json(&path).unwrap();
    let dd = &list.data_dictionaries[0];
    assert_eq!(dd.dataset, "wells");
    assert_eq!(
        dd.data_dictionary_edit_url,
        "https://hub.example.org/dataset/wells/dictionary/r-wells"
    );
    assert_eq!(dd.fields[0]["id"], json!("depth"));
}

#[tokio::test]
async fn exports_from_an_empty_catalog_write_empty_files() {
    let dir = TempDir::new().unwrap();
    let tags_path = dir.path().join("taglist.json");
    let dd_path = dir.path().join("dd.json");
    let catalog = FakeCatalog::default();

    let tags = fetch_tags::run(&catalog, &tags_path).await.unwrap();
    assert_eq!(tags.exported, 0);
    let list: TagList = read_json(&tags_path).unwrap();
    assert!(list.datasets.is_empty());

    let dictionaries = fetch_dictionaries::run(&catalog, "https://hub.example.org", &dd_path)
        .await
        .unwrap();
    assert_eq!(dictionaries.datasets, 0);
    let text = fs::read_to_string(&dd_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, json!({ "data-dictionaries": [] }));
}
