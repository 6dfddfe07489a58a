//! Maintenance library for the Texas Water Data Hub catalog.
//!
//! This library holds everything the `twdhcli` binary does besides argument
//! parsing and console output: the catalog client, the dataset record schema,
//! the date-range recalculation rule and the bulk command drivers.
//!
//! ## Core Types
//!
//! - [`DatasetRecord`] - Partial schema of a catalog dataset
//! - [`UpdateFrequency`] - How often a dataset's data changes
//! - [`RunSummary`] - Outcome counters for one command run
//!
//! ## Catalog Access
//!
//! - [`CatalogClient`] - The catalog actions the commands use
//! - [`RemoteCatalog`] - HTTP implementation against the action API
//!
//! ## Date Ranges
//!
//! - [`recalculate`] - Decide whether a dataset's date range needs rewriting
//!
//! ## Commands
//!
//! The [`commands`] module has one submodule per operator action, each with a
//! `run` function taking a [`CatalogClient`] and [`RunOptions`].

pub mod client;
pub mod commands;
pub mod config;
pub mod date_range;
mod error;
pub mod files;
mod record;

pub use client::{CatalogClient, ROW_LIMIT, RemoteCatalog, SearchQuery};
pub use commands::{ExportSummary, RunOptions, RunSummary, fetch_datasets, pluralize};
pub use config::{ConfigFile, Settings, SettingsOverrides};
pub use date_range::{RangeDecision, SkipReason, recalculate};
pub use error::{CatalogError, CommandError, ConfigError, ErrorKind};
pub use record::{
    DatasetRecord, DatastoreInfo, Gazetteer, Resource, SearchResult, Tag, UpdateFrequency,
};
