//! JSON files exchanged with operators.
//!
//! Exports are written pretty-printed with four-space indentation so they can
//! be edited by hand and fed back into the import commands.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::CommandError;

/// Tag values for one dataset, as exported by `fetch-tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetTags {
    pub name: String,
    /// Missing on import means "not supplied", which differs from empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_tags: Option<Vec<String>>,
    /// Native catalog tag names (informational).
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Top-level layout of a tag list file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    pub datasets: Vec<DatasetTags>,
}

/// Data dictionary of a dataset's first datastore resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionary {
    pub dataset: String,
    pub dataset_url: String,
    pub resource_id: String,
    pub data_dictionary_edit_url: String,
    pub fields: Vec<Value>,
}

impl DataDictionary {
    /// Builds an entry, deriving the catalog URLs from the host.
    pub fn new(host: &str, dataset: &str, resource_id: &str, fields: Vec<Value>) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            dataset: dataset.to_string(),
            dataset_url: format!("{host}/dataset/{dataset}"),
            resource_id: resource_id.to_string(),
            data_dictionary_edit_url: format!("{host}/dataset/{dataset}/dictionary/{resource_id}"),
            fields,
        }
    }
}

/// Top-level layout of a data dictionary export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryList {
    #[serde(rename = "data-dictionaries")]
    pub data_dictionaries: Vec<DataDictionary>,
}

/// New rolling from/to dates for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingDates {
    pub name: String,
    /// `YYYY-MM-DD`
    pub from_date: String,
    /// `YYYY-MM-DD`
    pub to_date: String,
}

/// Top-level layout of a rolling dates file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingDateList {
    pub datasets: Vec<RollingDates>,
}

/// Reads and parses a JSON input file.
///
/// ## Errors
///
/// Returns [`CommandError::InputFile`] when the file cannot be read and
/// [`CommandError::InputFormat`] when it does not match the expected layout.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let content = fs::read_to_string(path).map_err(|source| CommandError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CommandError::InputFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `value` as four-space indented JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CommandError> {
    let output_err = |source| CommandError::Output {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| output_err(std::io::Error::other(e)))?;
    buf.push(b'\n');

    fs::write(path, buf).map_err(output_err)
}
