//! Partial schema for catalog dataset records.
//!
//! Only the fields the maintenance commands read or write are typed. Every
//! other key returned by the catalog lands in [`DatasetRecord::extra`] and is
//! serialized back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How often a dataset's underlying data changes.
///
/// The string forms are the values the catalog schema stores in
/// `update_frequency`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum UpdateFrequency {
    #[serde(rename = "real-time")]
    #[strum(serialize = "real-time")]
    RealTime,
    #[serde(rename = "15 minutes or less")]
    #[strum(serialize = "15 minutes or less")]
    FifteenMinutesOrLess,
    #[serde(rename = "hourly")]
    #[strum(serialize = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    #[strum(serialize = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    #[strum(serialize = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    #[strum(serialize = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    #[strum(serialize = "quarterly")]
    Quarterly,
    #[serde(rename = "every 6 months")]
    #[strum(serialize = "every 6 months")]
    EverySixMonths,
    #[serde(rename = "annually")]
    #[strum(serialize = "annually")]
    Annually,
}

impl UpdateFrequency {
    /// Parses a stored frequency, treating unknown values as absent.
    pub fn from_catalog(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.trim().parse().ok())
    }
}

/// A native catalog tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resource attached to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Whether the resource has a datastore table (and so a data dictionary).
    #[serde(default)]
    pub datastore_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geometry payloads attached by the gazetteer extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub spatial_full: Option<String>,
    #[serde(default)]
    pub spatial_simp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dataset as returned by `package_show` and `package_search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,
    /// Kept as text so that unknown values survive a round trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gazetteer: Option<Gazetteer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetRecord {
    /// Title for log lines, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Parsed update frequency, `None` when absent or not a known value.
    pub fn frequency(&self) -> Option<UpdateFrequency> {
        UpdateFrequency::from_catalog(self.update_frequency.as_deref())
    }

    /// Names of the native catalog tags.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .map(|tag| tag.name.clone())
            .collect()
    }

    /// The first resource, if it has a datastore table.
    pub fn datastore_resource(&self) -> Option<&Resource> {
        self.resources
            .as_ref()
            .and_then(|resources| resources.first())
            .filter(|resource| resource.datastore_active)
    }
}

/// Result payload of `package_search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    pub count: u64,
    #[serde(default)]
    pub results: Vec<DatasetRecord>,
}

/// Result payload of `datastore_search`, reduced to the data dictionary.
#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreInfo {
    pub resource_id: String,
    #[serde(default)]
    pub fields: Vec<Value>,
}
