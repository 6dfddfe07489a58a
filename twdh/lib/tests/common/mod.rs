//! In-memory catalog shared by the command integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};
use twdh_lib::{
    CatalogClient, CatalogError, DatasetRecord, DatastoreInfo, SearchQuery, SearchResult,
};

/// A catalog backed by a vector of records.
///
/// Writes are applied to the stored records and logged so tests can assert on
/// exactly what was sent.
#[derive(Default)]
pub struct FakeCatalog {
    pub datasets: RefCell<Vec<DatasetRecord>>,
    /// Ids whose writes are rejected with an authorization error.
    pub read_only: HashSet<String>,
    /// Datastore fields keyed by resource id.
    pub dictionaries: HashMap<String, Vec<Value>>,
    pub revisions: RefCell<Vec<(String, Map<String, Value>)>>,
    pub patches: RefCell<Vec<(String, Map<String, Value>)>>,
    pub searches: RefCell<Vec<SearchQuery>>,
}

impl FakeCatalog {
    pub fn with(records: Vec<Value>) -> Self {
        let datasets = records
            .into_iter()
            .map(|raw| serde_json::from_value(raw).expect("valid test record"))
            .collect();
        Self {
            datasets: RefCell::new(datasets),
            ..Default::default()
        }
    }

    pub fn deny_writes(mut self, id: &str) -> Self {
        self.read_only.insert(id.to_string());
        self
    }

    pub fn with_dictionary(mut self, resource_id: &str, fields: Vec<Value>) -> Self {
        self.dictionaries.insert(resource_id.to_string(), fields);
        self
    }

    pub fn get(&self, id: &str) -> DatasetRecord {
        self.datasets
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .expect("dataset exists")
    }

    fn apply(&self, id: &str, fields: &Map<String, Value>) -> Result<DatasetRecord, CatalogError> {
        if self.read_only.contains(id) {
            return Err(CatalogError::Unauthorized {
                message: format!("User not authorized to edit package {id}"),
            });
        }

        let mut datasets = self.datasets.borrow_mut();
        let record = datasets
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CatalogError::NotFound {
                message: "Not found".to_string(),
            })?;

        let mut value = serde_json::to_value(&*record).expect("serializable");
        if let Some(object) = value.as_object_mut() {
            for (key, field) in fields {
                object.insert(key.clone(), field.clone());
            }
        }
        *record = serde_json::from_value(value).expect("still a record");
        Ok(record.clone())
    }
}

impl CatalogClient for FakeCatalog {
    async fn package_show(&self, id: &str) -> Result<DatasetRecord, CatalogError> {
        self.datasets
            .borrow()
            .iter()
            .find(|r| r.id == id || r.name == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                message: "Not found".to_string(),
            })
    }

    async fn package_search(&self, query: &SearchQuery) -> Result<SearchResult, CatalogError> {
        self.searches.borrow_mut().push(query.clone());
        let automatic_only = query.q.as_deref() == Some("update_type:automatic");
        let results: Vec<DatasetRecord> = self
            .datasets
            .borrow()
            .iter()
            .filter(|r| !automatic_only || r.update_type.as_deref() == Some("automatic"))
            .cloned()
            .collect();
        Ok(SearchResult {
            count: results.len() as u64,
            results,
        })
    }

    async fn package_patch(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError> {
        self.patches.borrow_mut().push((id.to_string(), fields.clone()));
        self.apply(id, fields)
    }

    async fn package_revise(
        &self,
        id: &str,
        update: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError> {
        self.revisions.borrow_mut().push((id.to_string(), update.clone()));
        self.apply(id, update)
    }

    async fn datastore_search(&self, resource_id: &str) -> Result<DatastoreInfo, CatalogError> {
        self.dictionaries
            .get(resource_id)
            .map(|fields| DatastoreInfo {
                resource_id: resource_id.to_string(),
                fields: fields.clone(),
            })
            .ok_or_else(|| CatalogError::NotFound {
                message: format!("Resource \"{resource_id}\" was not found."),
            })
    }
}

/// A minimal dataset record.
pub fn dataset(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "title": name.replace('-', " ") })
}
