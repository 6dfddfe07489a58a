//! Catalog action API client.
//!
//! The catalog exposes a JSON-over-HTTP action API: every call is a `POST` to
//! `{host}/api/3/action/{action}` and every response is wrapped in an
//! envelope of the form `{"success": bool, "result": ..., "error": {...}}`.
//! Command drivers only see the [`CatalogClient`] trait, so tests can swap in
//! an in-memory catalog.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{Span, debug, instrument};
use url::Url;

use crate::error::CatalogError;
use crate::record::{DatasetRecord, DatastoreInfo, SearchResult};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Row limit used for full-catalog scans.
pub const ROW_LIMIT: u32 = 100_000;

/// Longest error body echoed back in an [`CatalogError::HttpStatus`].
const MAX_ERROR_BODY: usize = 300;

/// Filter parameters for `package_search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text Solr query (`q`).
    pub q: Option<String>,
    /// Filter query (`fq`).
    pub fq: Option<String>,
    /// Maximum number of rows to return.
    pub rows: u32,
}

impl SearchQuery {
    /// Every record of type `dataset`.
    pub fn all_datasets() -> Self {
        Self {
            q: None,
            fq: Some("type:dataset".to_string()),
            rows: ROW_LIMIT,
        }
    }

    /// Datasets whose date range is maintained automatically.
    pub fn automatic_updates() -> Self {
        Self {
            q: Some("update_type:automatic".to_string()),
            fq: None,
            rows: ROW_LIMIT,
        }
    }

    fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(q) = &self.q {
            body.insert("q".to_string(), json!(q));
        }
        if let Some(fq) = &self.fq {
            body.insert("fq".to_string(), json!(fq));
        }
        body.insert("rows".to_string(), json!(self.rows));
        Value::Object(body)
    }
}

/// The catalog operations the maintenance commands rely on.
///
/// Calls are awaited one at a time; implementations need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait CatalogClient {
    /// Loads one dataset by id or name.
    async fn package_show(&self, id: &str) -> Result<DatasetRecord, CatalogError>;

    /// Runs a search and returns the matching datasets.
    async fn package_search(&self, query: &SearchQuery) -> Result<SearchResult, CatalogError>;

    /// Patches the given top-level fields onto a dataset.
    async fn package_patch(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError>;

    /// Revises the dataset matching `id` with the given field updates.
    async fn package_revise(
        &self,
        id: &str,
        update: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError>;

    /// Loads the datastore field definitions for a resource.
    async fn datastore_search(&self, resource_id: &str) -> Result<DatastoreInfo, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ActionErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ActionErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    /// Validation errors carry per-field messages instead of `message`.
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ActionErrorBody {
    fn into_error(self) -> CatalogError {
        let message = match self.message {
            Some(message) => message,
            None if !self.fields.is_empty() => Value::Object(self.fields).to_string(),
            None => "no message".to_string(),
        };

        match self.kind.as_deref() {
            Some("Not Found Error") => CatalogError::NotFound { message },
            Some("Authorization Error") => CatalogError::Unauthorized { message },
            Some("Validation Error") => CatalogError::Validation { message },
            Some(kind) => CatalogError::Action {
                kind: kind.to_string(),
                message,
            },
            None => CatalogError::Action {
                kind: "Unknown Error".to_string(),
                message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReviseResult {
    package: DatasetRecord,
}

/// HTTP implementation of [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteCatalog {
    /// Builds a client for `host` authenticating with `api_key`.
    ///
    /// No request is sent; use [`RemoteCatalog::status`] to check the host.
    ///
    /// ## Errors
    ///
    /// Returns an error if the host is not a base URL or the key cannot be
    /// sent as a header.
    pub fn new(host: &Url, api_key: &str) -> Result<Self, CatalogError> {
        if host.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(host.to_string()));
        }

        let mut base_url = host.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut auth = HeaderValue::from_str(api_key)
            .map_err(|e| CatalogError::InvalidApiKey(e.to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(concat!("twdhcli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Calls `status_show`, returning the site information.
    ///
    /// Used at startup to confirm the host is reachable and speaks the action
    /// API.
    pub async fn status(&self) -> Result<Value, CatalogError> {
        self.call("status_show", &json!({})).await
    }

    fn action_url(&self, action: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(&format!("api/3/action/{action}"))
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }

    #[instrument(
        name = "catalog_action",
        skip(self, body),
        fields(http.status_code = tracing::field::Empty)
    )]
    async fn call<T: DeserializeOwned>(&self, action: &str, body: &Value) -> Result<T, CatalogError> {
        let url = self.action_url(action)?;
        debug!(%url, "sending action request");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        let text = response.text().await?;
        let envelope = match serde_json::from_str::<ActionEnvelope>(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(CatalogError::InvalidResponse {
                    action: action.to_string(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(CatalogError::HttpStatus {
                    status: status.as_u16(),
                    message: truncate(&text, MAX_ERROR_BODY),
                });
            }
        };

        if let Some(error) = envelope.error {
            return Err(error.into_error());
        }
        if !envelope.success || !status.is_success() {
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                message: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let result = envelope.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| CatalogError::InvalidResponse {
            action: action.to_string(),
            message: e.to_string(),
        })
    }
}

impl CatalogClient for RemoteCatalog {
    async fn package_show(&self, id: &str) -> Result<DatasetRecord, CatalogError> {
        self.call("package_show", &json!({ "id": id })).await
    }

    async fn package_search(&self, query: &SearchQuery) -> Result<SearchResult, CatalogError> {
        self.call("package_search", &query.to_body()).await
    }

    async fn package_patch(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError> {
        let mut body = fields.clone();
        body.insert("id".to_string(), json!(id));
        self.call("package_patch", &Value::Object(body)).await
    }

    async fn package_revise(
        &self,
        id: &str,
        update: &Map<String, Value>,
    ) -> Result<DatasetRecord, CatalogError> {
        let body = json!({
            "match": { "id": id },
            "update": update,
        });
        let revised: ReviseResult = self.call("package_revise", &body).await?;
        Ok(revised.package)
    }

    async fn datastore_search(&self, resource_id: &str) -> Result<DatastoreInfo, CatalogError> {
        self.call(
            "datastore_search",
            &json!({ "resource_id": resource_id, "limit": 0 }),
        )
        .await
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
