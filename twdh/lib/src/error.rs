//! Error types for the twdh library.
//!
//! The hierarchy follows the two tiers of a maintenance run:
//! - [`CatalogError`] - a single remote action failed
//! - [`CommandError`] - a command driver cannot continue
//! - [`ConfigError`] - settings could not be resolved at startup

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification surfaced to operators for every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// The record id or name could not be resolved.
    NotFound,
    /// The remote policy rejected the request.
    Unauthorized,
    /// A JSON payload or input file failed to parse or validate.
    MalformedInput,
    /// Anything else the remote service or transport reported.
    Other,
}

/// Errors returned by a [`CatalogClient`](crate::CatalogClient) action.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog reported that the record does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The API key is not allowed to perform the action.
    #[error("not authorized: {message}")]
    Unauthorized { message: String },

    /// The catalog rejected the submitted fields.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Any other error envelope returned by the action API.
    #[error("{kind}: {message}")]
    Action { kind: String, message: String },

    /// The server answered with a non-success status and no usable envelope.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a valid action envelope.
    #[error("invalid response from {action}: {message}")]
    InvalidResponse { action: String, message: String },

    /// The configured host cannot be turned into an action URL.
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// The API key contains characters that cannot be sent in a header.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
}

impl CatalogError {
    /// Classifies the error for per-record reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::HttpStatus { status: 404, .. } => ErrorKind::NotFound,
            CatalogError::Unauthorized { .. } => ErrorKind::Unauthorized,
            CatalogError::HttpStatus {
                status: 401 | 403, ..
            } => ErrorKind::Unauthorized,
            CatalogError::Validation { .. } => ErrorKind::MalformedInput,
            _ => ErrorKind::Other,
        }
    }
}

/// Errors that stop a command driver.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A JSON payload supplied on the command line or in a file is malformed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON for the expected layout.
    #[error("failed to parse {}: {source}", path.display())]
    InputFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An export file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested dataset could not be loaded.
    #[error("failed to load dataset {id}: {source}")]
    Lookup {
        id: String,
        #[source]
        source: CatalogError,
    },

    /// A full-catalog query matched nothing.
    #[error("no datasets found")]
    NoDatasets,

    /// A catalog call outside the per-record loop failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl CommandError {
    /// Classifies the error for operator-facing reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::MalformedInput(_) | CommandError::InputFormat { .. } => {
                ErrorKind::MalformedInput
            }
            CommandError::Lookup { source, .. } | CommandError::Catalog(source) => source.kind(),
            CommandError::NoDatasets => ErrorKind::NotFound,
            CommandError::InputFile { .. } | CommandError::Output { .. } => ErrorKind::Other,
        }
    }
}

/// Errors raised while resolving startup settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No host was given by flag, config file or environment.
    #[error("--host not set and no host found in {} or TWDHCLI_HOST", config_path.display())]
    MissingHost { config_path: PathBuf },

    /// No API key was given by flag, config file or environment.
    #[error("--apikey not set and no apikey found in {} or TWDHCLI_APIKEY", config_path.display())]
    MissingApiKey { config_path: PathBuf },

    /// The host is not an absolute http(s) URL.
    #[error("invalid host URL '{host}': {message}")]
    InvalidHost { host: String, message: String },

    /// The config file exists but could not be parsed.
    #[error("failed to read config file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}
