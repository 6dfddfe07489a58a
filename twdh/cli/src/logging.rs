//! Tracing setup: a compact stderr layer plus a plain-text log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{
    Layer,
    filter::{self, EnvFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::CliError;

/// Events with this target go to the log file only.
pub const FILE_ONLY_TARGET: &str = "twdhcli::fatal";

/// Picks the filter directives from the verbosity flags.
///
/// `RUST_LOG` always wins when set.
pub fn filter_directives(quiet: bool, verbose: u8, debug: bool) -> String {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        return filter;
    }

    match (quiet, verbose, debug) {
        (_, 2.., _) => "info,twdh_lib=trace,twdhcli=trace".to_string(),
        (_, 1, _) | (_, _, true) => "info,twdh_lib=debug,twdhcli=debug".to_string(),
        (true, _, _) => "warn".to_string(),
        _ => "warn,twdh_lib=info,twdhcli=info".to_string(),
    }
}

/// Installs the global subscriber.
///
/// Every event is appended to `logfile` without ANSI escapes; all but
/// [`FILE_ONLY_TARGET`] events are also written to stderr.
pub fn init_tracing(directives: &str, logfile: &Path) -> Result<(), CliError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logfile)
        .map_err(|source| CliError::LogFile {
            path: logfile.to_path_buf(),
            source,
        })?;

    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact()
                .with_filter(filter::filter_fn(|meta| meta.target() != FILE_ONLY_TARGET)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
