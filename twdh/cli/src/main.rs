//! twdhcli - maintenance commands for the Texas Water Data Hub catalog

mod logging;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};
use twdh_lib::commands::{
    fetch_dictionaries, fetch_tags, patch, show, spatial_stats, undelete, update_dates,
    update_rolling_dates, update_tags,
};
use twdh_lib::config::DEFAULT_CONFIG_FILE;
use twdh_lib::{
    CatalogError, CommandError, ConfigError, ConfigFile, RemoteCatalog, RunOptions, Settings,
    SettingsOverrides,
};

/// Maintenance commands for the Texas Water Data Hub catalog.
///
/// Connection settings come from flags, then the config file, then the
/// TWDHCLI_HOST and TWDHCLI_APIKEY environment variables.
#[derive(Debug, Parser)]
#[command(name = "twdhcli")]
#[command(version)]
#[command(about = "Maintenance commands for the Texas Water Data Hub catalog")]
struct Cli {
    /// Catalog base URL (e.g. https://txwaterdatahub.org)
    #[arg(long, global = true, value_name = "URL")]
    host: Option<String>,

    /// API key used to authorize writes
    #[arg(long, global = true, value_name = "KEY")]
    apikey: Option<String>,

    /// Run every check but write nothing to the catalog
    #[arg(long, visible_alias = "test-run", global = true)]
    dry_run: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log debug detail (same as -v)
    #[arg(long, global = true)]
    debug: bool,

    /// File the log is appended to
    #[arg(long, global = true, value_name = "PATH", default_value = "./twdhcli.log")]
    logfile: PathBuf,

    /// Dotenv file holding HOST and APIKEY
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Dataset ids or names; every dataset when omitted.
#[derive(clap::Args, Debug, Clone, Default)]
struct TargetArgs {
    /// Dataset ids or names, space separated
    #[arg(long, value_name = "IDS", value_delimiter = ' ', num_args = 1..)]
    ids: Vec<String>,
}

impl TargetArgs {
    fn ids(&self) -> Vec<String> {
        self.ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print datasets as JSON
    Show {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Report gazetteer geometry sizes and simplification savings
    SpatialStats {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Set top-level fields on datasets
    Patch {
        #[command(flatten)]
        targets: TargetArgs,

        /// Fields to set, as a JSON object
        #[arg(long, value_name = "JSON", value_parser = parse_patch_arg)]
        patch_data: Map<String, Value>,
    },

    /// Export datastore data dictionaries to a JSON file
    FetchDictionaries {
        /// Output file [default: ./data-dictionary-list-<DATE>.json]
        #[arg(long, value_name = "FILE")]
        filename: Option<PathBuf>,
    },

    /// Export dataset tags to a JSON file
    FetchTags {
        /// Output file
        #[arg(long, value_name = "FILE", default_value = fetch_tags::DEFAULT_FILENAME)]
        filename: PathBuf,
    },

    /// Import primary and secondary tags from a tag list file
    UpdateTags {
        /// Tag list produced by fetch-tags
        #[arg(value_name = "TAGS_JSON")]
        tags_json: PathBuf,
    },

    /// Roll the date range of automatically updated datasets
    UpdateDates,

    /// Restore deleted datasets to the active state
    Undelete {
        /// Dataset ids or names
        #[arg(value_name = "DATASET_ID", required = true)]
        dataset_ids: Vec<String>,
    },

    /// Import rolling from/to dates from a JSON file
    UpdateRollingDates {
        /// File with {"datasets": [{"name", "from_date", "to_date"}]}
        #[arg(value_name = "JSON_FILE")]
        json_file: PathBuf,
    },
}

fn parse_patch_arg(raw: &str) -> Result<Map<String, Value>, String> {
    patch::parse_patch_data(raw).map_err(|e| e.to_string())
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create catalog client: {0}")]
    Client(#[from] CatalogError),

    #[error("cannot connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Command(#[from] CommandError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let directives = logging::filter_directives(cli.quiet, cli.verbose, cli.debug);
    if let Err(err) = logging::init_tracing(&directives, &cli.logfile) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: logging::FILE_ONLY_TARGET, error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves settings, checks the connection and dispatches the command.
async fn run(cli: Cli) -> Result<(), CliError> {
    let file = ConfigFile::load(&cli.config)?;
    if !file.found() {
        warn!(path = %file.path().display(), "config file not found");
    }

    let overrides = SettingsOverrides {
        host: cli.host.clone(),
        api_key: cli.apikey.clone(),
    };
    let settings = Settings::resolve(&overrides, &file, |key| std::env::var(key).ok())?;
    info!(host = %settings.host, "connecting");

    let catalog = RemoteCatalog::new(&settings.host, &settings.api_key)?;
    catalog
        .status()
        .await
        .map_err(|source| CliError::Connect {
            host: settings.host.to_string(),
            source,
        })?;

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    if options.dry_run {
        warn!("dry run: no changes will be written to the catalog");
    }

    match cli.command {
        Commands::Show { targets } => {
            let records = show::run(&catalog, &targets.ids()).await?;
            report::print_records(&records);
        }
        Commands::SpatialStats { targets } => {
            let stats = spatial_stats::run(&catalog, &targets.ids()).await?;
            report::print_spatial(&stats);
        }
        Commands::Patch {
            targets,
            patch_data,
        } => {
            let summary = patch::run(&catalog, &targets.ids(), &patch_data, options).await?;
            report::print_summary("patch", &summary);
        }
        Commands::FetchDictionaries { filename } => {
            let path = filename.unwrap_or_else(|| {
                PathBuf::from(fetch_dictionaries::default_filename(Local::now().date_naive()))
            });
            let summary =
                fetch_dictionaries::run(&catalog, settings.host.as_str(), &path).await?;
            report::print_export("fetch-dictionaries", &summary);
        }
        Commands::FetchTags { filename } => {
            let summary = fetch_tags::run(&catalog, &filename).await?;
            report::print_export("fetch-tags", &summary);
        }
        Commands::UpdateTags { tags_json } => {
            let summary = update_tags::run(&catalog, &tags_json, options).await?;
            report::print_summary("update-tags", &summary);
        }
        Commands::UpdateDates => {
            let today = Local::now().date_naive();
            let summary = update_dates::run(&catalog, today, options).await?;
            report::print_summary("update-dates", &summary);
        }
        Commands::Undelete { dataset_ids } => {
            let result = undelete::run(&catalog, &dataset_ids, options).await?;
            report::print_undelete(&result);
        }
        Commands::UpdateRollingDates { json_file } => {
            let summary = update_rolling_dates::run(&catalog, &json_file, options).await?;
            report::print_summary("update-rolling-dates", &summary);
        }
    }

    Ok(())
}
