use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ggn_redump_core::{
    load_config, resolve_api_key, run as run_pipeline, validate_config, Config, CrawlOptions,
    CsvSink, GazelleClient, SanitizedConfig, SinkKind, SqliteSink,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crawl GazelleGames for redump-verified torrents of one console and
/// export their metadata.
#[derive(Debug, Parser)]
#[command(name = "ggn-redump", version, about)]
struct Args {
    /// Config file (TOML)
    #[arg(long, env = "GGN_REDUMP_CONFIG")]
    config: Option<PathBuf>,

    /// Console name as listed on the tracker, e.g. "PlayStation 2"
    #[arg(long)]
    console: Option<String>,

    /// Region filter: Japan, JPN, Europe, EUR or USA
    #[arg(long)]
    region: Option<String>,

    /// Stop after this many torrents
    #[arg(long)]
    limit: Option<usize>,

    /// Output sink: csv or sqlite
    #[arg(long)]
    sink: Option<SinkKind>,

    /// CSV file or SQLite database to write
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(self, config: &mut Config) {
        if let Some(console) = self.console {
            config.crawl.console = console;
        }
        if let Some(region) = self.region {
            config.crawl.region = Some(region);
        }
        if let Some(limit) = self.limit {
            config.crawl.limit = Some(limit);
        }
        if let Some(sink) = self.sink {
            config.output.sink = sink;
        }
        if let Some(output) = self.output {
            match config.output.sink {
                SinkKind::Csv => config.output.csv_path = Some(output),
                SinkKind::Sqlite => config.output.database_path = output,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("ggn-redump v{}", VERSION);

    // Explicit path must exist; the default one is optional.
    let config_path = args.config.clone().or_else(|| {
        let default = PathBuf::from("config.toml");
        default.exists().then_some(default)
    });

    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, using defaults and environment"),
    }
    let mut config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    args.apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration: {:?}", SanitizedConfig::from(&config));

    let api_key = resolve_api_key(&config.api).context("Failed to load API key")?;
    let client =
        GazelleClient::new(&config.api, api_key).context("Failed to create API client")?;

    let options = CrawlOptions::from_config(&config.crawl);

    match config.output.sink {
        SinkKind::Csv => {
            let path = config.output.csv_path_for(&config.crawl.console);
            let sink = CsvSink::create(&path)
                .with_context(|| format!("Failed to create CSV file {:?}", path))?;

            let summary = run_pipeline(&client, &sink, &options).await?;
            info!(
                "Metadata written to {:?} ({} rows, {} torrents, {} skipped)",
                path,
                summary.collected.records_written,
                summary.collected.torrents_written,
                summary.collected.skipped.len()
            );
        }
        SinkKind::Sqlite => {
            let path = config.output.database_path.clone();
            let sink = SqliteSink::new(&path)
                .with_context(|| format!("Failed to open database {:?}", path))?;

            let summary = run_pipeline(&client, &sink, &options).await?;
            info!(
                "Metadata written to {:?} ({} torrents this run, {} skipped, {} stored in total)",
                path,
                summary.collected.torrents_written,
                summary.collected.skipped.len(),
                sink.torrent_count().context("Failed to count stored torrents")?
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "ggn-redump",
            "--console",
            "Sega Saturn",
            "--region",
            "JPN",
            "--limit",
            "5",
            "--sink",
            "sqlite",
        ])
        .unwrap();
        assert_eq!(args.console.as_deref(), Some("Sega Saturn"));
        assert_eq!(args.limit, Some(5));
        assert_eq!(args.sink, Some(SinkKind::Sqlite));
    }

    #[test]
    fn test_output_targets_selected_sink() {
        let args = Args::try_parse_from([
            "ggn-redump",
            "--sink",
            "sqlite",
            "--output",
            "out.db",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.output.database_path, PathBuf::from("out.db"));
        assert!(config.output.csv_path.is_none());
    }

    #[test]
    fn test_overrides_keep_file_values_when_absent() {
        let args = Args::try_parse_from(["ggn-redump"]).unwrap();
        let mut config = Config::default();
        config.crawl.console = "Dreamcast".to_string();
        config.crawl.limit = Some(3);
        args.apply(&mut config);
        assert_eq!(config.crawl.console, "Dreamcast");
        assert_eq!(config.crawl.limit, Some(3));
    }

    #[test]
    fn test_rejects_unknown_sink() {
        assert!(Args::try_parse_from(["ggn-redump", "--sink", "xml"]).is_err());
    }
}
