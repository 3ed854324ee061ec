use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cover_art_hunter::cli_style::{get_styles, print_summary};
use cover_art_hunter::config::{prompt::prompt_config, CliConfig, FileConfig};
use cover_art_hunter::output;
use cover_art_hunter::progress::TerminalProgress;
use cover_art_hunter::{AppSettings, CoverArtHunter, HuntConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
enum Verbosity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl From<Verbosity> for LevelFilter {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Error | Verbosity::Critical => LevelFilter::ERROR,
        }
    }
}

/// Fetch the highest resolution cover art for given artist and album names.
#[derive(Parser, Debug)]
#[command(styles = get_styles())]
struct CliArgs {
    /// JSON string with the job configuration (artists, albums, release type,
    /// status, output directory, save images flag).
    #[clap(long, conflicts_with = "config_file")]
    pub config_json: Option<String>,

    /// Path to a JSON file containing the job configuration.
    #[clap(long, value_parser = parse_path)]
    pub config_file: Option<PathBuf>,

    /// Path to a TOML file with network and concurrency settings.
    #[clap(long, value_parser = parse_path)]
    pub settings: Option<PathBuf>,

    /// Logging verbosity, LOG_LEVEL takes precedence when set.
    #[clap(long, value_enum, default_value = "ERROR")]
    pub verbosity: Verbosity,

    /// Base URL of the MusicBrainz web service.
    #[clap(long, default_value = cover_art_hunter::musicbrainz::MUSICBRAINZ_API_BASE)]
    pub catalog_url: String,

    /// Base URL of the Cover Art Archive.
    #[clap(long, default_value = cover_art_hunter::cover_art_archive::COVER_ART_ARCHIVE_BASE)]
    pub archive_url: String,

    /// Timeout in seconds for every HTTP request.
    #[clap(long, default_value_t = 30)]
    pub timeout_sec: u64,

    /// Maximum in-flight requests per pipeline stage.
    #[clap(long, default_value_t = 16)]
    pub max_concurrent_requests: usize,

    /// Maximum albums processed at the same time.
    #[clap(long, default_value_t = 4)]
    pub max_concurrent_albums: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            catalog_base_url: self.catalog_url.clone(),
            archive_base_url: self.archive_url.clone(),
            request_timeout_secs: self.timeout_sec,
            max_concurrent_requests: self.max_concurrent_requests,
            max_concurrent_albums: self.max_concurrent_albums,
        }
    }
}

/// Returns the job and whether it was entered interactively.
fn load_hunt_config(cli_args: &CliArgs) -> Result<(HuntConfig, bool)> {
    if let Some(path) = &cli_args.config_file {
        return Ok((HuntConfig::load(path)?, false));
    }
    if let Some(json) = &cli_args.config_json {
        return Ok((HuntConfig::from_json(json)?, false));
    }

    let mut editor = DefaultEditor::new().context("Failed to open interactive prompt")?;
    Ok((prompt_config(&mut editor)?, true))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(cli_args.verbosity).into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.settings {
        Some(path) => {
            info!("Loading settings from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let settings = AppSettings::resolve(&cli_args.to_cli_config(), file_config)?;
    let (config, prompted) = load_hunt_config(&cli_args)?;

    let hunter = CoverArtHunter::new(&settings)?.with_progress(Arc::new(TerminalProgress::new()));
    let report = hunter.run(&config).await;
    print_summary(&report);

    if prompted {
        let timestamp = output::timestamp(chrono::Local::now());
        let path = output::config_path(&config.output_dir, &timestamp);
        output::write_json(&config, &path)
            .await
            .with_context(|| format!("Failed to save configuration to {:?}", path))?;
    }

    Ok(())
}
