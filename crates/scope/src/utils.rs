use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use swellscope_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_COLLECT_HOUR, DEFAULT_PORT,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

// Leme beach, Rio de Janeiro
const DEFAULT_LATITUDE: f64 = -22.9649;
const DEFAULT_LONGITUDE: f64 = -43.1729;
const DEFAULT_LOCATION: &str = "Leme-RJ";

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "SwellScope - surf-spot observation collector and query API"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SWELLSCOPE_CONFIG, ./scope.toml,
    /// $XDG_CONFIG_HOME/swellscope/scope.toml, /etc/swellscope/scope.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SWELLSCOPE_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "SWELLSCOPE_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SWELLSCOPE_PORT")]
    pub port: Option<String>,

    /// Public URL for API responses and UI
    #[arg(short, long, env = "SWELLSCOPE_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory holding the observations database
    #[arg(long, env = "SWELLSCOPE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Site latitude
    #[arg(long, env = "SWELLSCOPE_LATITUDE")]
    pub latitude: Option<f64>,

    /// Site longitude
    #[arg(long, env = "SWELLSCOPE_LONGITUDE")]
    pub longitude: Option<f64>,

    /// Site label stored with every observation
    #[arg(long, env = "SWELLSCOPE_LOCATION")]
    pub location: Option<String>,

    /// Local hour (0-23, site timezone) for the daily collection run
    #[arg(long, env = "SWELLSCOPE_COLLECT_HOUR")]
    pub collect_hour: Option<u8>,

    /// Stormglass API key for the tide passthrough
    #[arg(long, env = "SWELLSCOPE_STORMGLASS_KEY")]
    pub stormglass_key: Option<String>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port.clone().unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn data_dir(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn latitude(&self) -> f64 {
        self.latitude.unwrap_or(DEFAULT_LATITUDE)
    }

    pub fn longitude(&self) -> f64 {
        self.longitude.unwrap_or(DEFAULT_LONGITUDE)
    }

    pub fn location(&self) -> String {
        self.location
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
    }

    pub fn collect_hour(&self) -> u8 {
        self.collect_hour.unwrap_or(DEFAULT_COLLECT_HOUR).min(23)
    }

    pub fn stormglass_key(&self) -> Option<String> {
        self.stormglass_key.clone()
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SWELLSCOPE_CONFIG", "scope.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        remote_url: cli_args.remote_url.or(file_config.remote_url),
        data_dir: cli_args.data_dir.or(file_config.data_dir),
        latitude: cli_args.latitude.or(file_config.latitude),
        longitude: cli_args.longitude.or(file_config.longitude),
        location: cli_args.location.or(file_config.location),
        collect_hour: cli_args.collect_hour.or(file_config.collect_hour),
        stormglass_key: cli_args.stormglass_key.or(file_config.stormglass_key),
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
