//! Application configuration management.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Document numbering configuration.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Payable/receivable ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Document numbering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// Zero-padding width of the numeric part of document codes.
    #[serde(default = "default_number_width")]
    pub width: usize,
    /// Prefix overrides keyed by counter name (e.g. `contas_pagar = "CP-"`).
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
}

fn default_number_width() -> usize {
    6
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            width: default_number_width(),
            prefixes: HashMap::new(),
        }
    }
}

impl NumberingConfig {
    /// Returns the configured prefix for a counter, falling back to `default`.
    #[must_use]
    pub fn prefix_for<'a>(&'a self, counter_name: &str, default: &'a str) -> &'a str {
        self.prefixes
            .get(counter_name)
            .map_or(default, String::as_str)
    }
}

/// Payable/receivable ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Optimistic-concurrency attempts before giving up with a conflict.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    5
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "varejo=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
    /// then `VAREJO__SECTION__KEY` environment variables. A `.env` file is
    /// read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VAREJO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
