use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const KNOWN_ENVIRONMENTS: &[&str] = &["development", "test", "staging", "production"];
const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// How the "number of return" figure is reported for a line.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReturnCountPolicy {
    /// Report the net returned quantity only when a discard amount exists,
    /// zero otherwise.
    #[default]
    DiscardOnly,
    /// Always report the net returned quantity.
    Always,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Engine configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct EngineConfig {
    /// Deployment environment
    #[validate(custom = "validate_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Reporting policy for the net returned quantity
    #[serde(default)]
    pub return_count_policy: ReturnCountPolicy,

    /// Attach hierarchy diagnostics (unknown child or stock ids) to update results
    #[serde(default = "default_true_bool")]
    pub surface_hierarchy_diagnostics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENV.to_string(),
            log_level: default_log_level(),
            log_json: false,
            return_count_policy: ReturnCountPolicy::default(),
            surface_hierarchy_diagnostics: default_true_bool(),
        }
    }
}

impl EngineConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_true_bool() -> bool {
    true
}

fn validate_environment(value: &str) -> Result<(), ValidationError> {
    if KNOWN_ENVIRONMENTS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(value))
    {
        return Ok(());
    }
    let mut err = ValidationError::new("environment");
    err.message = Some(format!("unknown environment '{}'", value).into());
    Err(err)
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if KNOWN_LOG_LEVELS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(level))
    {
        return Ok(());
    }
    let mut err = ValidationError::new("log_level");
    err.message = Some(format!("unsupported log level '{}'", level).into());
    Err(err)
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("supplyline_engine={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads engine configuration from `config/` under the working directory.
pub fn load_config() -> Result<EngineConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Loads engine configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (`{dir}/default.toml`)
/// 3. Environment-specific config (`{dir}/{env}.toml`)
/// 4. Environment variables (`APP__*`)
pub fn load_config_from(dir: &Path) -> Result<EngineConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading engine configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("return_count_policy", "discard_only")?
        .set_default("surface_hierarchy_diagnostics", true)?
        .add_source(File::with_name(&format!("{}/default", dir.display())).required(false))
        .add_source(File::with_name(&format!("{}/{}", dir.display(), run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let engine_config: EngineConfig = config.try_deserialize()?;

    engine_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Engine configuration loaded successfully");
    Ok(engine_config)
}
