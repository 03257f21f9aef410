//! Service configuration.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional TOML file, `CAMPUS_*` environment variables, and finally the
//! legacy variable names the first deployment used (`UTA_EVENTS_ICS`,
//! `UTA_DINING_BASE`, `UTA_AVG_COST`, `OPENAI_API_KEY`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::error::{CampusError, CampusResult};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "campus.toml";

static DEFAULT_BIND: &str = "127.0.0.1:8000";
static DEFAULT_DATA_DIR: &str = "data";
static DEFAULT_EVENTS_ICS_URL: &str = "https://events.uta.edu/calendar.ics";
static DEFAULT_DINING_BASE_URL: &str = "https://dineoncampus.com/utarlington";
static DEFAULT_AVG_COST_URL: &str = "https://www.uta.edu/administration/fao/average-cost";
static DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
static DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_EVENT_LIMIT: i64 = 10;
static DEFAULT_EVENT_CACHE_TTL: &str = "5m";
static DEFAULT_HTTP_TIMEOUT: &str = "30s";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server listens on.
    pub bind: String,

    /// Root for generated files. Calendar files live in `<data_dir>/ics`.
    pub data_dir: PathBuf,

    pub events_ics_url: String,
    pub dining_base_url: String,
    pub avg_cost_url: String,

    /// Maximum number of upcoming events returned from the feed.
    pub event_limit: usize,

    #[serde(deserialize_with = "humantime_duration")]
    pub event_cache_ttl: Duration,

    /// Deadline applied to every outbound HTTP request.
    #[serde(deserialize_with = "humantime_duration")]
    pub http_timeout: Duration,

    #[serde(default)]
    pub openai_api_key: Option<String>,
    pub transcription_url: String,
    pub transcription_model: String,

    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, e.g. `info` or `campus_core=debug`.
    pub level: String,
    /// Emit JSON lines instead of the compact human format.
    pub json: bool,
}

impl Settings {
    /// Load settings from every layer.
    ///
    /// An explicit `config_file` must exist; the default `campus.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> CampusResult<Self> {
        let builder = Self::defaults()?
            .add_source(file_source(config_file))
            .add_source(
                Environment::with_prefix("CAMPUS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("events_ics_url", legacy_env("UTA_EVENTS_ICS"))
            .and_then(|b| b.set_override_option("dining_base_url", legacy_env("UTA_DINING_BASE")))
            .and_then(|b| b.set_override_option("avg_cost_url", legacy_env("UTA_AVG_COST")))
            .and_then(|b| b.set_override_option("openai_api_key", legacy_env("OPENAI_API_KEY")))
            .map_err(|e| CampusError::Configuration(e.to_string()))?;

        Self::build(builder)
    }

    /// Load settings from defaults plus a single TOML file, ignoring the environment.
    pub fn from_file(path: &Path) -> CampusResult<Self> {
        let builder = Self::defaults()?.add_source(File::from(path).required(true));
        Self::build(builder)
    }

    /// Directory holding generated calendar files.
    pub fn ics_dir(&self) -> PathBuf {
        self.data_dir.join("ics")
    }

    fn defaults() -> CampusResult<ConfigBuilder<DefaultState>> {
        Config::builder()
            .set_default("bind", DEFAULT_BIND)
            .and_then(|b| b.set_default("data_dir", DEFAULT_DATA_DIR))
            .and_then(|b| b.set_default("events_ics_url", DEFAULT_EVENTS_ICS_URL))
            .and_then(|b| b.set_default("dining_base_url", DEFAULT_DINING_BASE_URL))
            .and_then(|b| b.set_default("avg_cost_url", DEFAULT_AVG_COST_URL))
            .and_then(|b| b.set_default("event_limit", DEFAULT_EVENT_LIMIT))
            .and_then(|b| b.set_default("event_cache_ttl", DEFAULT_EVENT_CACHE_TTL))
            .and_then(|b| b.set_default("http_timeout", DEFAULT_HTTP_TIMEOUT))
            .and_then(|b| b.set_default("transcription_url", DEFAULT_TRANSCRIPTION_URL))
            .and_then(|b| b.set_default("transcription_model", DEFAULT_TRANSCRIPTION_MODEL))
            .and_then(|b| b.set_default("logging.level", "info"))
            .and_then(|b| b.set_default("logging.json", false))
            .map_err(|e| CampusError::Configuration(e.to_string()))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> CampusResult<Self> {
        let mut settings: Settings = builder
            .build()
            .map_err(|e| CampusError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CampusError::Configuration(e.to_string()))?;

        if settings.event_limit == 0 {
            return Err(CampusError::Configuration(
                "event_limit must be at least 1".into(),
            ));
        }

        // An empty key in the environment means "not configured".
        settings.openai_api_key = settings
            .openai_api_key
            .filter(|key| !key.trim().is_empty());

        Ok(settings)
    }
}

fn file_source(config_file: Option<&Path>) -> File<config::FileSourceFile, config::FileFormat> {
    match config_file {
        Some(path) => File::from(path).required(true),
        None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    }
}

fn legacy_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}
