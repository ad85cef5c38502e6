use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the workforce API, including the version prefix.
    /// Injected via `GATEHOUSE_API_BASE_URL`.
    pub base_url: String,
    /// Per-request timeout applied to every outbound call.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted session document.
    pub session_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables (prefixed `GATEHOUSE`)
    /// and an optional `config.toml`, on top of built-in defaults.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", "http://localhost:8000/api/v1")?
            .set_default("api.timeout_secs", 15)?
            .set_default("storage.session_file", ".gatehouse/session.json")?
            .set_default("logging.level", "info")?
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("config.toml").required(false));

        // Nested env keys cannot express field names containing the
        // separator, so the documented variable is applied directly.
        if let Ok(url) = std::env::var("GATEHOUSE_API_BASE_URL") {
            builder = builder.set_override("api.base_url", url)?;
        }

        Ok(builder.build()?.try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
