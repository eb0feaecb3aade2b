//! Application configuration management.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Storage backends to enable. A missing section leaves that backend disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Local filesystem backend.
    pub local: Option<LocalSettings>,
    /// S3-compatible object store backend.
    pub s3: Option<S3Settings>,
}

/// Local filesystem backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalSettings {
    /// Directory under which all claims are allocated.
    pub root: PathBuf,
}

/// S3-compatible backend settings.
#[derive(Clone, Deserialize)]
pub struct S3Settings {
    /// Endpoint URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Lifetime of presigned URLs in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("signed_url_ttl_secs", &self.signed_url_ttl_secs)
            .finish()
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_signed_url_ttl() -> u64 {
    86400 // 24 hours
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "upstorage=info".to_string()
}

impl AppConfig {
    /// Loads configuration from `.env`, config files and the environment.
    ///
    /// Environment variables use the `UPSTORAGE` prefix and `__` as the
    /// nesting separator, e.g. `UPSTORAGE__STORAGE__LOCAL__ROOT`.
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
            .add_source(config::Environment::with_prefix("UPSTORAGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
