//! Configuration management for the Cold Storage Inventory backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CSB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::report::{LayoutVariant, RemarkPolicy};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Object storage (S3-compatible) configuration
    pub storage: StorageConfig,

    /// Daily snapshot and report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key used to verify JWT tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint, e.g. https://s3.filebase.com
    pub endpoint: String,

    pub region: String,

    pub bucket: String,

    pub access_key: String,

    pub secret_key: String,

    /// Lifetime of generated access URLs in seconds
    pub url_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Report title printed on every page
    pub title: String,

    /// Local timezone as whole hours east of UTC; defines "today"
    pub utc_offset_hours: i32,

    /// Run the pipeline from the cron scheduler
    pub scheduler_enabled: bool,

    /// 6-field cron expression (with seconds), evaluated in UTC
    pub schedule: String,

    /// Object-key prefix of report artifacts
    pub artifact_prefix: String,

    /// Reports kept when purging storage after a quota failure
    pub retain_count: usize,

    pub layout: LayoutVariant,

    /// Remark for non-depleted rows in scheduled runs
    pub scheduled_remark: RemarkPolicy,

    /// Remark for non-depleted rows in on-demand runs
    pub on_demand_remark: RemarkPolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CSB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("storage.endpoint", "https://s3.filebase.com")?
            .set_default("storage.region", "us-east-1")?
            .set_default("storage.url_ttl_secs", 604_800)?
            .set_default("report.title", "STOK GLOBAL COLD STORAGE PSR BARU")?
            .set_default("report.utc_offset_hours", 7)?
            .set_default("report.scheduler_enabled", true)?
            .set_default("report.schedule", "0 50 16 * * *")?
            .set_default("report.artifact_prefix", shared::DEFAULT_REPORT_PREFIX)?
            .set_default("report.retain_count", 60)?
            .set_default("report.layout", "landscape")?
            .set_default("report.scheduled_remark", "stock_opname")?
            .set_default("report.on_demand_remark", "blank")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CSB_ prefix)
            .add_source(
                Environment::with_prefix("CSB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "STOK GLOBAL COLD STORAGE PSR BARU".to_string(),
            utc_offset_hours: 7,
            scheduler_enabled: true,
            schedule: "0 50 16 * * *".to_string(),
            artifact_prefix: shared::DEFAULT_REPORT_PREFIX.to_string(),
            retain_count: 60,
            layout: LayoutVariant::Landscape,
            scheduled_remark: RemarkPolicy::StockOpname,
            on_demand_remark: RemarkPolicy::Blank,
        }
    }
}
