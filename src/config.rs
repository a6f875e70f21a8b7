// feedback-report-service/src/config.rs

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub templates: TemplateConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Background page artwork. Every template is a raster page stretched over
/// `page_width` x `page_height` points; overlay coordinates assume that size.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    pub path: String,
    pub theory: String,
    pub practical: String,
    pub header: String,
    pub student_login: String,
    pub page_width: f32,
    pub page_height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub render_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Start with default values
            .set_default("service.name", "feedback-report-service")?
            .set_default("service.log_level", "info")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "postgres://localhost/feedback")?
            .set_default("database.max_connections", 10)?
            .set_default("templates.path", "./templates")?
            .set_default("templates.theory", "theory.png")?
            .set_default("templates.practical", "practical.png")?
            .set_default("templates.header", "header.png")?
            .set_default("templates.student_login", "student_login.png")?
            .set_default("templates.page_width", 612.0)?
            .set_default("templates.page_height", 792.0)?
            .set_default("report.render_timeout_secs", 30)?
            // Load from config file if it exists
            .add_source(File::with_name("config").required(false))
            // Override with environment variables (e.g., SERVICE__SERVER__PORT)
            .add_source(Environment::with_prefix("SERVICE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl TemplateConfig {
    pub fn file(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.path).join(name)
    }
}

impl ReportConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}
