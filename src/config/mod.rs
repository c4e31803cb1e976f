use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub payments: PaymentPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Business-rule knobs for the payment acceptance workflow.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaymentPolicy {
    /// When false, a payment that pushes the cumulative paid amount past the
    /// invoice total is rejected as a conflict. When true it is accepted and
    /// the invoice still transitions to `paid`.
    #[serde(default)]
    pub allow_overpayment: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_service_name() -> String {
    "billing-api".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl Settings {
    /// Load settings from an optional `configuration` file plus `APP__`-prefixed
    /// environment variables (e.g. `APP__DATABASE__URL`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
