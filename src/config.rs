//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::domain::loan::OVERDUE_THRESHOLD_DAYS;

const DEFAULT_LATE_LOAN_MESSAGE: &str =
    "Your loan is overdue. Please return the book to the library as soon as possible.";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_use_tls: bool,
    pub late_loan_message: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoansConfig {
    pub overdue_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    pub loans: LoansConfig,
    pub notifier: NotifierConfig,
}

impl AppConfig {
    /// Load configuration from defaults, `config/default.toml` and environment variables
    ///
    /// Environment variables use the `LIBRARY__` prefix with `__` between
    /// section and key (e.g. `LIBRARY__EMAIL__SMTP_HOST`). `DATABASE_URL` and
    /// `PORT` override their keys directly.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "postgres://localhost/library")?
            .set_default("database.max_connections", 5)?
            .set_default("email.smtp_host", "localhost")?
            .set_default("email.smtp_port", 25)?
            .set_default("email.smtp_from", "library@localhost")?
            .set_default("email.smtp_use_tls", false)?
            .set_default("email.late_loan_message", DEFAULT_LATE_LOAN_MESSAGE)?
            .set_default("loans.overdue_days", OVERDUE_THRESHOLD_DAYS)?
            .set_default("notifier.enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
