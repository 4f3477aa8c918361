//! Process settings, read from an optional `settings.toml` in the working
//! directory and overridden by `KGSCHOOL__<SECTION>__<KEY>` environment
//! variables (e.g. `KGSCHOOL__SERVER__PORT=8080`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Billing {
    /// Day of month tuition invoices fall due; clamped to 1..=28 when used.
    pub due_day: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub billing: Billing,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("billing.due_day", 5)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("KGSCHOOL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn database_url(&self) -> String {
        match &self.server.database {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}
