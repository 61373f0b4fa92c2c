//! Settings for the application, read from `settings.toml`.
//!
//! See the `settings.toml` at the repository root for a commented example.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    /// Public HTTPS URL for webhook delivery. Unset means long polling.
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Reminder {
    pub time: String,
    pub timezone: String,
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            time: "22:00".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeepAlive {
    pub external_url: Option<String>,
    pub sleep_start: u32,
    pub sleep_end: u32,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self {
            external_url: None,
            sleep_start: 23,
            sleep_end: 6,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub telegram: Telegram,
    pub server: Option<Server>,
    #[serde(default)]
    pub reminder: Reminder,
    #[serde(default)]
    pub keep_alive: KeepAlive,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}

fn default_port() -> u16 {
    10_000
}
