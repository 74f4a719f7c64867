use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

/// Host-supplied theme hint, forwarded to the map renderer. Nothing in the
/// service observes the environment after startup.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub maps_api_key: String,
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub theme: Theme,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let api_base_url =
            env::var("ALERTS_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
        let maps_api_key = env::var("MAPS_API_KEY").unwrap_or_default();
        let poll_interval_ms = env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let theme = match env::var("THEME").as_deref() {
            Ok("dark") => Theme::Dark,
            _ => Theme::Light,
        };

        Ok(Self {
            api_base_url,
            maps_api_key,
            poll_interval_ms,
            log_level,
            theme,
        })
    }
}
