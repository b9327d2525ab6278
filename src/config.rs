//! Configuration with TOML file, environment and CLI layering.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "roofsource.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperSettings,
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Settings shared by every supplier scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Location stored with scraped prices
    #[serde(default = "default_location")]
    pub location: String,

    /// Suppliers to scrape, by key (`home-depot`, `abc-supply`)
    #[serde(default = "default_suppliers")]
    pub suppliers: Vec<String>,

    /// Cron expression for the scheduled scrape inside `serve`; empty disables it
    #[serde(default = "default_schedule")]
    pub schedule: Option<String>,

    /// Pool of user agents, one picked per request
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_database_url() -> String {
    "sqlite:data/products.db".to_string()
}

fn default_delay_ms() -> u64 {
    3000
}

fn default_delay_jitter_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_location() -> String {
    crate::models::NATIONAL.to_string()
}

fn default_suppliers() -> Vec<String> {
    vec!["abc-supply".to_string(), "home-depot".to_string()]
}

#[allow(clippy::unnecessary_wraps)]
fn default_schedule() -> Option<String> {
    Some("0 0 2 * * *".to_string())
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
    ]
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            timeout_secs: default_timeout_secs(),
            location: default_location(),
            suppliers: default_suppliers(),
            schedule: default_schedule(),
            user_agents: default_user_agents(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.scraper.schedule = config.scraper.schedule.filter(|s| !s.trim().is_empty());

        Ok(config)
    }

    /// Loads the explicit file, else `roofsource.toml` in the working directory,
    /// else defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new(DEFAULT_CONFIG_FILE);
        if local_config.exists() {
            debug!("Found {} in current directory", DEFAULT_CONFIG_FILE);
            return Self::from_file(local_config);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any variable source.
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(delay) = var("SCRAPE_DELAY_MS").and_then(|d| d.parse().ok()) {
            self.scraper.delay_ms = delay;
        }

        if let Some(schedule) = var("SCRAPE_SCHEDULE") {
            self.scraper.schedule = Some(schedule).filter(|s| !s.trim().is_empty());
        }

        if let Some(key) = var("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }

        if let Some(base_url) = var("OPENAI_BASE_URL") {
            self.llm.base_url = base_url;
        }

        if let Some(model) = var("OPENAI_MODEL") {
            self.llm.model = model;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.database.url, "sqlite:data/products.db");
        assert_eq!(config.scraper.delay_ms, 3000);
        assert_eq!(config.scraper.location, "National");
        assert_eq!(config.scraper.suppliers, vec!["abc-supply", "home-depot"]);
        assert_eq!(config.scraper.schedule.as_deref(), Some("0 0 2 * * *"));
        assert_eq!(config.scraper.user_agents.len(), 3);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml = r#"
            [server]
            port = 8080

            [scraper]
            delay_ms = 0
            suppliers = ["home-depot"]
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.scraper.delay_ms, 0);
        assert_eq!(config.scraper.delay_jitter_ms, 2000);
        assert_eq!(config.scraper.suppliers, vec!["home-depot"]);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [database]
            url = "sqlite:/tmp/roofs.db"

            [llm]
            model = "gpt-4o"
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.url, "sqlite:/tmp/roofs.db");
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_blank_schedule_in_file_disables_scheduling() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scraper]\nschedule = \"  \"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.scraper.schedule.is_none());
    }

    #[test]
    fn test_config_from_file_errors() {
        let err = AppConfig::from_file("/nonexistent/roofsource.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "9000"),
            ("SCRAPE_SCHEDULE", ""),
            ("OPENAI_API_KEY", "sk-test"),
            ("SCRAPE_DELAY_MS", "not-a-number"),
        ]);

        let config = AppConfig::default().with_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.server.port, 9000);
        assert!(config.scraper.schedule.is_none());
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        // Unparseable values leave the previous setting in place
        assert_eq!(config.scraper.delay_ms, 3000);
    }
}
