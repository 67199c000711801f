use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (jobhawk.toml + JOBHAWK_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobhawkConfig {
    pub telegram: TelegramConfig,
    pub hh: HhConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

/// hh.ru API access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HhConfig {
    pub client_id: String,
    pub client_secret: String,
    /// hh.ru rejects requests without an identifying User-Agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Sweep cadence and throttling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds slept between the end of one sweep and the start of the next.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Pause after every apply attempt, successful or not.
    #[serde(default = "default_apply_pause_ms")]
    pub apply_pause_ms: u64,
    /// Vacancies fetched per search page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            apply_pause_ms: default_apply_pause_ms(),
            per_page: default_per_page(),
        }
    }
}

fn default_user_agent() -> String {
    "jobhawk/0.3".to_string()
}
fn default_api_base_url() -> String {
    "https://api.hh.ru".to_string()
}
fn default_oauth_base_url() -> String {
    "https://hh.ru".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobhawk/jobhawk.db", home)
}
fn default_sweep_interval_secs() -> u64 {
    300
}
fn default_apply_pause_ms() -> u64 {
    2_000
}
fn default_per_page() -> u32 {
    100
}

impl JobhawkConfig {
    /// Load config from a TOML file with JOBHAWK_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. JOBHAWK_CONFIG env var (resolved by the caller)
    ///   3. ~/.jobhawk/jobhawk.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: JobhawkConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("JOBHAWK_").split("_"))
            .extract()
            .map_err(|e| crate::error::JobhawkError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.jobhawk/jobhawk.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.sweep_interval_secs, 300);
        assert_eq!(engine.apply_pause_ms, 2_000);
        assert_eq!(engine.per_page, 100);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: JobhawkConfig = Figment::new()
            .merge(Toml::string(
                r#"
                [telegram]
                bot_token = "t"

                [hh]
                client_id = "id"
                client_secret = "secret"
                "#,
            ))
            .extract()
            .expect("config should parse");
        assert_eq!(config.hh.api_base_url, "https://api.hh.ru");
        assert_eq!(config.hh.user_agent, "jobhawk/0.3");
        assert_eq!(config.engine.sweep_interval_secs, 300);
        assert_eq!(config.database.path, default_db_path());
    }
}
