//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Content rules for user-generated text.
    #[serde(default)]
    pub content: ContentConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Content rules applied to comments.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Maximum comment length in characters.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
    /// Terms that are rejected outright in comment content.
    #[serde(default = "default_blocked_terms")]
    pub blocked_terms: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_comment_length: default_max_comment_length(),
            blocked_terms: default_blocked_terms(),
        }
    }
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_max_comment_length() -> usize {
    2200
}

fn default_blocked_terms() -> Vec<String> {
    ["badword", "spam", "offensive"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `COTERIE_ENV`)
    /// 3. Environment variables with `COTERIE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("COTERIE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COTERIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
