use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub session_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub max_guesses: i32,
    pub random_source_url: String,
    pub random_source_timeout_s: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let security = SecurityConfig {
            session_secret: env::var("SECRET_KEY")
                .context("SECRET_KEY must be set (session cookie signing key)")?,
        };

        let game = GameConfig {
            max_guesses: env::var("MAX_GUESSES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(crate::game::lifecycle::DEFAULT_MAX_GUESSES),
            random_source_url: env::var("RANDOM_SOURCE_URL")
                .unwrap_or_else(|_| "https://www.random.org/integers/".to_string()),
            random_source_timeout_s: env::var("RANDOM_SOURCE_TIMEOUT_S")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        };

        Ok(Config {
            database,
            server,
            security,
            game,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
