use anyhow::{Context, Result};

/// Server configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:clicker.db?mode=rwc`)
    /// - `HOST` - bind address (default: `0.0.0.0`)
    /// - `PORT` - HTTP port (default: 3000)
    /// - `DB_MAX_CONNECTIONS` - pool size (default: 5)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| "sqlite:clicker.db?mode=rwc".to_string());
        let host = var("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("Invalid PORT")?;
        let db_max_connections = var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .context("Invalid DB_MAX_CONNECTIONS")?;

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
