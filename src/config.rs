use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "test" => Ok(Environment::Development),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub namespace: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub token_secret: String,
    pub token_ttl_secs: i64,
    pub token_issuer: String,
    pub db: DbConfig,
    pub cors_origins: Vec<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `load` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token_secret = lookup("TOKEN_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| Error::Config("TOKEN_SECRET must be set".to_string()))?;

        let default_page_size: u32 = try_load(&lookup, "DEFAULT_PAGE_SIZE", "10")?;
        let max_page_size: u32 = try_load(&lookup, "MAX_PAGE_SIZE", "100")?;
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(Error::Config(format!(
                "DEFAULT_PAGE_SIZE must be between 1 and {max_page_size}"
            )));
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "https://voluntree-go.netlify.app".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "3000")?,
            environment: try_load(&lookup, "APP_ENV", "development")?,
            token_secret,
            token_ttl_secs: try_load(&lookup, "TOKEN_TTL_SECS", "3600")?,
            token_issuer: try_load(&lookup, "TOKEN_ISSUER", "voluntree")?,
            db: DbConfig {
                endpoint: try_load(&lookup, "DB_ENDPOINT", "mem://")?,
                username: lookup("DB_USER"),
                password: lookup("DB_PASS"),
                namespace: try_load(&lookup, "DB_NAMESPACE", "voluntree")?,
                database: try_load(&lookup, "DB_DATABASE", "volunteerDB")?,
            },
            cors_origins,
            default_page_size,
            max_page_size,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_lookup(|key| match key {
            "TOKEN_SECRET" => Some("test-secret".to_string()),
            _ => None,
        })
        .expect("test config")
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            Error::Config(format!("invalid {key}: {e}"))
        })
}
