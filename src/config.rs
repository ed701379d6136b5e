use crate::model::employee::LeaveBalances;
use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::{env, path::PathBuf, str::FromStr};
use strum::EnumString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    MySql,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Persistence
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub seed_file: Option<PathBuf>,

    // Balances given to employees onboarded without explicit ones
    pub default_sick_days: u32,
    pub default_vacation_days: u32,
    pub default_personal_days: u32,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Logging
    pub log_dir: PathBuf,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", 900)?, // default 15 min

            storage_backend: parse_or("STORAGE_BACKEND", StorageBackend::File)?,
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            database_url: env::var("DATABASE_URL").ok(),
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),

            default_sick_days: parse_or("DEFAULT_SICK_DAYS", 10)?,
            default_vacation_days: parse_or("DEFAULT_VACATION_DAYS", 20)?,
            default_personal_days: parse_or("DEFAULT_PERSONAL_DAYS", 5)?,

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            log_dir: env::var("LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),
            log_level: parse_or("LOG_LEVEL", tracing::Level::DEBUG)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage_backend == StorageBackend::MySql && self.database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=mysql");
        }
        // governor refuses zero quotas, and more than one request per
        // millisecond cannot be expressed
        for (name, rate) in [
            ("RATE_LOGIN_PER_MIN", self.rate_login_per_min),
            ("RATE_PROTECTED_PER_MIN", self.rate_protected_per_min),
        ] {
            if rate == 0 || rate > 60_000 {
                bail!("{name} must be between 1 and 60000, got {rate}");
            }
        }
        Ok(())
    }

    pub fn default_balances(&self) -> LeaveBalances {
        LeaveBalances {
            sick: self.default_sick_days,
            vacation: self.default_vacation_days,
            personal: self.default_personal_days,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}
