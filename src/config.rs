use std::{
    env,
    fmt::{self, Display},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::leave::balance::LeaveAllowances;

#[derive(Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Longest accepted `TOKEN_TTL`, one year.
pub const MAX_TOKEN_TTL: u64 = 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl: u64,
    pub api_prefix: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,

    pub allowances: LeaveAllowances,
    pub seed_admin: Option<SeedAdmin>,
}

// Secrets print as "***".
impl fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("jwt_secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .field("api_prefix", &self.api_prefix)
            .field("rate_login_per_min", &self.rate_login_per_min)
            .field("rate_protected_per_min", &self.rate_protected_per_min)
            .field("log_dir", &self.log_dir)
            .field("log_level", &self.log_level)
            .field("allowances", &self.allowances)
            .field("seed_admin", &self.seed_admin)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let defaults = LeaveAllowances::default();
        let allowances = LeaveAllowances {
            casual: parse_or(&var, "LEAVE_ALLOWANCE_CASUAL", defaults.casual)?,
            sick: parse_or(&var, "LEAVE_ALLOWANCE_SICK", defaults.sick)?,
            paid: parse_or(&var, "LEAVE_ALLOWANCE_PAID", defaults.paid)?,
        };

        let token_ttl: u64 = parse_or(&var, "TOKEN_TTL", 86_400)?; // default 24 h
        if !(1..=MAX_TOKEN_TTL).contains(&token_ttl) {
            return Err(anyhow!(
                "TOKEN_TTL must be between 1 and {MAX_TOKEN_TTL} seconds, got {token_ttl}"
            ));
        }

        let seed_admin = match (var("SEED_ADMIN_EMAIL"), var("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                name: var("SEED_ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            database_url: var("DATABASE_URL"),
            jwt_secret,
            token_ttl,
            api_prefix: var("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            rate_login_per_min: parse_or(&var, "RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parse_or(&var, "RATE_PROTECTED_PER_MIN", 1000)?,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&var, "LOG_LEVEL", tracing::Level::DEBUG)?,
            allowances,
            seed_admin,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
