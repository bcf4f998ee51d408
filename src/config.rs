//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present, then
//! every setting falls back to a development default.

use std::{env, net::SocketAddr, str::FromStr};

use crate::catalog::ValidationBounds;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Sessions expire after this many hours without a request.
    pub session_inactivity_hours: i64,
    /// Send the session cookie with the `Secure` attribute.
    pub secure_cookies: bool,
    /// Create the `admin` account on startup when it is missing.
    pub seed_admin: bool,
    pub bounds: ValidationBounds,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: "sqlite://catalog.db?mode=rwc".to_string(),
            session_inactivity_hours: 24,
            secure_cookies: false,
            seed_admin: true,
            bounds: ValidationBounds::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to
    /// [`Config::default`] for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let bounds = ValidationBounds {
            min_year: parse_or(&lookup, "CATALOG_MIN_YEAR", defaults.bounds.min_year)?,
            max_year: parse_or(&lookup, "CATALOG_MAX_YEAR", defaults.bounds.max_year)?,
            ..defaults.bounds
        };
        if bounds.min_year > bounds.max_year {
            return Err(Error::Config(format!(
                "CATALOG_MIN_YEAR ({}) is greater than CATALOG_MAX_YEAR ({})",
                bounds.min_year, bounds.max_year
            )));
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            session_inactivity_hours: parse_or(
                &lookup,
                "SESSION_INACTIVITY_HOURS",
                defaults.session_inactivity_hours,
            )?,
            secure_cookies: parse_or(&lookup, "SECURE_COOKIES", defaults.secure_cookies)?,
            seed_admin: parse_or(&lookup, "SEED_ADMIN", defaults.seed_admin)?,
            bounds,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}
