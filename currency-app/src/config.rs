//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use currency_hex::RefreshMode;
use currency_hex::outbound::DEFAULT_BASE_URL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Open Exchange Rates credential
    pub oxr_app_id: String,
    pub oxr_api_url: String,
    pub rate_refresh_interval: Duration,
    pub catalog_sync_interval: Duration,
    /// `None` disables the per-call bound
    pub provider_timeout: Option<Duration>,
    pub refresh_mode: RefreshMode,
    pub cache_monotonic: bool,
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = parse_or(&lookup, "PORT", 9090)?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let oxr_app_id = lookup("OXR_APP_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("OXR_APP_ID environment variable is required"))?;

        let oxr_api_url = lookup("OXR_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let rate_refresh_interval = positive_secs(&lookup, "RATE_REFRESH_INTERVAL_SECS", 3600)?;
        let catalog_sync_interval = positive_secs(&lookup, "CATALOG_SYNC_INTERVAL_SECS", 86_400)?;

        let provider_timeout = match parse_or::<u64>(&lookup, "PROVIDER_TIMEOUT_SECS", 30)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let refresh_mode = match lookup("RATE_REFRESH_MODE") {
            Some(raw) => raw
                .parse::<RefreshMode>()
                .map_err(|e| anyhow::anyhow!("RATE_REFRESH_MODE: {}", e))?,
            None => RefreshMode::default(),
        };

        let cache_monotonic = parse_or(&lookup, "RATE_CACHE_MONOTONIC", false)?;
        let rate_limit_per_minute = parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 100)?;

        Ok(Self {
            port,
            database_url,
            oxr_app_id,
            oxr_api_url,
            rate_refresh_interval,
            catalog_sync_interval,
            provider_timeout,
            refresh_mode,
            cache_monotonic,
            rate_limit_per_minute,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn positive_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<Duration> {
    match parse_or(lookup, key, default)? {
        0 => anyhow::bail!("{} must be greater than zero", key),
        secs => Ok(Duration::from_secs(secs)),
    }
}
