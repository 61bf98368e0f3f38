use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use time::UtcOffset;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub cors_origin: String,
    /// Frames a slow subscriber may fall behind before it starts losing them.
    pub channel_capacity: usize,
    /// How long a half-joined pairing may wait. `None` keeps it forever.
    pub wait_timeout: Option<Duration>,
    pub sweep_interval: Duration,
    /// Offset whose calendar days the rating timeline is collapsed by.
    pub timeline_offset: UtcOffset,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let wait_secs: u64 = parse_or(&lookup, "WAIT_TIMEOUT_SECS", 600)?;
        let sweep_secs: u64 = parse_or(&lookup, "SWEEP_INTERVAL_SECS", 30)?;
        let offset_hours: i8 = parse_or(&lookup, "TIMELINE_UTC_OFFSET_HOURS", 0)?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://goban.db?mode=rwc".to_owned()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_owned()),
            channel_capacity: parse_or(&lookup, "CHANNEL_CAPACITY", 64)?,
            wait_timeout: (wait_secs > 0).then(|| Duration::from_secs(wait_secs)),
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            timeline_offset: UtcOffset::from_hms(offset_hours, 0, 0)
                .map_err(|err| anyhow!("TIMELINE_UTC_OFFSET_HOURS={offset_hours}: {err}"))?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("parse {key}={raw:?}: {err}")),
        None => Ok(default),
    }
}
