use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_THINGSPEAK_BASE_URL: &str = "https://api.thingspeak.com";
pub const DEFAULT_TEMPERATURE_FIELD: &str = "field1";
pub const DEFAULT_HUMIDITY_FIELD: &str = "field2";
pub const DEFAULT_REFRESH_MS: u64 = 10_000;
pub const MAX_FETCH_ATTEMPTS: u64 = 10;

/// Which feed fields carry the two charted readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub temperature: String,
    pub humidity: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_FIELD.to_string(),
            humidity: DEFAULT_HUMIDITY_FIELD.to_string(),
        }
    }
}

/// Bounded exponential backoff for upstream fetches. One attempt means no retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }

    /// Delay before the given retry (1 = first retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Everything the feed fetcher needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct ThingSpeakSettings {
    pub base_url: Url,
    pub channel_id: String,
    pub read_api_key: String,
    pub results: u32,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub thingspeak: ThingSpeakSettings,
    pub fields: FieldMapping,
    pub refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let channel_id = vars.string("CHANNEL_ID", None)?;
        let read_api_key = vars.string("READ_API_KEY", None)?;
        let results = vars.u64("RESULTS", None)?;
        let results = u32::try_from(results).context("RESULTS is out of range")?;

        let base_url = vars.string(
            "THINGSPEAK_BASE_URL",
            Some(DEFAULT_THINGSPEAK_BASE_URL.to_string()),
        )?;
        let base_url = Url::parse(&base_url).context("invalid THINGSPEAK_BASE_URL")?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("THINGSPEAK_BASE_URL must be an http(s) base URL"));
        }

        let defaults = RetryPolicy::none();
        let max_attempts = vars.u64("THINGSPEAK_MAX_ATTEMPTS", Some(1))?;
        if !(1..=MAX_FETCH_ATTEMPTS).contains(&max_attempts) {
            return Err(anyhow!(
                "THINGSPEAK_MAX_ATTEMPTS must be between 1 and {MAX_FETCH_ATTEMPTS}"
            ));
        }
        let max_attempts = max_attempts as u32;
        let base_delay = Duration::from_millis(vars.u64(
            "THINGSPEAK_RETRY_BASE_MS",
            Some(defaults.base_delay.as_millis() as u64),
        )?);
        let max_delay = Duration::from_millis(vars.u64(
            "THINGSPEAK_RETRY_MAX_MS",
            Some(defaults.max_delay.as_millis() as u64),
        )?);

        let fields = FieldMapping {
            temperature: vars.string(
                "TEMPERATURE_FIELD",
                Some(DEFAULT_TEMPERATURE_FIELD.to_string()),
            )?,
            humidity: vars.string("HUMIDITY_FIELD", Some(DEFAULT_HUMIDITY_FIELD.to_string()))?,
        };

        let refresh_ms = vars.u64("DASHBOARD_REFRESH_MS", Some(DEFAULT_REFRESH_MS))?;
        if refresh_ms == 0 {
            return Err(anyhow!("DASHBOARD_REFRESH_MS must be greater than zero"));
        }

        Ok(Self {
            thingspeak: ThingSpeakSettings {
                base_url,
                channel_id,
                read_api_key,
                results,
                retry: RetryPolicy {
                    max_attempts,
                    base_delay,
                    max_delay: max_delay.max(base_delay),
                },
            },
            fields,
            refresh_interval: Duration::from_millis(refresh_ms),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: Option<String>) -> Result<String> {
        match self.optional(key) {
            Some(value) => Ok(value),
            None => default.ok_or_else(|| anyhow!("missing env var {key}")),
        }
    }

    fn u64(&self, key: &str, default: Option<u64>) -> Result<u64> {
        match self.optional(key) {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("invalid {key}")),
            None => default.ok_or_else(|| anyhow!("missing env var {key}")),
        }
    }
}
