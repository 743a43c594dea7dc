//! Per-stage timeout allowances
//!
//! An exchange does not enforce these individually. They are summed once,
//! when the exchange is built, into the single budget every stage draws on.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::{StintError, StintResult};

/// Connect/read/write allowances an exchange budget is built from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Allowance for establishing the transport connection
    #[serde(deserialize_with = "humantime_duration")]
    pub connect: Duration,
    /// Allowance for reading the response
    #[serde(deserialize_with = "humantime_duration")]
    pub read: Duration,
    /// Allowance for writing the request
    #[serde(deserialize_with = "humantime_duration")]
    pub write: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            connect: Duration::from_millis(250),
            read: Duration::from_millis(250),
            write: Duration::from_millis(250),
        }
    }
}

impl TimeoutConfig {
    pub fn new(connect: Duration, read: Duration, write: Duration) -> Self {
        TimeoutConfig {
            connect,
            read,
            write,
        }
    }

    /// Same allowance for every stage
    pub fn uniform(each: Duration) -> Self {
        Self::new(each, each, each)
    }

    /// Total budget for one exchange: connect + read + write.
    ///
    /// Repeated reads and writes of the same exchange share this total;
    /// nothing is handed out per call.
    pub fn total(&self) -> StintResult<Duration> {
        self.connect
            .checked_add(self.read)
            .and_then(|sum| sum.checked_add(self.write))
            .ok_or_else(|| StintError::InvalidConfig("total timeout overflows".to_string()))
    }

    /// Parse a flat TOML table such as `connect = "1s"`.
    /// Keys that are absent keep their default allowance.
    pub fn from_toml_str(source: &str) -> StintResult<Self> {
        let config: TimeoutConfig =
            toml::from_str(source).map_err(|e| StintError::InvalidConfig(e.to_string()))?;
        config.total()?;
        Ok(config)
    }
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}
