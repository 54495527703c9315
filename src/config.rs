use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{SrError, SrResult},
    period::Period,
};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.105;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Annual risk-free rate as a decimal fraction, 0.105 is 10.5%.
    pub risk_free_rate: f64,
    pub period: Period,

    pub yahoo_api: String,
    pub fetch_timeout_secs: u64,
    pub max_retries: u32,
    /// 0 disables the response cache.
    pub cache_expire_hours: u64,
    pub concurrency: usize,
    pub adjusted_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            period: Period::default(),
            yahoo_api: "https://query1.finance.yahoo.com".to_string(),
            fetch_timeout_secs: 30,
            max_retries: 3,
            cache_expire_hours: 12,
            concurrency: 1,
            adjusted_close: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, strum::Display, strum::EnumIter, strum::EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum ConfigKey {
    #[strum(to_string = "risk_free_rate", serialize = "rate")]
    RiskFreeRate,
    Period,
    YahooApi,
    FetchTimeoutSecs,
    MaxRetries,
    CacheExpireHours,
    Concurrency,
    AdjustedClose,
}

impl Config {
    /// Applies one textual setting, leaving `self` untouched when the value is
    /// rejected.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> SrResult<()> {
        let value = value.trim();

        match key {
            ConfigKey::RiskFreeRate => {
                let rate = parse_value::<f64>(key, value)?;
                if !rate.is_finite() || rate < 0.0 {
                    return Err(invalid_value(key, value));
                }
                self.risk_free_rate = rate;
            }
            ConfigKey::Period => self.period = value.parse()?,
            ConfigKey::YahooApi => {
                url::Url::parse(value)?;
                self.yahoo_api = value.to_string();
            }
            ConfigKey::FetchTimeoutSecs => {
                let secs = parse_value::<u64>(key, value)?;
                if secs == 0 {
                    return Err(invalid_value(key, value));
                }
                self.fetch_timeout_secs = secs;
            }
            ConfigKey::MaxRetries => self.max_retries = parse_value(key, value)?,
            ConfigKey::CacheExpireHours => self.cache_expire_hours = parse_value(key, value)?,
            ConfigKey::Concurrency => {
                let concurrency = parse_value::<usize>(key, value)?;
                if concurrency == 0 {
                    return Err(invalid_value(key, value));
                }
                self.concurrency = concurrency;
            }
            ConfigKey::AdjustedClose => self.adjusted_close = parse_value(key, value)?,
        }

        Ok(())
    }

    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::RiskFreeRate => self.risk_free_rate.to_string(),
            ConfigKey::Period => self.period.to_string(),
            ConfigKey::YahooApi => self.yahoo_api.clone(),
            ConfigKey::FetchTimeoutSecs => self.fetch_timeout_secs.to_string(),
            ConfigKey::MaxRetries => self.max_retries.to_string(),
            ConfigKey::CacheExpireHours => self.cache_expire_hours.to_string(),
            ConfigKey::Concurrency => self.concurrency.to_string(),
            ConfigKey::AdjustedClose => self.adjusted_close.to_string(),
        }
    }
}

/// Durable home of [`Config`], one TOML file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn default_location() -> SrResult<Self> {
        let path = confy::get_configuration_file_path(env!("CARGO_PKG_NAME"), "settings")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored settings, falling back to defaults when none exist yet.
    pub fn load(&self) -> SrResult<Config> {
        if self.path.exists() {
            Ok(confy::load_path(&self.path)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Writes next to the target and renames over it, so a crash never leaves a
    /// half written file behind.
    pub fn save(&self, config: &Config) -> SrResult<()> {
        let tmp_path = self.path.with_extension("toml.tmp");
        confy::store_path(&tmp_path, config)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("[Config Saved] {}", self.path.to_string_lossy());

        Ok(())
    }
}

fn parse_value<T: FromStr>(key: ConfigKey, value: &str) -> SrResult<T> {
    value.parse::<T>().map_err(|_| invalid_value(key, value))
}

fn invalid_value(key: ConfigKey, value: &str) -> SrError {
    SrError::Invalid {
        code: "INVALID_CONFIG_VALUE",
        message: format!("Invalid value '{value}' for '{key}'"),
    }
}
