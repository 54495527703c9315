use std::{path::PathBuf, str::FromStr};

use itertools::Itertools;
use log::{debug, warn};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::Sender;

use crate::{
    CACHE_PATH, CONFIG, CONFIG_STORE,
    batch::{self, AnalysisResult, BatchEvent, BatchOptions},
    cache::ResponseCache,
    config::{Config, ConfigKey},
    ds::yahoo,
    error::*,
    period::Period,
    provider::YahooProvider,
};

/// One-off replacements of the stored settings for a single run.
#[derive(Clone, Debug, Default)]
pub struct AnalyzeOverrides {
    pub risk_free_rate: Option<f64>,
    pub period: Option<Period>,
    pub concurrency: Option<usize>,
}

pub async fn get_config() -> Config {
    CONFIG.read().await.clone()
}

pub fn get_config_path() -> Option<PathBuf> {
    CONFIG_STORE.get().map(|store| store.path().to_path_buf())
}

/// Changes one setting and persists it right away. Nothing changes in memory
/// unless the write succeeded.
pub async fn set_config(key: &str, value: &str) -> SrResult<Config> {
    let key = ConfigKey::from_str(key.trim()).map_err(|_| SrError::Invalid {
        code: "UNKNOWN_CONFIG_KEY",
        message: format!(
            "Unknown key '{key}', expected one of: {}",
            ConfigKey::iter().map(|k| k.to_string()).join(", ")
        ),
    })?;

    let mut config = CONFIG.write().await;
    let mut updated = config.clone();
    updated.set(key, value)?;

    if let Some(store) = CONFIG_STORE.get() {
        store.save(&updated)?;
    } else {
        warn!("[Config] No store initialized, '{key}' is only changed in memory");
    }

    *config = updated.clone();

    Ok(updated)
}

pub async fn analyze(
    tickers: &[String],
    overrides: &AnalyzeOverrides,
    event_sender: Option<Sender<BatchEvent>>,
) -> SrResult<Vec<AnalysisResult>> {
    let config = get_config().await;

    let mut options = BatchOptions::from_config(&config);
    if let Some(risk_free_rate) = overrides.risk_free_rate {
        if !risk_free_rate.is_finite() || risk_free_rate < 0.0 {
            return Err(SrError::Invalid {
                code: "INVALID_RISK_FREE_RATE",
                message: format!("Invalid risk-free rate '{risk_free_rate}'"),
            });
        }
        options.risk_free_rate = risk_free_rate;
    }
    if let Some(period) = &overrides.period {
        options.period = period.clone();
    }
    if let Some(concurrency) = overrides.concurrency {
        options.concurrency = concurrency.max(1);
    }

    let provider = YahooProvider::new(&config, open_cache(&config).await);

    batch::run(&provider, tickers, &options, event_sender).await
}

/// Probes every external dependency, pairing its title with the error if any.
pub async fn check() -> SrResult<Vec<(String, Option<SrError>)>> {
    let config = get_config().await;
    let mut status: Vec<(String, Option<SrError>)> = vec![];

    status.push((
        format!("Yahoo Finance ({})", config.yahoo_api),
        yahoo::check_api(&config.yahoo_api, config.fetch_timeout_secs)
            .await
            .err(),
    ));

    status.push((
        format!("Cache ({})", CACHE_PATH.to_string_lossy()),
        ResponseCache::open(&CACHE_PATH).await.err(),
    ));

    if let Some(config_path) = get_config_path() {
        status.push((
            format!("Settings ({})", config_path.to_string_lossy()),
            if config_path.exists() {
                None
            } else {
                Some(SrError::Invalid {
                    code: "NO_SETTINGS_FILE",
                    message: "Not saved yet, defaults are used".to_string(),
                })
            },
        ));
    }

    Ok(status)
}

async fn open_cache(config: &Config) -> Option<ResponseCache> {
    if config.cache_expire_hours == 0 {
        return None;
    }

    match ResponseCache::open(&CACHE_PATH).await {
        Ok(cache) => {
            match cache.purge_expired().await {
                Ok(deleted) => debug!("[Cache] {deleted} expired entries purged"),
                Err(err) => warn!("[Cache Error] {err}"),
            }

            Some(cache)
        }
        Err(err) => {
            warn!("[Cache Error] {err}");
            None
        }
    }
}
