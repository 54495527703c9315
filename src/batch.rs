use std::{cmp::Ordering, time::Duration};

use futures::{StreamExt, stream};
use log::{info, warn};
use serde::Serialize;
use tokio::sync::mpsc::Sender;

use crate::{
    analysis::{Assessment, SharpeStats, fetch_stats},
    config::Config,
    error::{SrError, SrResult},
    period::Period,
    provider::MarketDataProvider,
};

/// One row of a batch run. Ratios and dividends are either all present or all
/// absent, in which case `rating` holds the failure text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub ticker: String,
    pub sharpe_no_dividends: Option<f64>,
    pub sharpe_with_dividends: Option<f64>,
    pub total_dividends: Option<f64>,
    pub rating: Assessment,
}

#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub risk_free_rate: f64,
    pub period: Period,
    /// Tickers in flight at once, 1 processes them one after another.
    pub concurrency: usize,
    pub fetch_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub enum BatchEvent {
    Started { index: usize, ticker: String },
    Finished { index: usize, result: AnalysisResult },
}

impl AnalysisResult {
    pub fn from_stats(ticker: &str, stats: &SharpeStats) -> Self {
        Self {
            ticker: ticker.to_string(),
            sharpe_no_dividends: Some(stats.sharpe_no_dividends),
            sharpe_with_dividends: Some(stats.sharpe_with_dividends),
            total_dividends: Some(stats.total_dividends),
            rating: stats.assess(false),
        }
    }

    pub fn failed(ticker: &str, err: &SrError) -> Self {
        Self {
            ticker: ticker.to_string(),
            sharpe_no_dividends: None,
            sharpe_with_dividends: None,
            total_dividends: None,
            rating: Assessment::Failed(err.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.rating, Assessment::Failed(_))
    }

    /// Value the results are ranked by, NaN counts as undefined.
    fn ranking_value(&self) -> Option<f64> {
        self.sharpe_no_dividends.filter(|v| !v.is_nan())
    }
}

impl BatchOptions {
    /// Snapshot of the settings for one run. The whole fetch of a ticker is
    /// bounded by the request timeout times the number of attempts.
    pub fn from_config(config: &Config) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
            period: config.period.clone(),
            concurrency: config.concurrency.max(1),
            fetch_timeout: Some(Duration::from_secs(
                config
                    .fetch_timeout_secs
                    .saturating_mul(u64::from(config.max_retries).saturating_add(1)),
            )),
        }
    }
}

/// Analyzes every ticker and returns one result per ticker, ranked by the
/// no-dividend Sharpe ratio. A failing ticker never stops the batch.
pub async fn run(
    provider: &dyn MarketDataProvider,
    tickers: &[String],
    options: &BatchOptions,
    event_sender: Option<Sender<BatchEvent>>,
) -> SrResult<Vec<AnalysisResult>> {
    if tickers.is_empty() {
        return Err(SrError::EmptyInput(
            "Please enter at least one ticker".to_string(),
        ));
    }

    info!(
        "[Batch] {} tickers, period {}, risk-free rate {}",
        tickers.len(),
        options.period,
        options.risk_free_rate
    );

    let mut results: Vec<AnalysisResult> = stream::iter(tickers.iter().cloned().enumerate())
        .map(|(index, ticker)| {
            let event_sender = event_sender.clone();

            async move {
                // Progress is best effort, a slow listener must never stall the batch
                if let Some(sender) = &event_sender {
                    let _ = sender.try_send(BatchEvent::Started {
                        index,
                        ticker: ticker.clone(),
                    });
                }

                let result = analyze_ticker(provider, &ticker, options).await;

                if let Some(sender) = &event_sender {
                    let _ = sender.try_send(BatchEvent::Finished {
                        index,
                        result: result.clone(),
                    });
                }

                result
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    sort_results(&mut results);

    Ok(results)
}

/// Descending by no-dividend ratio, undefined ratios last in their original order.
pub fn sort_results(results: &mut [AnalysisResult]) {
    results.sort_by(|a, b| match (a.ranking_value(), b.ranking_value()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

async fn analyze_ticker(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    options: &BatchOptions,
) -> AnalysisResult {
    let fetch = fetch_stats(provider, ticker, options.risk_free_rate, &options.period);

    let outcome = match options.fetch_timeout {
        Some(timeout) => match tokio::time::timeout(timeout, fetch).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SrError::Timeout {
                ticker: ticker.to_string(),
                secs: timeout.as_secs(),
            }
            .into_fetch_failure(ticker)),
        },
        None => fetch.await,
    };

    match outcome {
        Ok(stats) => AnalysisResult::from_stats(ticker, &stats),
        Err(err) => {
            warn!("[{ticker}] {err}");
            AnalysisResult::failed(ticker, &err)
        }
    }
}
