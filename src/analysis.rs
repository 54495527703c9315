//! Sharpe ratio of a single ticker, with and without its dividends.
//!
//! Both ratios share the same annualized volatility. The dividend adjusted ratio
//! adds the plain sum of the dividends paid in the window to the annualized mean
//! return, without annualizing it.

use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::{
    data::series::PriceSeries,
    error::{SrError, SrResult},
    period::Period,
    provider::MarketDataProvider,
    utils::{financial::calc_sharpe_ratio, stats},
};

pub const NOT_EVALUATED_LABEL: &str = "Rating not evaluated for dividend-adjusted index";

/// Qualitative bucket of a no-dividend Sharpe ratio, best first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Rating {
    #[strum(to_string = "Very Good")]
    VeryGood,
    Good,
    Mediocre,
    Bad,
}

impl Rating {
    /// NaN falls through every comparison and is rated `Bad`.
    pub fn from_sharpe(sharpe: f64) -> Self {
        if sharpe > 1.0 {
            Rating::VeryGood
        } else if sharpe > 0.5 {
            Rating::Good
        } else if sharpe >= 0.0 {
            Rating::Mediocre
        } else {
            Rating::Bad
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Assessment {
    Rated(Rating),
    NotEvaluated,
    Failed(String),
}

impl Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assessment::Rated(rating) => write!(f, "{rating}"),
            Assessment::NotEvaluated => write!(f, "{NOT_EVALUATED_LABEL}"),
            Assessment::Failed(message) => write!(f, "{message}"),
        }
    }
}

impl Serialize for Assessment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SharpeStats {
    /// Number of daily returns, one less than the number of closes.
    pub returns: usize,
    pub mean_return: f64,
    pub std_dev_return: f64,
    pub total_dividends: f64,
    pub sharpe_no_dividends: f64,
    pub sharpe_with_dividends: f64,
}

impl SharpeStats {
    /// `None` when fewer than two closes are available. With exactly two closes
    /// the sample deviation of the single return is undefined and both ratios
    /// come out as NaN.
    pub fn from_series(series: &PriceSeries, risk_free_rate: f64) -> Option<Self> {
        let closes = series.closes();
        if closes.len() < 2 {
            return None;
        }

        let daily_returns = stats::pct_change(&closes);
        let mean_return = stats::mean(&daily_returns)?;
        let std_dev_return = stats::std(&daily_returns, 1).unwrap_or(f64::NAN);
        let total_dividends = series.total_dividends();

        Some(Self {
            returns: daily_returns.len(),
            mean_return,
            std_dev_return,
            total_dividends,
            sharpe_no_dividends: calc_sharpe_ratio(mean_return, std_dev_return, risk_free_rate, 0.0),
            sharpe_with_dividends: calc_sharpe_ratio(
                mean_return,
                std_dev_return,
                risk_free_rate,
                total_dividends,
            ),
        })
    }

    pub fn rating(&self) -> Rating {
        Rating::from_sharpe(self.sharpe_no_dividends)
    }

    /// The rating always comes from the no-dividend ratio and is only given when
    /// dividends are left out.
    pub fn assess(&self, include_dividends: bool) -> Assessment {
        if include_dividends {
            Assessment::NotEvaluated
        } else {
            Assessment::Rated(self.rating())
        }
    }
}

/// Outcome of one analysis call.
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    /// The dividend adjusted ratio when dividends are included, else the plain one.
    pub sharpe: f64,
    pub total_dividends: f64,
    pub assessment: Assessment,
    pub sharpe_no_dividends: f64,
}

impl Analysis {
    pub fn from_stats(stats: &SharpeStats, include_dividends: bool) -> Self {
        Self {
            sharpe: if include_dividends {
                stats.sharpe_with_dividends
            } else {
                stats.sharpe_no_dividends
            },
            total_dividends: stats.total_dividends,
            assessment: stats.assess(include_dividends),
            sharpe_no_dividends: stats.sharpe_no_dividends,
        }
    }
}

pub fn compute_stats(
    ticker: &str,
    period: &Period,
    series: &PriceSeries,
    risk_free_rate: f64,
) -> SrResult<SharpeStats> {
    SharpeStats::from_series(series, risk_free_rate).ok_or_else(|| SrError::InsufficientData {
        ticker: ticker.to_string(),
        period: period.to_string(),
    })
}

/// Fetches the series once and computes both ratios from it.
pub async fn fetch_stats(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    risk_free_rate: f64,
    period: &Period,
) -> SrResult<SharpeStats> {
    let series = provider
        .fetch(ticker, period)
        .await
        .map_err(|err| err.into_fetch_failure(ticker))?;

    compute_stats(ticker, period, &series, risk_free_rate)
}

pub async fn analyze(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    risk_free_rate: f64,
    period: &Period,
    include_dividends: bool,
) -> SrResult<Analysis> {
    let stats = fetch_stats(provider, ticker, risk_free_rate, period).await?;

    Ok(Analysis::from_stats(&stats, include_dividends))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;

    struct FakeProvider {
        series: HashMap<String, PriceSeries>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn fetch(&self, ticker: &str, _period: &Period) -> SrResult<PriceSeries> {
            self.series
                .get(ticker)
                .cloned()
                .ok_or_else(|| SrError::HttpStatusError {
                    status: "404 Not Found".to_string(),
                    request: ticker.to_string(),
                })
        }
    }

    fn series(closes: &[f64], dividends: &[f64]) -> PriceSeries {
        PriceSeries::from_values(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            closes,
            dividends,
        )
    }

    fn provider() -> FakeProvider {
        let mut all = HashMap::new();
        all.insert(
            "AAA".to_string(),
            series(
                &[10.0, 10.2, 10.1, 10.4, 10.3, 10.6],
                &[0.0, 0.0, 0.3, 0.0, 0.0, 0.2],
            ),
        );
        all.insert("ONE".to_string(), series(&[10.0], &[]));
        all.insert("NONE".to_string(), series(&[], &[]));
        all.insert("FLAT".to_string(), series(&[10.0, 10.0, 10.0], &[]));

        FakeProvider { series: all }
    }

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(Rating::from_sharpe(1.0001), Rating::VeryGood);
        assert_eq!(Rating::from_sharpe(1.0), Rating::Good);
        assert_eq!(Rating::from_sharpe(0.5001), Rating::Good);
        assert_eq!(Rating::from_sharpe(0.5), Rating::Mediocre);
        assert_eq!(Rating::from_sharpe(0.0), Rating::Mediocre);
        assert_eq!(Rating::from_sharpe(-0.0001), Rating::Bad);
        assert_eq!(Rating::from_sharpe(f64::INFINITY), Rating::VeryGood);
        assert_eq!(Rating::from_sharpe(f64::NEG_INFINITY), Rating::Bad);
        assert_eq!(Rating::from_sharpe(f64::NAN), Rating::Bad);
    }

    #[test]
    fn test_rating_labels() {
        assert_eq!(Rating::VeryGood.to_string(), "Very Good");
        assert_eq!(Rating::Good.to_string(), "Good");
        assert_eq!(Rating::Mediocre.to_string(), "Mediocre");
        assert_eq!(Rating::Bad.to_string(), "Bad");
        assert_eq!(Assessment::NotEvaluated.to_string(), NOT_EVALUATED_LABEL);
    }

    #[test]
    fn test_stats_formula() {
        let s = series(&[100.0, 101.0, 100.5, 102.0], &[0.0, 0.5, 0.0, 0.25]);
        let stats = SharpeStats::from_series(&s, 0.1).unwrap();

        let r = [0.01, 100.5 / 101.0 - 1.0, 102.0 / 100.5 - 1.0];
        let mean = r.iter().sum::<f64>() / 3.0;
        let std =
            (r.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 2.0).sqrt();
        let volatility = std * 252.0_f64.sqrt();

        assert_eq!(stats.returns, 3);
        assert!((stats.mean_return - mean).abs() < 1e-15);
        assert!((stats.std_dev_return - std).abs() < 1e-15);
        assert!((stats.total_dividends - 0.75).abs() < 1e-15);
        assert!((stats.sharpe_no_dividends - (mean * 252.0 - 0.1) / volatility).abs() < 1e-10);
        assert!(
            (stats.sharpe_with_dividends - (mean * 252.0 + 0.75 - 0.1) / volatility).abs() < 1e-10
        );
    }

    #[test]
    fn test_dividend_term_difference() {
        let s = series(&[10.0, 10.2, 10.1, 10.4, 10.3, 10.6], &[0.0, 0.0, 0.3, 0.0, 0.0, 0.2]);
        let stats = SharpeStats::from_series(&s, 0.105).unwrap();

        let expected =
            stats.total_dividends / (stats.std_dev_return * 252.0_f64.sqrt());
        assert!(
            ((stats.sharpe_with_dividends - stats.sharpe_no_dividends) - expected).abs() < 1e-10
        );
    }

    #[test]
    fn test_first_dividend_counts_in_total() {
        let s = series(&[10.0, 10.5, 10.2], &[0.4, 0.0, 0.0]);
        let stats = SharpeStats::from_series(&s, 0.0).unwrap();

        assert!((stats.total_dividends - 0.4).abs() < 1e-15);
    }

    #[test]
    fn test_two_closes_give_nan_ratios() {
        let stats = SharpeStats::from_series(&series(&[10.0, 11.0], &[]), 0.1).unwrap();

        assert_eq!(stats.returns, 1);
        assert!(stats.std_dev_return.is_nan());
        assert!(stats.sharpe_no_dividends.is_nan());
        assert!(stats.sharpe_with_dividends.is_nan());
        assert_eq!(stats.rating(), Rating::Bad);
    }

    #[test]
    fn test_assess() {
        let stats = SharpeStats::from_series(&series(&[10.0, 10.1, 10.3, 10.2], &[]), 0.0)
            .unwrap();

        assert_eq!(stats.assess(true), Assessment::NotEvaluated);
        assert_eq!(stats.assess(false), Assessment::Rated(stats.rating()));
    }

    #[tokio::test]
    async fn test_analyze_selects_primary_ratio() {
        let provider = provider();
        let period = Period::default();

        let plain = analyze(&provider, "AAA", 0.105, &period, false).await.unwrap();
        let with_dividends = analyze(&provider, "AAA", 0.105, &period, true).await.unwrap();

        assert_eq!(plain.sharpe, plain.sharpe_no_dividends);
        assert_eq!(with_dividends.sharpe_no_dividends, plain.sharpe_no_dividends);
        assert!(with_dividends.sharpe > plain.sharpe);
        assert!((plain.total_dividends - 0.5).abs() < 1e-12);
        assert_eq!(with_dividends.total_dividends, plain.total_dividends);
        assert!(matches!(plain.assessment, Assessment::Rated(_)));
        assert_eq!(with_dividends.assessment, Assessment::NotEvaluated);
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        let provider = provider();
        let period = Period::default();

        let first = analyze(&provider, "AAA", 0.105, &period, false).await.unwrap();
        let second = analyze(&provider, "AAA", 0.105, &period, false).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_analyze_insufficient_data() {
        let provider = provider();
        let period: Period = "1mo".parse().unwrap();

        for ticker in ["ONE", "NONE"] {
            let err = analyze(&provider, ticker, 0.105, &period, false)
                .await
                .unwrap_err();
            assert!(matches!(err, SrError::InsufficientData { .. }));
            assert!(err.to_string().contains(ticker));
            assert!(err.to_string().contains("1mo"));
        }
    }

    #[tokio::test]
    async fn test_analyze_fetch_failure() {
        let provider = provider();

        let err = analyze(&provider, "UNKNOWN", 0.105, &Period::default(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, SrError::FetchFailure { .. }));
        assert!(err.to_string().contains("404 Not Found"));
    }

    #[tokio::test]
    async fn test_analyze_constant_series() {
        let provider = provider();

        let analysis = analyze(&provider, "FLAT", 0.105, &Period::default(), false)
            .await
            .unwrap();
        assert_eq!(analysis.sharpe_no_dividends, f64::NEG_INFINITY);
        assert_eq!(analysis.assessment, Assessment::Rated(Rating::Bad));

        let analysis = analyze(&provider, "FLAT", 0.0, &Period::default(), false)
            .await
            .unwrap();
        assert!(analysis.sharpe_no_dividends.is_nan());
    }
}
