use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    error::{SrError, SrResult},
    utils::datetime::date_from_unix_timestamp,
};

#[derive(Clone, Debug, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub close: f64,
    pub dividend: f64,
}

/// Daily closes and dividends of one ticker, ordered by trading date ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
    observations: Vec<DailyObservation>,
}

impl PriceSeries {
    pub fn new(mut observations: Vec<DailyObservation>) -> Self {
        observations.sort_by_key(|o| o.date);

        Self { observations }
    }

    /// Builds a series from bare values, dating them on consecutive days. Mostly
    /// useful for synthetic data.
    pub fn from_values(start_date: NaiveDate, closes: &[f64], dividends: &[f64]) -> Self {
        let observations = closes
            .iter()
            .enumerate()
            .filter_map(|(i, &close)| {
                start_date
                    .checked_add_days(chrono::Days::new(i as u64))
                    .map(|date| DailyObservation {
                        date,
                        close,
                        dividend: dividends.get(i).copied().unwrap_or(0.0),
                    })
            })
            .collect();

        Self { observations }
    }

    /// Parses a Yahoo Finance `v8/finance/chart` answer fetched with `events=div`.
    pub fn from_yahoo_chart_json(json: &Value, adjusted_close: bool) -> SrResult<Self> {
        let chart = &json["chart"];

        if let Some(error) = chart["error"].as_object() {
            return Err(SrError::Invalid {
                code: "YAHOO_CHART_ERROR",
                message: format!(
                    "[{}] {}",
                    error
                        .get("code")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown"),
                    error
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                ),
            });
        }

        let result = &chart["result"][0];
        if result.is_null() {
            return Ok(Self::default());
        }

        let gmt_offset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);
        let closes = if adjusted_close {
            &result["indicators"]["adjclose"][0]["adjclose"]
        } else {
            &result["indicators"]["quote"][0]["close"]
        };

        let mut observations: Vec<DailyObservation> = vec![];
        if let (Some(timestamps), Some(closes)) = (result["timestamp"].as_array(), closes.as_array())
        {
            for (ts, close) in timestamps.iter().zip(closes) {
                if let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) {
                    if close > 0.0 {
                        if let Some(date) = date_from_unix_timestamp(ts, gmt_offset) {
                            observations.push(DailyObservation {
                                date,
                                close,
                                dividend: 0.0,
                            });
                        }
                    }
                }
            }
        }

        let mut series = Self::new(observations);

        if let Some(dividends) = result["events"]["dividends"].as_object() {
            for dividend in dividends.values() {
                if let (Some(ts), Some(amount)) =
                    (dividend["date"].as_i64(), dividend["amount"].as_f64())
                {
                    if let Some(date) = date_from_unix_timestamp(ts, gmt_offset) {
                        series.attach_dividend(&date, amount);
                    }
                }
            }
        }

        Ok(series)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    pub fn total_dividends(&self) -> f64 {
        self.observations.iter().map(|o| o.dividend).sum()
    }

    /// Books a dividend on the observation of its date, else on the next later
    /// one, else on the last one.
    fn attach_dividend(&mut self, date: &NaiveDate, amount: f64) {
        let index = self.observations.partition_point(|o| o.date < *date);
        let index = index.min(self.observations.len().saturating_sub(1));

        if let Some(observation) = self.observations.get_mut(index) {
            observation.dividend += amount;
        }
    }
}
