use async_trait::async_trait;
use log::{debug, warn};

use crate::{
    cache::{ResponseCache, expire_after_hours},
    config::Config,
    data::series::PriceSeries,
    ds::yahoo,
    error::{SrError, SrResult},
    period::Period,
    ticker::is_valid_symbol,
    utils::{compress, datetime::date_to_str, net::HttpClient},
};

/// Source of daily closes and dividends.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// An empty or short series is a valid answer, deciding whether it is usable
    /// is left to the caller.
    async fn fetch(&self, ticker: &str, period: &Period) -> SrResult<PriceSeries>;
}

#[derive(Clone, Debug)]
pub struct YahooProvider {
    yahoo_api: String,
    client: HttpClient,
    adjusted_close: bool,
    cache_expire_hours: u64,
    cache: Option<ResponseCache>,
}

impl YahooProvider {
    pub fn new(config: &Config, cache: Option<ResponseCache>) -> Self {
        Self {
            yahoo_api: config.yahoo_api.clone(),
            client: HttpClient::new(config.fetch_timeout_secs, config.max_retries),
            adjusted_close: config.adjusted_close,
            cache_expire_hours: config.cache_expire_hours,
            cache: if config.cache_expire_hours > 0 {
                cache
            } else {
                None
            },
        }
    }

    fn parse_chart(&self, bytes: &[u8]) -> SrResult<PriceSeries> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        PriceSeries::from_yahoo_chart_json(&json, self.adjusted_close)
    }

    /// Serves a cached chart when one is still fresh. Only answers that parse
    /// are written back, so an error page is never replayed from the cache.
    async fn fetch_chart(&self, ticker: &str, period: &Period) -> SrResult<PriceSeries> {
        let cache_key = format!(
            "yahoo:{ticker}?{period}&adjusted={}",
            self.adjusted_close
        );

        if let Some(cache) = &self.cache {
            match cache.get(&cache_key).await {
                Ok(Some(data)) => {
                    match compress::inflate(&data).and_then(|bytes| self.parse_chart(&bytes)) {
                        Ok(series) => return Ok(series),
                        Err(err) => warn!("[Cache Error] {cache_key}: {err}"),
                    }
                }
                Ok(None) => {}
                Err(err) => warn!("[Cache Error] {err}"),
            }
        }

        let bytes =
            yahoo::call_chart_api(&self.client, &self.yahoo_api, ticker, period.as_str()).await?;
        let series = self.parse_chart(&bytes)?;

        if let Some(cache) = &self.cache {
            let data = compress::deflate(&bytes)?;
            let expire = expire_after_hours(self.cache_expire_hours);
            if let Err(err) = cache.upsert(&cache_key, &data, &expire).await {
                warn!("[Cache Error] {err}");
            }
        }

        Ok(series)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch(&self, ticker: &str, period: &Period) -> SrResult<PriceSeries> {
        if !is_valid_symbol(ticker) {
            return Err(SrError::Invalid {
                code: "INVALID_TICKER",
                message: format!("Invalid ticker '{ticker}'"),
            });
        }

        let series = self.fetch_chart(ticker, period).await?;

        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            debug!(
                "[Fetched] {ticker} {period}: {} observations from {} to {}, dividends {}",
                series.len(),
                date_to_str(&first),
                date_to_str(&last),
                series.total_dividends()
            );
        } else {
            debug!("[Fetched] {ticker} {period}: no observations");
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_symbol_is_rejected_before_any_request() {
        let config = Config {
            yahoo_api: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let provider = YahooProvider::new(&config, None);

        let err = provider
            .fetch("AAPL/../x", &Period::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SrError::Invalid { code: "INVALID_TICKER", .. }));
    }

    #[tokio::test]
    async fn test_cached_response_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"timestamp":[1704189600,1704276000],"indicators":{"quote":[{"close":[10.0,10.5]}]}}],"error":null}}"#;
        cache
            .upsert(
                "yahoo:AAA?6mo&adjusted=false",
                &compress::deflate(body.as_bytes()).unwrap(),
                &expire_after_hours(1),
            )
            .await
            .unwrap();

        let config = Config {
            yahoo_api: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let provider = YahooProvider::new(&config, Some(cache));

        let series = provider.fetch("AAA", &Period::default()).await.unwrap();
        assert_eq!(series.closes(), [10.0, 10.5]);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        let config = Config {
            cache_expire_hours: 0,
            ..Config::default()
        };
        let provider = YahooProvider::new(&config, Some(cache));
        assert!(provider.cache.is_none());
    }

    /// Answers every request with `200 OK` and the given body.
    fn serve_ok(body: &'static str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        let config = Config {
            yahoo_api: serve_ok("<html>Service unavailable</html>"),
            max_retries: 0,
            ..Config::default()
        };
        let provider = YahooProvider::new(&config, Some(cache.clone()));

        assert!(provider.fetch("AAA", &Period::default()).await.is_err());
        assert_eq!(
            cache.get("yahoo:AAA?6mo&adjusted=false").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_chart_error_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db"))
            .await
            .unwrap();

        let config = Config {
            yahoo_api: serve_ok(
                r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
            ),
            max_retries: 0,
            ..Config::default()
        };
        let provider = YahooProvider::new(&config, Some(cache.clone()));

        let err = provider.fetch("ZZZZ3.SA", &Period::default()).await.unwrap_err();
        assert!(err.to_string().contains("No data found"));
        assert_eq!(
            cache.get("yahoo:ZZZZ3.SA?6mo&adjusted=false").await.unwrap(),
            None
        );
    }
}
