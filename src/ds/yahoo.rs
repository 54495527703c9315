use fake_user_agent::get_rua;
use log::debug;
use rand::Rng;
use tokio::time::{Duration, sleep};

use crate::{
    error::{SrError, SrResult},
    utils::net::{HttpClient, join_url},
};

/// Symbol used to probe the chart endpoint.
const CHECK_SYMBOL: &str = "^GSPC";

/// Daily chart of one symbol, closes plus dividend events, as raw JSON bytes.
pub async fn call_chart_api(
    client: &HttpClient,
    yahoo_api: &str,
    symbol: &str,
    range: &str,
) -> SrResult<Vec<u8>> {
    let url = join_url(yahoo_api, &format!("/v8/finance/chart/{symbol}"))?;

    // Optional politeness delay in seconds, randomized by a third either way
    let request_delay_secs: f64 = std::env::var("YAHOO_DELAY")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    if request_delay_secs > 0.0 {
        let secs = request_delay_secs * rand::rng().random_range(0.67..=1.33);
        sleep(Duration::from_secs_f64(secs)).await;
    }

    debug!("[Yahoo Chart] {symbol} range={range}");

    client
        .get(
            &url,
            &[
                ("range", range),
                ("interval", "1d"),
                ("events", "div"),
                ("includeAdjustedClose", "true"),
            ],
            Some(get_rua()),
        )
        .await
}

pub async fn check_api(yahoo_api: &str, timeout_secs: u64) -> SrResult<()> {
    let client = HttpClient::new(timeout_secs, 0);
    let bytes = call_chart_api(&client, yahoo_api, CHECK_SYMBOL, "5d").await?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;

    match json["chart"]["result"][0]["timestamp"].as_array() {
        Some(timestamps) if !timestamps.is_empty() => Ok(()),
        _ => Err(SrError::Invalid {
            code: "INVALID_RESPONSE",
            message: format!("No quotes of '{CHECK_SYMBOL}' in the chart response"),
        }),
    }
}
