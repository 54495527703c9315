use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};
use url::Url;

use crate::error::{SrError, SrResult};

/// GET-only client that retries transient failures with exponential backoff.
/// Cheap to clone, clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ClientWithMiddleware,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32) -> Self {
        let timeout = Duration::from_secs(timeout_secs.max(1));

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), timeout)
            .jitter(Jitter::Bounded)
            .base(2)
            .build_with_max_retries(max_retries);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client, timeout }
    }

    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        user_agent: Option<&str>,
    ) -> SrResult<Vec<u8>> {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = user_agent.and_then(|ua| HeaderValue::from_str(ua).ok()) {
            headers.insert(USER_AGENT, user_agent);
        }

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .query(query)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        debug!("[HTTP Status Error] {response:?}");

        // 4xx answers carry the reason in the body, e.g. an unknown symbol
        let body = response.text().await.unwrap_or_default();
        Err(SrError::HttpStatusError {
            status: if body.trim().is_empty() {
                status.to_string()
            } else {
                format!("{status} {}", body.trim())
            },
            request: url.to_string(),
        })
    }
}

/// Appends path segments to a base URL, tolerating extra slashes on either side.
pub fn join_url(base_url: &str, extend_url: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(extend_url.split('/').filter(|s| !s.is_empty()));

    Ok(url.to_string())
}
