use crate::config::AppConfig;
use crate::data::{Candle, ChartResponse, Identifier, PairInfo, PairsResponse};
use crate::error::FetchError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";

/// Why a single request failed. Only used for logging and retry decisions;
/// callers see a [`FetchError`].
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
}

impl RequestError {
    pub fn is_transient(&self) -> bool {
        match self {
            RequestError::Transport(err) => err.is_timeout() || err.is_connect(),
            RequestError::Status(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt + 1`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt.min(10))
    }
}

/// Unix seconds for the start of the history window.
pub fn history_start(now: DateTime<Utc>, lookback_days: u32) -> i64 {
    (now - ChronoDuration::days(i64::from(lookback_days))).timestamp()
}

#[derive(Debug, Clone)]
pub struct DexClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DexClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn lookup_token(&self, identifier: &Identifier) -> Result<PairInfo, FetchError> {
        let (url, query): (String, Vec<(&str, &str)>) = match identifier {
            Identifier::Address(address) => {
                (format!("{}/tokens/{}", self.base_url, address), vec![])
            }
            Identifier::Search(text) => {
                (format!("{}/search", self.base_url), vec![("q", text.as_str())])
            }
        };

        info!(identifier = identifier.as_str(), "looking up token");
        let response = self
            .get_json::<PairsResponse>(&url, &query)
            .await
            .map_err(|err| {
                error!(identifier = identifier.as_str(), "token lookup failed: {}", err);
                FetchError::LookupFailure
            })?;

        match response.into_first_pair() {
            Ok(Some(pair)) => {
                info!(
                    pair = %pair.pair_address,
                    symbol = %pair.symbol(),
                    chain = pair.chain_id.as_deref().unwrap_or("?"),
                    "token resolved"
                );
                Ok(pair)
            }
            Ok(None) => {
                info!(identifier = identifier.as_str(), "no pairs matched");
                Err(FetchError::LookupFailure)
            }
            Err(err) => {
                error!(identifier = identifier.as_str(), "first pair is malformed: {}", err);
                Err(FetchError::LookupFailure)
            }
        }
    }

    pub async fn fetch_history(
        &self,
        pair_address: &str,
        lookback_days: u32,
    ) -> Result<Vec<Candle>, FetchError> {
        let url = format!("{}/chart/{}", self.base_url, pair_address);
        let from = history_start(Utc::now(), lookback_days).to_string();

        info!(pair = pair_address, lookback_days, "fetching candle history");
        let response = self
            .get_json::<ChartResponse>(&url, &[("from", from.as_str())])
            .await
            .map_err(|err| {
                error!(pair = pair_address, "history request failed: {}", err);
                FetchError::HistoryFailure
            })?;

        let candles = response
            .into_candles()
            .filter(|candles| !candles.is_empty())
            .ok_or_else(|| {
                error!(pair = pair_address, "history response has no candles");
                FetchError::HistoryFailure
            })?;

        debug!(pair = pair_address, count = candles.len(), "decoded candles");
        Ok(candles)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let mut attempt = 0;
        loop {
            match self.get_json_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    warn!(url, attempt = attempt + 1, ?delay, "retrying after: {}", err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }
}
