//! Input → lookup → history → chart, one identifier at a time.

use crate::chart::{build_chart, ChartSpec};
use crate::config::AppConfig;
use crate::data::{Candle, CandleSeries, DexClient, Identifier, PairInfo};
use crate::error::{FetchError, ScreenerResult, UsageError};
use crate::indicators::IndicatorConfig;
use tracing::{info, warn};

/// Where pairs and candles come from.
#[allow(async_fn_in_trait)]
pub trait MarketSource {
    async fn lookup_token(&self, identifier: &Identifier) -> Result<PairInfo, FetchError>;

    async fn fetch_history(
        &self,
        pair_address: &str,
        lookback_days: u32,
    ) -> Result<Vec<Candle>, FetchError>;
}

impl MarketSource for DexClient {
    async fn lookup_token(&self, identifier: &Identifier) -> Result<PairInfo, FetchError> {
        DexClient::lookup_token(self, identifier).await
    }

    async fn fetch_history(
        &self,
        pair_address: &str,
        lookback_days: u32,
    ) -> Result<Vec<Candle>, FetchError> {
        DexClient::fetch_history(self, pair_address, lookback_days).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub lookback_days: u32,
    pub indicators: IndicatorConfig,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl From<&AppConfig> for ChartSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            lookback_days: config.lookback_days,
            indicators: config.indicators.clone(),
        }
    }
}

/// Splits comma-separated input into identifiers. Blank input is rejected.
pub fn parse_identifiers(input: &str) -> Result<Vec<Identifier>, UsageError> {
    let identifiers = input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(Identifier::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if identifiers.is_empty() {
        return Err(UsageError::EmptyInput);
    }
    Ok(identifiers)
}

pub async fn load_series<S: MarketSource>(
    source: &S,
    identifier: &Identifier,
    lookback_days: u32,
) -> Result<CandleSeries, FetchError> {
    let pair = source.lookup_token(identifier).await?;
    let candles = source.fetch_history(&pair.pair_address, lookback_days).await?;
    if candles.is_empty() {
        warn!(symbol = pair.symbol(), "history came back empty");
        return Err(FetchError::HistoryFailure);
    }
    info!(symbol = pair.symbol(), candles = candles.len(), "history loaded");
    Ok(CandleSeries::new(pair.symbol(), candles))
}

/// Runs the whole pipeline. The first failure aborts it, so a chart is either
/// complete or absent.
pub async fn load_chart<S: MarketSource>(
    source: &S,
    input: &str,
    settings: &ChartSettings,
) -> ScreenerResult<ChartSpec> {
    let identifiers = parse_identifiers(input)?;

    let mut series = Vec::with_capacity(identifiers.len());
    for identifier in &identifiers {
        series.push(load_series(source, identifier, settings.lookback_days).await?);
    }

    Ok(build_chart(&series, &settings.indicators)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::TRACES_PER_SERIES;
    use crate::data::TokenInfo;
    use crate::error::ScreenerError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Lookup(Identifier),
        History(String, u32),
    }

    #[derive(Default)]
    struct FakeSource {
        pairs: HashMap<String, PairInfo>,
        candles: HashMap<String, Vec<Candle>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeSource {
        fn with_pair(mut self, query: &str, pair_address: &str, symbol: &str) -> Self {
            self.pairs.insert(
                query.to_string(),
                PairInfo {
                    pair_address: pair_address.to_string(),
                    base_token: TokenInfo {
                        symbol: symbol.to_string(),
                        address: None,
                        name: None,
                    },
                    quote_token: None,
                    chain_id: None,
                    dex_id: None,
                    url: None,
                    price_usd: None,
                },
            );
            self
        }

        fn with_candles(mut self, pair_address: &str, count: usize) -> Self {
            let candles = (0..count)
                .rev()
                .map(|i| {
                    let c = 0.1 + (i as f64 * 0.3).cos() * 0.01;
                    Candle::new(i as i64 * 3_600_000, c, c + 0.002, c - 0.002, c)
                })
                .collect();
            self.candles.insert(pair_address.to_string(), candles);
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MarketSource for FakeSource {
        async fn lookup_token(&self, identifier: &Identifier) -> Result<PairInfo, FetchError> {
            self.calls.lock().unwrap().push(Call::Lookup(identifier.clone()));
            self.pairs
                .get(identifier.as_str())
                .cloned()
                .ok_or(FetchError::LookupFailure)
        }

        async fn fetch_history(
            &self,
            pair_address: &str,
            lookback_days: u32,
        ) -> Result<Vec<Candle>, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::History(pair_address.to_string(), lookback_days));
            self.candles
                .get(pair_address)
                .cloned()
                .ok_or(FetchError::HistoryFailure)
        }
    }

    #[test]
    fn identifiers_split_on_commas() {
        let ids = parse_identifiers("DOGE, 0xabc ,,").unwrap();
        assert_eq!(
            ids,
            vec![
                Identifier::Search("DOGE".to_string()),
                Identifier::Address("0xabc".to_string()),
            ]
        );
    }

    #[test]
    fn blank_identifiers_are_a_usage_error() {
        assert_eq!(parse_identifiers(" , "), Err(UsageError::EmptyInput));
        assert_eq!(parse_identifiers(""), Err(UsageError::EmptyInput));
    }

    #[tokio::test]
    async fn unknown_address_stops_before_history() {
        let source = FakeSource::default();
        let result = load_chart(&source, "0xABC", &ChartSettings::default()).await;

        assert_eq!(result, Err(ScreenerError::Fetch(FetchError::LookupFailure)));
        assert_eq!(
            source.calls(),
            vec![Call::Lookup(Identifier::Address("0xABC".to_string()))]
        );
    }

    #[tokio::test]
    async fn blank_input_makes_no_calls() {
        let source = FakeSource::default();
        let result = load_chart(&source, "   ", &ChartSettings::default()).await;

        assert_eq!(result, Err(ScreenerError::Usage(UsageError::EmptyInput)));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn symbol_search_charts_thirty_days_of_history() {
        let source = FakeSource::default()
            .with_pair("DOGE", "P1", "DOGE")
            .with_candles("P1", 40);
        let chart = load_chart(&source, "DOGE", &ChartSettings::default())
            .await
            .unwrap();

        assert_eq!(
            source.calls(),
            vec![
                Call::Lookup(Identifier::Search("DOGE".to_string())),
                Call::History("P1".to_string(), 30),
            ]
        );
        assert_eq!(chart.traces.len(), TRACES_PER_SERIES);

        let ema = chart.traces.iter().find(|t| t.name == "DOGE EMA (20)").unwrap();
        assert_eq!(ema.y.iter().filter(|v| v.is_none()).count(), 19);
        assert_eq!(ema.y.iter().filter(|v| v.is_some()).count(), 21);
        assert!(ema.y[..19].iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn missing_history_is_reported_as_history_failure() {
        let source = FakeSource::default().with_pair("DOGE", "P1", "DOGE");
        let result = load_chart(&source, "DOGE", &ChartSettings::default()).await;
        assert_eq!(result, Err(ScreenerError::Fetch(FetchError::HistoryFailure)));
    }

    #[tokio::test]
    async fn empty_history_is_reported_as_history_failure() {
        let source = FakeSource::default()
            .with_pair("DOGE", "P1", "DOGE")
            .with_candles("P1", 0);
        let result = load_chart(&source, "DOGE", &ChartSettings::default()).await;
        assert_eq!(result, Err(ScreenerError::Fetch(FetchError::HistoryFailure)));
    }

    #[tokio::test]
    async fn comparison_shares_one_layout() {
        let source = FakeSource::default()
            .with_pair("DOGE", "P1", "DOGE")
            .with_pair("SHIB", "P2", "SHIB")
            .with_candles("P1", 40)
            .with_candles("P2", 40);
        let chart = load_chart(&source, "DOGE,SHIB", &ChartSettings::default())
            .await
            .unwrap();

        assert_eq!(chart.traces.len(), 2 * TRACES_PER_SERIES);
        assert_eq!(chart.axes.len(), 5);
        assert!(chart.traces[..TRACES_PER_SERIES].iter().all(|t| t.name.starts_with("DOGE ")));
        assert!(chart.traces[TRACES_PER_SERIES..].iter().all(|t| t.name.starts_with("SHIB ")));
    }

    #[tokio::test]
    async fn second_lookup_failure_yields_no_partial_chart() {
        let source = FakeSource::default()
            .with_pair("DOGE", "P1", "DOGE")
            .with_candles("P1", 40);
        let result = load_chart(&source, "DOGE,NOPE", &ChartSettings::default()).await;

        assert_eq!(result, Err(ScreenerError::Fetch(FetchError::LookupFailure)));
        assert_eq!(source.calls().len(), 3);
    }
}
