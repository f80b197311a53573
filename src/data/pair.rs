use crate::data::Candle;
use crate::error::UsageError;
use serde::Deserialize;

/// What the user typed: a contract address or free text to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Address(String),
    Search(String),
}

impl Identifier {
    pub fn parse(input: &str) -> Result<Self, UsageError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UsageError::EmptyInput);
        }

        if trimmed.starts_with("0x") {
            Ok(Identifier::Address(trimmed.to_string()))
        } else {
            Ok(Identifier::Search(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Address(s) | Identifier::Search(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One DEX pair record from a token lookup or search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub pair_address: String,
    pub base_token: TokenInfo,
    #[serde(default)]
    pub quote_token: Option<TokenInfo>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
}

impl PairInfo {
    pub fn symbol(&self) -> &str {
        &self.base_token.symbol
    }
}

/// `/tokens/{address}` and `/search` both answer with a `pairs` array, which may be null.
/// Only the first element is ever decoded, so odd records further down are ignored.
#[derive(Debug, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<serde_json::Value>>,
}

impl PairsResponse {
    pub fn into_first_pair(self) -> Result<Option<PairInfo>, serde_json::Error> {
        match self.pairs.and_then(|pairs| pairs.into_iter().next()) {
            Some(first) => serde_json::from_value(first).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    #[serde(default)]
    pub data: Option<ChartData>,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub candles: Option<Vec<Candle>>,
}

impl ChartResponse {
    pub fn into_candles(self) -> Option<Vec<Candle>> {
        self.data.and_then(|data| data.candles)
    }
}
