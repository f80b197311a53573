use thiserror::Error;

/// Input that is rejected before any request is made or any indicator computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UsageError {
    #[error("Please enter a contract address or a token symbol.")]
    EmptyInput,

    #[error("No candle series to chart.")]
    NoSeries,

    #[error("{label} has only {len} candle(s); at least 2 are needed to chart it.")]
    TooFewCandles { label: String, len: usize },
}

/// The two failure signals the fetcher surfaces. The network cause is logged, not returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    #[error("Unable to fetch data for the given coin. Please check the input and try again.")]
    LookupFailure,

    #[error("Unable to fetch historical data for the given coin.")]
    HistoryFailure,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type ScreenerResult<T> = Result<T, ScreenerError>;

/// A config file that exists but cannot be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_keep_distinct_messages() {
        let lookup = ScreenerError::from(FetchError::LookupFailure).to_string();
        let history = ScreenerError::from(FetchError::HistoryFailure).to_string();

        assert!(lookup.starts_with("Unable to fetch data for the given coin"));
        assert_eq!(history, "Unable to fetch historical data for the given coin.");
    }

    #[test]
    fn too_few_candles_names_the_series() {
        let err = UsageError::TooFewCandles {
            label: "DOGE".to_string(),
            len: 1,
        };
        assert!(err.to_string().contains("DOGE"));
    }
}
