pub mod candle;
pub mod fetch;
pub mod pair;

pub use candle::{Candle, CandleSeries};
pub use fetch::{DexClient, RetryPolicy, DEFAULT_BASE_URL};
pub use pair::{ChartResponse, Identifier, PairInfo, PairsResponse, TokenInfo};
