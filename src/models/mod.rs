mod holding;
mod metric;
mod ohlcv;
mod provider_config;
mod signal;
mod venue;
mod watchlist;
pub mod indicators;

pub use holding::{load_holdings, Holding};
pub use metric::Metric;
pub use ohlcv::PricePoint;
pub use provider_config::ProviderConfig;
pub use signal::{Signal, SignalStatus};
pub use venue::{ResolvedIdentifier, Venue};
pub use watchlist::Watchlist;

use std::collections::HashMap;

/// Price history for a single security, strictly ascending by time.
/// May hold fewer points than the requested window; callers must tolerate that.
pub type PriceHistory = Vec<PricePoint>;

/// Batch fetch result (bare security code -> price history)
pub type PriceMap = HashMap<String, PriceHistory>;
