//! Signal thresholds and provider defaults
//!
//! All percentage thresholds are plain percentages (4.0 means 4%), matching
//! the values the dashboard has always used. Venue suffixes are only the
//! *defaults* here; the live values come from `ProviderConfig` and can be
//! overridden through the environment (§ `models::provider_config`).

/// Minimum number of points a history needs before a signal is computed
pub const MIN_POINTS_FOR_SIGNAL: usize = 20;

/// Window (in points) scanned for breakout candles when deriving the key line
pub const KEY_LINE_WINDOW: usize = 20;

/// A candle qualifies as a breakout when close exceeds open by this percentage
pub const BREAKOUT_PCT: f64 = 4.0;

/// Period of the short moving average the bias is measured against
pub const MA_BIAS_PERIOD: usize = 10;

/// MA bias at or above this marks the take-profit zone
pub const OVERHEATED_BIAS_PCT: f64 = 15.0;

/// MA bias at or below this marks the near-support zone
pub const NEAR_SUPPORT_BIAS_PCT: f64 = 3.0;

/// Momentum scan: minimum volume ratio (today / trailing mean)
pub const SCAN_VOLUME_RATIO_MIN: f64 = 2.0;

/// Momentum scan: minimum close-over-close day change percentage
pub const SCAN_CHANGE_PCT_MIN: f64 = 3.0;

/// Momentum scan: maximum MA bias (entries above this are overextended)
pub const SCAN_MA_BIAS_MAX: f64 = 12.0;

/// Momentum scan: trailing days averaged for the volume ratio denominator
pub const SCAN_TRAILING_VOLUME_DAYS: usize = 5;

/// Momentum scan: period of the moving average its bias is measured against
pub const SCAN_MA_PERIOD: usize = 20;

/// Codes of at most this length made of decimal digits resolve Primary-first
pub const PRIMARY_CODE_MAX_DIGITS: usize = 4;

/// Default lookback window (trading days) for signal and scan histories
pub const DEFAULT_LOOKBACK_DAYS: u32 = 120;

/// Lookback used when only the latest close is needed (valuation, dividends)
pub const LATEST_PRICE_LOOKBACK_DAYS: u32 = 10;

/// Default ex-dividend alert window (days before "as of")
pub const DEFAULT_DIVIDEND_LOOKBACK_DAYS: i64 = 5;

/// Default provider rate limit (requests per minute)
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Default per-request timeout in seconds; a timeout is treated as no data
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default TTL for cached price histories, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default venue suffixes (Taiwan primary exchange / OTC convention)
pub const DEFAULT_PRIMARY_SUFFIX: &str = ".TW";
pub const DEFAULT_OTC_SUFFIX: &str = ".TWO";
