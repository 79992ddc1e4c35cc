use serde::Serialize;

use super::Metric;

/// Signal classification for one security, evaluated in fixed priority order
/// (overheating outranks a support break by design - profit-taking first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalStatus {
    /// MA bias in the take-profit zone
    Overheated,
    /// Price closed below the key line
    BrokenSupport,
    /// MA bias close to zero, price near its short average
    NearSupport,
    /// None of the above - trend intact
    Trending,
    /// Not enough history to say anything
    Insufficient,
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalStatus::Overheated => write!(f, "overheated"),
            SignalStatus::BrokenSupport => write!(f, "broken-support"),
            SignalStatus::NearSupport => write!(f, "near-support"),
            SignalStatus::Trending => write!(f, "trending"),
            SignalStatus::Insufficient => write!(f, "insufficient"),
        }
    }
}

/// Derived signal for one price history
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    /// Support level: low of the most recent breakout candle, or the
    /// 20-point close average when no breakout exists in the window
    pub key_line: Metric<f64>,

    /// Percentage deviation of the latest close from the short moving average
    pub ma_bias: Metric<f64>,

    pub status: SignalStatus,
}

impl Signal {
    /// Signal for a history too short to analyze
    pub fn insufficient() -> Self {
        Self {
            key_line: Metric::Unavailable,
            ma_bias: Metric::Unavailable,
            status: SignalStatus::Insufficient,
        }
    }
}
