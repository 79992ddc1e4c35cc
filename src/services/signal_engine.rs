use tracing::debug;

use crate::constants::{
    BREAKOUT_PCT, KEY_LINE_WINDOW, MA_BIAS_PERIOD, MIN_POINTS_FOR_SIGNAL, NEAR_SUPPORT_BIAS_PCT,
    OVERHEATED_BIAS_PCT,
};
use crate::models::indicators::{calculate_ma, calculate_ma_bias};
use crate::models::{Metric, PricePoint, Signal, SignalStatus};

/// Compute the trading signal for one price history.
///
/// Deterministic: the same history always produces the same signal, no matter
/// which venue served it. A history shorter than 20 points is `Insufficient`;
/// any ratio that cannot be computed becomes `Unavailable`, never a fault.
pub fn compute_signal(history: &[PricePoint]) -> Signal {
    if history.len() < MIN_POINTS_FOR_SIGNAL {
        debug!(points = history.len(), "History too short for a signal");
        return Signal::insufficient();
    }

    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let current_price = closes[closes.len() - 1];

    let ma_bias = Metric::from_option(
        calculate_ma(&closes, MA_BIAS_PERIOD)
            .and_then(|ma| calculate_ma_bias(current_price, ma)),
    );

    let key_line = Metric::from_option(derive_key_line(history));

    let status = classify(current_price, &ma_bias, &key_line);

    Signal {
        key_line,
        ma_bias,
        status,
    }
}

/// Key line: low of the chronologically last breakout candle in the recent
/// window (close over open by at least 4%); when no candle qualifies, the
/// window's close average serves as the support read instead.
fn derive_key_line(history: &[PricePoint]) -> Option<f64> {
    let window = &history[history.len().saturating_sub(KEY_LINE_WINDOW)..];

    let last_breakout = window
        .iter()
        .rev()
        .find(|p| p.pct_move().is_some_and(|m| m >= BREAKOUT_PCT));

    match last_breakout {
        Some(candle) => Some(candle.low),
        None => {
            let closes: Vec<f64> = window.iter().map(|p| p.close).collect();
            calculate_ma(&closes, window.len())
        }
    }
}

/// Fixed priority order; first match wins. Overheating is checked before the
/// support break on purpose: profit-taking outranks support/resistance reads.
fn classify(current_price: f64, ma_bias: &Metric<f64>, key_line: &Metric<f64>) -> SignalStatus {
    if let Metric::Present(bias) = ma_bias {
        if *bias >= OVERHEATED_BIAS_PCT {
            return SignalStatus::Overheated;
        }
    }

    if let Metric::Present(line) = key_line {
        if current_price < *line {
            return SignalStatus::BrokenSupport;
        }
    }

    if let Metric::Present(bias) = ma_bias {
        if *bias <= NEAR_SUPPORT_BIAS_PCT {
            return SignalStatus::NearSupport;
        }
    }

    SignalStatus::Trending
}
