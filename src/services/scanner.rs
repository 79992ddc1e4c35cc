use serde::Serialize;
use tracing::debug;

use crate::constants::{
    DEFAULT_LOOKBACK_DAYS, SCAN_CHANGE_PCT_MIN, SCAN_MA_BIAS_MAX, SCAN_MA_PERIOD,
    SCAN_TRAILING_VOLUME_DAYS, SCAN_VOLUME_RATIO_MIN,
};
use crate::models::indicators::{
    calculate_change_pct, calculate_ma, calculate_ma_bias, calculate_volume_ratio,
};
use crate::models::{Metric, PricePoint};
use crate::services::price_service::{HistorySource, PriceService};
use crate::services::signal_engine::compute_signal;

/// One watchlist entry that passed the momentum screen
#[derive(Debug, Clone, Serialize)]
pub struct MomentumCandidate {
    pub code: String,
    /// Close-over-close day change, percent
    pub change_pct: f64,
    /// Today's volume over the trailing mean
    pub volume_ratio: f64,
    /// Bias against the 20-day moving average
    pub ma_bias: f64,
    /// The signal engine's key line for this history, when derivable
    pub support_level: Metric<f64>,
}

/// Screen a watchlist for volume-backed breakouts that are not yet
/// overextended. Entries with too little history, a fetch failure, or a
/// division guard are silently excluded - a bad entry never errors the scan.
/// Output is sorted by volume ratio, highest conviction first.
pub async fn scan<S: HistorySource>(
    prices: &mut PriceService<S>,
    codes: &[String],
) -> Vec<MomentumCandidate> {
    let histories = prices.fetch_batch(codes, DEFAULT_LOOKBACK_DAYS).await;

    let mut candidates: Vec<MomentumCandidate> = codes
        .iter()
        .filter_map(|code| {
            let history = histories.get(code)?;
            evaluate(code, history)
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.volume_ratio
            .partial_cmp(&a.volume_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

/// Apply the momentum rules to one history. All three thresholds must hold.
fn evaluate(code: &str, history: &[PricePoint]) -> Option<MomentumCandidate> {
    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let volumes: Vec<u64> = history.iter().map(|p| p.volume).collect();

    let change_pct = calculate_change_pct(&closes)?;
    let volume_ratio = calculate_volume_ratio(&volumes, SCAN_TRAILING_VOLUME_DAYS)?;
    let ma_bias = calculate_ma(&closes, SCAN_MA_PERIOD)
        .and_then(|ma| calculate_ma_bias(closes[closes.len() - 1], ma))?;

    if volume_ratio <= SCAN_VOLUME_RATIO_MIN
        || change_pct <= SCAN_CHANGE_PCT_MIN
        || ma_bias >= SCAN_MA_BIAS_MAX
    {
        debug!(
            code,
            change_pct, volume_ratio, ma_bias, "Watchlist entry below momentum thresholds"
        );
        return None;
    }

    Some(MomentumCandidate {
        code: code.to_string(),
        change_pct,
        volume_ratio,
        ma_bias,
        support_level: compute_signal(history).key_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Build a history whose last day has the given change and volume spike,
    /// on top of a flat 100.0 base with steady volume
    fn history_with_last_day(len: usize, last_change_pct: f64, last_volume: u64) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut points: Vec<PricePoint> = (0..len - 1)
            .map(|i| {
                let time = start + Duration::days(i as i64);
                PricePoint::new(time, 100.0, 101.0, 99.0, 100.0, 10_000)
            })
            .collect();

        let close = 100.0 * (1.0 + last_change_pct / 100.0);
        let time = start + Duration::days(len as i64 - 1);
        points.push(PricePoint::new(time, 100.0, close + 1.0, 99.0, close, last_volume));
        points
    }

    #[test]
    fn test_evaluate_includes_qualifying_entry() {
        // change = 4%, volume ratio = 2.5, bias ≈ 4/20 of a percent over flat base
        let history = history_with_last_day(30, 4.0, 25_000);
        let candidate = evaluate("6547", &history).expect("entry should qualify");

        assert!((candidate.change_pct - 4.0).abs() < 1e-9);
        assert!((candidate.volume_ratio - 2.5).abs() < 1e-9);
        assert!(candidate.ma_bias < SCAN_MA_BIAS_MAX);
    }

    #[test]
    fn test_evaluate_excludes_low_change() {
        let history = history_with_last_day(30, 2.0, 25_000);
        assert!(evaluate("6547", &history).is_none());
    }

    #[test]
    fn test_evaluate_excludes_low_volume_ratio() {
        let history = history_with_last_day(30, 4.0, 15_000); // ratio 1.5
        assert!(evaluate("6547", &history).is_none());
    }

    #[test]
    fn test_evaluate_excludes_overextended() {
        // Last close 30% above a flat base: change and volume qualify but
        // the 20-day bias is way past the cap
        let history = history_with_last_day(30, 30.0, 25_000);
        assert!(evaluate("6547", &history).is_none());
    }

    #[test]
    fn test_evaluate_excludes_insufficient_history() {
        let history = history_with_last_day(2, 4.0, 25_000);
        // change and volume are computable from 2 points, but not the 20-day MA
        assert!(evaluate("6547", &history).is_none());

        assert!(evaluate("6547", &[]).is_none());
    }

    #[test]
    fn test_candidates_sort_by_volume_ratio_descending() {
        let a = history_with_last_day(30, 4.0, 25_000); // ratio 2.5
        let b = history_with_last_day(30, 4.0, 40_000); // ratio 4.0

        let mut candidates = vec![
            evaluate("AAA", &a).unwrap(),
            evaluate("BBB", &b).unwrap(),
        ];
        candidates.sort_by(|x, y| {
            y.volume_ratio
                .partial_cmp(&x.volume_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        assert_eq!(candidates[0].code, "BBB");
    }
}
