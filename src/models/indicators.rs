//! Pure indicator math shared by the signal engine and the momentum scanner.
//!
//! Every ratio here returns `Option<f64>`: a denominator that is zero or a
//! window that cannot be filled yields `None` instead of a fake zero, and the
//! caller decides how to surface it. These functions never panic.

/// Mean close of the most recent `period` values, if that many exist
pub fn calculate_ma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// MA bias: ((close - ma) / ma) * 100
///
/// Percentage deviation of a close from its moving average. `None` when the
/// average is zero (division guard).
pub fn calculate_ma_bias(close: f64, ma: f64) -> Option<f64> {
    if ma == 0.0 {
        None
    } else {
        Some((close - ma) / ma * 100.0)
    }
}

/// Close-over-close day change percentage from the last two closes
pub fn calculate_change_pct(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let prev = closes[closes.len() - 2];
    let last = closes[closes.len() - 1];
    if prev == 0.0 {
        None
    } else {
        Some((last - prev) / prev * 100.0)
    }
}

/// Today's volume divided by the mean of the trailing window.
///
/// The trailing window is up to `trailing_days` points strictly before the
/// last one; at least one trailing point is required, and a zero mean yields
/// `None` rather than an infinite ratio.
pub fn calculate_volume_ratio(volumes: &[u64], trailing_days: usize) -> Option<f64> {
    if volumes.len() < 2 || trailing_days == 0 {
        return None;
    }
    let today = volumes[volumes.len() - 1] as f64;
    let trailing_start = volumes.len().saturating_sub(trailing_days + 1);
    let trailing = &volumes[trailing_start..volumes.len() - 1];
    let mean = trailing.iter().map(|&v| v as f64).sum::<f64>() / trailing.len() as f64;
    if mean == 0.0 {
        None
    } else {
        Some(today / mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_ma() {
        let closes = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        assert_eq!(calculate_ma(&closes, 3), Some(14.0)); // (13+14+15)/3
        assert_eq!(calculate_ma(&closes, 6), Some(12.5));
        assert_eq!(calculate_ma(&closes, 7), None); // not enough data
        assert_eq!(calculate_ma(&closes, 0), None);
    }

    #[test]
    fn test_calculate_ma_bias() {
        let bias = calculate_ma_bias(110.0, 100.0).unwrap();
        assert!((bias - 10.0).abs() < 0.01);

        let bias = calculate_ma_bias(90.0, 100.0).unwrap();
        assert!((bias + 10.0).abs() < 0.01);

        assert_eq!(calculate_ma_bias(110.0, 0.0), None);
    }

    #[test]
    fn test_calculate_change_pct() {
        let closes = vec![100.0, 104.0];
        assert!((calculate_change_pct(&closes).unwrap() - 4.0).abs() < 1e-9);

        assert_eq!(calculate_change_pct(&[100.0]), None);
        assert_eq!(calculate_change_pct(&[0.0, 104.0]), None);
    }

    #[test]
    fn test_calculate_volume_ratio() {
        // Trailing mean of [100, 100, 100, 100, 100] = 100, today = 250
        let volumes = vec![100, 100, 100, 100, 100, 250];
        assert!((calculate_volume_ratio(&volumes, 5).unwrap() - 2.5).abs() < 1e-9);

        // Shorter history: trailing window is whatever precedes today
        let volumes = vec![100, 300];
        assert!((calculate_volume_ratio(&volumes, 5).unwrap() - 3.0).abs() < 1e-9);

        assert_eq!(calculate_volume_ratio(&[100], 5), None);
        assert_eq!(calculate_volume_ratio(&[0, 0, 100], 5), None); // zero mean
    }

    #[test]
    fn test_volume_ratio_is_deterministic() {
        let volumes = vec![123, 456, 789, 1011, 1213, 3000];
        let first = calculate_volume_ratio(&volumes, 5).unwrap();
        let second = calculate_volume_ratio(&volumes, 5).unwrap();
        // Bit-for-bit stable on unchanged input
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
