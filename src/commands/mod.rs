pub mod dividends;
pub mod scan;
pub mod signal;
pub mod value;

use crate::models::Metric;

/// Two-decimal rendering for user-facing metric values
pub(crate) fn format_metric(metric: &Metric<f64>) -> String {
    match metric {
        Metric::Present(v) => format!("{:.2}", v),
        Metric::Unavailable => "n/a".to_string(),
        Metric::Error(reason) => format!("error: {}", reason),
    }
}
