use serde::Serialize;

/// Tri-state result for a derived metric.
///
/// Replaces the old silent default-to-zero: a caller can tell a value that is
/// genuinely zero apart from one that could not be computed. `Unavailable`
/// covers the recoverable cases (insufficient history, division guard, no
/// data for any venue); `Error` carries a reason when a provider failed in a
/// way worth showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value")]
pub enum Metric<T> {
    Present(T),
    Unavailable,
    Error(String),
}

impl<T> Metric<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Metric::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Metric::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Build from an `Option`, mapping `None` to `Unavailable`
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Present(v),
            None => Metric::Unavailable,
        }
    }
}

impl<T: Copy> Metric<T> {
    pub fn value_or(&self, fallback: T) -> T {
        match self {
            Metric::Present(v) => *v,
            _ => fallback,
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Present(v) => write!(f, "{}", v),
            Metric::Unavailable => write!(f, "n/a"),
            Metric::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}
