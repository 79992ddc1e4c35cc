use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{ProviderConfig, ResolvedIdentifier};
use crate::services::resolver::venue_candidates;

/// What the dividend calendar provider knows about one security
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub ex_date: NaiveDate,
    pub rate: f64,
    pub current_price: f64,
}

/// One security with an ex-dividend date inside the alert window
#[derive(Debug, Clone, Serialize)]
pub struct DividendAlert {
    pub code: String,
    pub ex_date: NaiveDate,
    pub rate: f64,
    pub current_price: f64,
}

/// Per-security dividend calendar lookup. The live implementation is
/// `DividendClient`; tests drive the venue fallback through a fake calendar.
#[allow(async_fn_in_trait)]
pub trait DividendCalendar {
    async fn lookup(&self, symbol: &str) -> Result<Option<CalendarEntry>>;
}

/// Thin client for the per-security dividend calendar lookup. Shares the
/// venue suffix convention (and fallback order) with the price side.
pub struct DividendClient {
    http: Client,
    base_url: String,
}

impl DividendClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Calendar record for one venue-qualified symbol; `None` when the
    /// provider has nothing for it
    pub async fn lookup(&self, symbol: &str) -> Result<Option<CalendarEntry>> {
        let url = format!("{}dividend/calendar", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Calendar lookup failed ({})",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        Ok(parse_calendar_entry(&body))
    }
}

impl DividendCalendar for DividendClient {
    async fn lookup(&self, symbol: &str) -> Result<Option<CalendarEntry>> {
        DividendClient::lookup(self, symbol).await
    }
}

/// Parse a provider calendar record; a record without an ex-dividend date is
/// treated as "no upcoming dividend", not an error
pub(crate) fn parse_calendar_entry(body: &Value) -> Option<CalendarEntry> {
    let ex_date = body
        .get("exDate")
        .and_then(|d| d.as_str())
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;

    Some(CalendarEntry {
        ex_date,
        rate: body.get("rate").and_then(|r| r.as_f64()).unwrap_or(0.0),
        current_price: body
            .get("currentPrice")
            .and_then(|p| p.as_f64())
            .unwrap_or(0.0),
    })
}

/// A security qualifies when its ex-dividend date is no older than
/// `as_of - lookback_days` (future dates always qualify)
pub(crate) fn in_window(ex_date: NaiveDate, as_of: NaiveDate, lookback_days: i64) -> bool {
    ex_date >= as_of - Duration::days(lookback_days)
}

/// Scan codes for upcoming (or just-passed) ex-dividend dates.
///
/// Venue fallback mirrors the price side: the first venue whose lookup
/// returns a record wins. A failed lookup only drops that one code.
pub async fn detect_upcoming<C: DividendCalendar>(
    client: &C,
    config: &ProviderConfig,
    codes: &[String],
    as_of: NaiveDate,
    lookback_days: i64,
) -> Vec<DividendAlert> {
    let mut alerts = Vec::new();

    for code in codes {
        let mut entry: Option<CalendarEntry> = None;

        for venue in venue_candidates(code) {
            let symbol = ResolvedIdentifier::new(code.clone(), venue).qualified_symbol(config);
            match client.lookup(&symbol).await {
                Ok(Some(found)) => {
                    entry = Some(found);
                    break;
                }
                Ok(None) => {
                    debug!(code = %code, symbol = %symbol, "No calendar record on this venue");
                }
                Err(e) => {
                    warn!(code = %code, symbol = %symbol, error = %e, "Calendar lookup failed");
                }
            }
        }

        if let Some(entry) = entry {
            if in_window(entry.ex_date, as_of, lookback_days) {
                alerts.push(DividendAlert {
                    code: code.clone(),
                    ex_date: entry.ex_date,
                    rate: entry.rate,
                    current_price: entry.current_price,
                });
            }
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{HashMap, HashSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Canned calendar: entries per qualified symbol, plus symbols whose
    /// lookup errors outright
    struct FakeCalendar {
        entries: HashMap<String, CalendarEntry>,
        failing: HashSet<String>,
    }

    impl DividendCalendar for FakeCalendar {
        async fn lookup(&self, symbol: &str) -> Result<Option<CalendarEntry>> {
            if self.failing.contains(symbol) {
                return Err(AppError::Network("calendar unreachable".to_string()));
            }
            Ok(self.entries.get(symbol).cloned())
        }
    }

    fn entry(ex_date: NaiveDate) -> CalendarEntry {
        CalendarEntry {
            ex_date,
            rate: 2.5,
            current_price: 100.0,
        }
    }

    #[tokio::test]
    async fn test_detect_falls_back_to_the_second_venue() {
        // Primary has no record for 2330, OTC does
        let mut entries = HashMap::new();
        entries.insert("2330.TWO".to_string(), entry(date(2025, 9, 1)));
        let calendar = FakeCalendar {
            entries,
            failing: HashSet::new(),
        };
        let config = ProviderConfig::default();

        let alerts = detect_upcoming(
            &calendar,
            &config,
            &["2330".to_string()],
            date(2025, 8, 30),
            5,
        )
        .await;

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "2330");
        assert_eq!(alerts[0].ex_date, date(2025, 9, 1));
    }

    #[tokio::test]
    async fn test_failing_lookup_drops_only_that_code() {
        // Both venues error for 2330; 2454 still gets its alert
        let mut entries = HashMap::new();
        entries.insert("2454.TW".to_string(), entry(date(2025, 9, 2)));
        let mut failing = HashSet::new();
        failing.insert("2330.TW".to_string());
        failing.insert("2330.TWO".to_string());
        let calendar = FakeCalendar { entries, failing };
        let config = ProviderConfig::default();

        let alerts = detect_upcoming(
            &calendar,
            &config,
            &["2330".to_string(), "2454".to_string()],
            date(2025, 8, 30),
            5,
        )
        .await;

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "2454");
    }

    #[tokio::test]
    async fn test_old_ex_date_is_not_alerted() {
        let mut entries = HashMap::new();
        entries.insert("2330.TW".to_string(), entry(date(2025, 8, 1)));
        let calendar = FakeCalendar {
            entries,
            failing: HashSet::new(),
        };
        let config = ProviderConfig::default();

        let alerts = detect_upcoming(
            &calendar,
            &config,
            &["2330".to_string()],
            date(2025, 8, 30),
            5,
        )
        .await;

        assert!(alerts.is_empty());
    }

    #[test]
    fn test_in_window() {
        let as_of = date(2025, 8, 30);

        // Future ex-date qualifies
        assert!(in_window(date(2025, 9, 10), as_of, 5));
        // Exactly at the window edge qualifies
        assert!(in_window(date(2025, 8, 25), as_of, 5));
        // Older than the window does not
        assert!(!in_window(date(2025, 8, 24), as_of, 5));
    }

    #[test]
    fn test_parse_calendar_entry() {
        let body = json!({
            "exDate": "2025-09-01",
            "rate": 2.5,
            "currentPrice": 101.5,
        });

        let entry = parse_calendar_entry(&body).unwrap();
        assert_eq!(entry.ex_date, date(2025, 9, 1));
        assert_eq!(entry.rate, 2.5);
        assert_eq!(entry.current_price, 101.5);
    }

    #[test]
    fn test_parse_calendar_entry_without_ex_date() {
        assert_eq!(parse_calendar_entry(&json!({ "rate": 2.5 })), None);
        assert_eq!(parse_calendar_entry(&json!({ "exDate": "not-a-date" })), None);
    }

    #[test]
    fn test_parse_calendar_entry_defaults_missing_fields() {
        let entry = parse_calendar_entry(&json!({ "exDate": "2025-09-01" })).unwrap();
        assert_eq!(entry.rate, 0.0);
        assert_eq!(entry.current_price, 0.0);
    }
}
