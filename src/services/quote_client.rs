use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{PriceHistory, PricePoint, ProviderConfig};
use crate::services::price_service::HistorySource;

const MAX_RETRIES: u32 = 3;

/// HTTP client for the quote provider's batch history endpoint.
///
/// The provider takes venue-qualified symbols and answers with a nested
/// columnar shape: one object per symbol, each holding parallel o/h/l/c/v/t
/// arrays. Flattening to `PricePoint` rows happens here, once, before anything
/// downstream reads a close. Requests go through a sliding-window rate
/// limiter so a large watchlist cannot blow the provider's budget.
pub struct QuoteClient {
    http: Client,
    base_url: String,
    rate_limit_per_minute: u32,
    request_timestamps: Vec<Instant>,
}

impl QuoteClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            rate_limit_per_minute: config.rate_limit_per_minute,
            request_timestamps: Vec::new(),
        })
    }

    /// Sliding-window rate limiting: at most `rate_limit_per_minute` requests
    /// in any 60s window, sleeping until the oldest request expires
    async fn enforce_rate_limit(&mut self) {
        let now = Instant::now();
        self.request_timestamps
            .retain(|&t| now.duration_since(t) < Duration::from_secs(60));

        if self.request_timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest) = self.request_timestamps.first() {
                let wait = Duration::from_secs(60).saturating_sub(now.duration_since(oldest));
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
                    sleep(wait + Duration::from_millis(100)).await;
                }
            }
        }

        self.request_timestamps.push(Instant::now());
    }

    async fn make_request(&mut self, url: &str, payload: &Value) -> Result<Value> {
        let mut last_error = AppError::Network("no attempt made".to_string());

        for attempt in 0..MAX_RETRIES {
            self.enforce_rate_limit().await;

            if attempt > 0 {
                let delay = Duration::from_secs_f64(
                    2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>(),
                );
                debug!(
                    attempt = attempt + 1,
                    max = MAX_RETRIES,
                    wait_secs = delay.as_secs_f64(),
                    reason = %last_error,
                    "Retrying provider request after backoff"
                );
                sleep(delay).await;
            }

            let response = match self.http.post(url).json(payload).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = AppError::Network(e.to_string());
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                match response.json::<Value>().await {
                    Ok(data) => return Ok(data),
                    Err(e) => {
                        last_error = AppError::Parse(format!("Bad JSON from provider: {}", e));
                        continue;
                    }
                }
            } else if status.as_u16() == 429 {
                last_error = AppError::RateLimit;
                continue;
            } else if status.is_server_error() {
                last_error = AppError::Network(format!("Server error ({})", status.as_u16()));
                continue;
            } else {
                // Other client errors are request problems, not worth retrying
                return Err(AppError::Network(format!(
                    "Client error ({}) - not retryable",
                    status.as_u16()
                )));
            }
        }

        Err(last_error)
    }

    /// Fetch daily histories for a batch of venue-qualified symbols in one
    /// round trip. Returns qualified symbol -> history; a symbol the provider
    /// omitted is simply absent, and a symbol whose series failed to flatten
    /// maps to an empty history.
    pub async fn fetch_histories(
        &mut self,
        symbols: &[String],
        lookback_days: u32,
    ) -> Result<HashMap<String, PriceHistory>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}chart/history", self.base_url);
        let payload = serde_json::json!({
            "timeFrame": "ONE_DAY",
            "symbols": symbols,
            "to": Utc::now().timestamp(),
            "countBack": lookback_days,
        });

        debug!(symbols = symbols.len(), lookback_days, url = %url, "Fetching batch history");

        let response = self.make_request(&url, &payload).await?;
        let items = response
            .as_array()
            .ok_or_else(|| AppError::Parse("Expected array response from provider".to_string()))?;

        let mut histories = HashMap::new();
        for item in items {
            let symbol = match item.get("symbol").and_then(|s| s.as_str()) {
                Some(s) => s.to_string(),
                None => {
                    warn!("Provider item without symbol field, skipping");
                    continue;
                }
            };

            match flatten_series(item) {
                Ok(history) => {
                    histories.insert(symbol, history);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Failed to flatten series, treating as empty");
                    histories.insert(symbol, Vec::new());
                }
            }
        }

        Ok(histories)
    }
}

impl HistorySource for QuoteClient {
    async fn fetch_histories(
        &mut self,
        symbols: &[String],
        lookback_days: u32,
    ) -> Result<HashMap<String, PriceHistory>> {
        QuoteClient::fetch_histories(self, symbols, lookback_days).await
    }
}

/// Flatten one symbol's nested columnar series (parallel o/h/l/c/v/t arrays)
/// into chronological `PricePoint` rows.
///
/// Rows with a missing close are dropped: a series where every close is
/// missing flattens to empty, which the price service reads as "this venue
/// has no data". Output is sorted ascending by time.
pub(crate) fn flatten_series(item: &Value) -> Result<PriceHistory> {
    let column = |key: &str| -> Result<&Vec<Value>> {
        item.get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| AppError::Parse(format!("Missing column: {}", key)))
    };

    let opens = column("o")?;
    let highs = column("h")?;
    let lows = column("l")?;
    let closes = column("c")?;
    let volumes = column("v")?;
    let times = column("t")?;

    let len = [opens, highs, lows, closes, volumes, times]
        .iter()
        .map(|c| c.len())
        .min()
        .unwrap_or(0);

    let mut points = Vec::with_capacity(len);
    for i in 0..len {
        let close = match closes[i].as_f64() {
            Some(c) => c,
            None => continue, // missing close, row is unusable
        };
        let timestamp = match times[i].as_i64() {
            Some(t) => t,
            None => continue,
        };
        let time = match Utc.timestamp_opt(timestamp, 0).single() {
            Some(t) => t,
            None => continue,
        };

        points.push(PricePoint::new(
            time,
            opens[i].as_f64().unwrap_or(0.0),
            highs[i].as_f64().unwrap_or(0.0),
            lows[i].as_f64().unwrap_or(0.0),
            close,
            volumes[i].as_u64().unwrap_or(0),
        ));
    }

    points.sort_by_key(|p| p.time);
    Ok(points)
}
