use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{PriceHistory, PriceMap, ProviderConfig, ResolvedIdentifier};
use crate::services::quote_client::QuoteClient;
use crate::services::resolver::venue_candidates;

/// Source of daily price histories, keyed by venue-qualified symbol.
///
/// The live implementation is `QuoteClient`; tests drive the venue-fallback
/// loop through a fake source instead of the network.
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn fetch_histories(
        &mut self,
        symbols: &[String],
        lookback_days: u32,
    ) -> Result<HashMap<String, PriceHistory>>;
}

type CacheKey = (String, u32);

struct CacheEntry {
    history: PriceHistory,
    expires_at: Instant,
}

/// Price acquisition with venue fallback and a TTL cache.
///
/// For every code the resolver's venue candidates are tried in order; a venue
/// answering with an empty (or all-missing-close) series falls through to the
/// next, and a code no venue can serve maps to an empty history. Nothing in a
/// batch is ever fatal to the rest of the batch. Each round is one batched
/// provider call, so the whole fallback costs at most two round trips.
pub struct PriceService<S: HistorySource = QuoteClient> {
    source: S,
    config: ProviderConfig,
    cache: HashMap<CacheKey, CacheEntry>,
}

impl PriceService<QuoteClient> {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = QuoteClient::new(&config)?;
        Ok(Self::with_source(client, config))
    }
}

impl<S: HistorySource> PriceService<S> {
    /// Build a service around any history source (tests inject fakes here)
    pub fn with_source(source: S, config: ProviderConfig) -> Self {
        Self {
            source,
            config,
            cache: HashMap::new(),
        }
    }

    /// Fetch daily histories for a batch of bare codes.
    ///
    /// Every requested code is present in the result; codes with no data on
    /// any venue map to an empty history so the caller can flag them.
    pub async fn fetch_batch(&mut self, codes: &[String], lookback_days: u32) -> PriceMap {
        let mut result: PriceMap = HashMap::new();
        let mut pending: Vec<String> = Vec::new();

        // Dedupe while preserving caller order
        for code in codes {
            if !pending.contains(code) && !result.contains_key(code) {
                pending.push(code.clone());
            }
        }

        for round in 0..2 {
            if pending.is_empty() {
                break;
            }

            // Map each still-pending code to this round's venue candidate
            let mut symbol_for_code: HashMap<String, String> = HashMap::new();
            let mut to_fetch: Vec<String> = Vec::new();

            for code in &pending {
                let venue = venue_candidates(code)[round];
                let symbol =
                    ResolvedIdentifier::new(code.clone(), venue).qualified_symbol(&self.config);

                if self.cache_get(&symbol, lookback_days).is_some() {
                    debug!(code = %code, symbol = %symbol, "Cache hit");
                } else {
                    to_fetch.push(symbol.clone());
                }
                symbol_for_code.insert(code.clone(), symbol);
            }

            if !to_fetch.is_empty() {
                match self.source.fetch_histories(&to_fetch, lookback_days).await {
                    Ok(histories) => {
                        for symbol in &to_fetch {
                            let history = histories.get(symbol).cloned().unwrap_or_default();
                            self.cache_put(symbol.clone(), lookback_days, history);
                        }
                    }
                    Err(e) => {
                        // The whole round failed; every symbol in it counts as
                        // "no data for this venue" and falls through
                        warn!(round, error = %e, "Batch fetch failed, falling through");
                    }
                }
            }

            let mut still_pending = Vec::new();
            for code in pending {
                let symbol = &symbol_for_code[&code];
                match self.cache_get(symbol, lookback_days) {
                    Some(history) if !history.is_empty() => {
                        if round > 0 {
                            info!(code = %code, symbol = %symbol, "Resolved on fallback venue");
                        }
                        result.insert(code, history);
                    }
                    _ => still_pending.push(code),
                }
            }
            pending = still_pending;
        }

        for code in pending {
            warn!(code = %code, "No data on any venue");
            result.insert(code, Vec::new());
        }

        result
    }

    /// Latest close per code. Codes without data are absent from the map;
    /// the valuator shows those at price zero rather than dropping them.
    pub async fn latest_prices(
        &mut self,
        codes: &[String],
        lookback_days: u32,
    ) -> HashMap<String, f64> {
        let histories = self.fetch_batch(codes, lookback_days).await;
        histories
            .into_iter()
            .filter_map(|(code, history)| history.last().map(|p| (code, p.close)))
            .collect()
    }

    fn cache_get(&self, symbol: &str, lookback_days: u32) -> Option<PriceHistory> {
        let key = (symbol.to_string(), lookback_days);
        self.cache
            .get(&key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.history.clone())
    }

    fn cache_put(&mut self, symbol: String, lookback_days: u32, history: PriceHistory) {
        let expires_at = Instant::now() + Duration::from_secs(self.config.cache_ttl_secs);
        self.cache.insert(
            (symbol, lookback_days),
            CacheEntry {
                history,
                expires_at,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::error::AppError;
    use crate::models::PricePoint;

    fn point(day: u32, close: f64) -> PricePoint {
        let time = Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap();
        PricePoint::new(time, close, close, close, close, 1000)
    }

    /// Canned per-symbol responses plus an optional run of failing calls,
    /// recording every batch it was asked for
    struct FakeSource {
        responses: HashMap<String, PriceHistory>,
        failing_calls: usize,
        calls: Vec<Vec<String>>,
    }

    impl FakeSource {
        fn new(responses: HashMap<String, PriceHistory>) -> Self {
            Self {
                responses,
                failing_calls: 0,
                calls: Vec::new(),
            }
        }
    }

    impl HistorySource for FakeSource {
        async fn fetch_histories(
            &mut self,
            symbols: &[String],
            _lookback_days: u32,
        ) -> crate::error::Result<HashMap<String, PriceHistory>> {
            self.calls.push(symbols.to_vec());
            if self.failing_calls > 0 {
                self.failing_calls -= 1;
                return Err(AppError::Network("provider unreachable".to_string()));
            }
            Ok(symbols
                .iter()
                .filter_map(|s| self.responses.get(s).map(|h| (s.clone(), h.clone())))
                .collect())
        }
    }

    fn fake_service(source: FakeSource) -> PriceService<FakeSource> {
        PriceService::with_source(source, ProviderConfig::default())
    }

    fn service() -> PriceService<FakeSource> {
        fake_service(FakeSource::new(HashMap::new()))
    }

    #[tokio::test]
    async fn test_first_venue_hit_skips_the_fallback() {
        let mut responses = HashMap::new();
        responses.insert("2330.TW".to_string(), vec![point(2, 510.0)]);
        let mut service = fake_service(FakeSource::new(responses));

        let result = service.fetch_batch(&["2330".to_string()], 120).await;

        assert_eq!(result["2330"].len(), 1);
        assert_eq!(result["2330"][0].close, 510.0);
        // One round trip, primary venue only
        assert_eq!(service.source.calls, vec![vec!["2330.TW".to_string()]]);
    }

    #[tokio::test]
    async fn test_empty_primary_series_falls_through_to_otc() {
        // Primary answers with an empty series, OTC has the data
        let mut responses = HashMap::new();
        responses.insert("2330.TW".to_string(), Vec::new());
        responses.insert("2330.TWO".to_string(), vec![point(2, 88.0)]);
        let mut service = fake_service(FakeSource::new(responses));

        let result = service.fetch_batch(&["2330".to_string()], 120).await;

        assert_eq!(result["2330"][0].close, 88.0);
        assert_eq!(
            service.source.calls,
            vec![vec!["2330.TW".to_string()], vec!["2330.TWO".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_code_empty_on_both_venues_maps_to_empty_history() {
        let mut service = service();

        let result = service
            .fetch_batch(&["2330".to_string(), "2454".to_string()], 120)
            .await;

        // Every requested code is present, mapped to empty, and no error
        assert_eq!(result.len(), 2);
        assert!(result["2330"].is_empty());
        assert!(result["2454"].is_empty());
    }

    #[tokio::test]
    async fn test_round_level_fetch_error_falls_through() {
        // The whole first round fails; the fallback venue still resolves
        let mut responses = HashMap::new();
        responses.insert("2330.TWO".to_string(), vec![point(3, 91.5)]);
        let mut source = FakeSource::new(responses);
        source.failing_calls = 1;
        let mut service = fake_service(source);

        let result = service.fetch_batch(&["2330".to_string()], 120).await;

        assert_eq!(result["2330"][0].close, 91.5);
        assert_eq!(service.source.calls.len(), 2);
    }

    #[tokio::test]
    async fn test_one_failing_code_does_not_poison_the_batch() {
        // 2330 resolves on primary, 9988 has nothing anywhere
        let mut responses = HashMap::new();
        responses.insert("2330.TW".to_string(), vec![point(2, 510.0)]);
        let mut service = fake_service(FakeSource::new(responses));

        let result = service
            .fetch_batch(&["2330".to_string(), "9988".to_string()], 120)
            .await;

        assert_eq!(result["2330"][0].close, 510.0);
        assert!(result["9988"].is_empty());
    }

    #[tokio::test]
    async fn test_cached_history_skips_the_source() {
        let mut responses = HashMap::new();
        responses.insert("2330.TW".to_string(), vec![point(2, 510.0)]);
        let mut service = fake_service(FakeSource::new(responses));

        service.fetch_batch(&["2330".to_string()], 120).await;
        service.fetch_batch(&["2330".to_string()], 120).await;

        // The second batch is served from the cache
        assert_eq!(service.source.calls.len(), 1);
    }

    #[test]
    fn test_cache_round_trip_is_keyed_by_symbol_and_lookback() {
        let mut service = service();
        service.cache_put("2330.TW".to_string(), 120, vec![point(2, 510.0)]);

        let hit = service.cache_get("2330.TW", 120).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].close, 510.0);

        // Different lookback is a different entry
        assert!(service.cache_get("2330.TW", 60).is_none());
        assert!(service.cache_get("2330.TWO", 120).is_none());
    }

    #[test]
    fn test_cache_expiry() {
        let mut config = ProviderConfig::default();
        config.cache_ttl_secs = 0;
        let mut service = PriceService::with_source(FakeSource::new(HashMap::new()), config);

        service.cache_put("2330.TW".to_string(), 120, vec![point(2, 510.0)]);
        assert!(service.cache_get("2330.TW", 120).is_none());
    }

    #[test]
    fn test_cached_empty_history_is_a_hit() {
        // An empty history is a legitimate cached answer ("venue had no
        // data"), distinct from a cache miss
        let mut service = service();
        service.cache_put("9999.TW".to_string(), 120, Vec::new());
        assert!(service.cache_get("9999.TW", 120).unwrap().is_empty());
    }
}
