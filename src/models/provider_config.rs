use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_OTC_SUFFIX, DEFAULT_PRIMARY_SUFFIX,
    DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Price/dividend provider configuration.
///
/// The venue suffixes are provider-specific and must come from here, never
/// from call sites. Every field has a default and an environment override
/// (`PORTSIGNAL_*`), matching how sync options were configured before.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the quote provider API
    pub base_url: String,

    /// Symbol suffix for primary-exchange listings (e.g. ".TW")
    pub primary_suffix: String,

    /// Symbol suffix for over-the-counter listings (e.g. ".TWO")
    pub otc_suffix: String,

    /// Outbound request budget, requests per minute
    pub rate_limit_per_minute: u32,

    /// Per-request timeout in seconds; a timeout counts as "no data"
    pub timeout_secs: u64,

    /// How long a fetched history stays valid in the cache
    pub cache_ttl_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quote.example.com/api/".to_string(),
            primary_suffix: DEFAULT_PRIMARY_SUFFIX.to_string(),
            otc_suffix: DEFAULT_OTC_SUFFIX.to_string(),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by `PORTSIGNAL_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PORTSIGNAL_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = ensure_trailing_slash(url.trim().to_string());
            }
        }
        if let Ok(suffix) = std::env::var("PORTSIGNAL_PRIMARY_SUFFIX") {
            if !suffix.trim().is_empty() {
                config.primary_suffix = suffix;
            }
        }
        if let Ok(suffix) = std::env::var("PORTSIGNAL_OTC_SUFFIX") {
            if !suffix.trim().is_empty() {
                config.otc_suffix = suffix;
            }
        }
        if let Ok(limit) = std::env::var("PORTSIGNAL_RATE_LIMIT") {
            if let Ok(parsed) = limit.parse() {
                config.rate_limit_per_minute = parsed;
            }
        }
        if let Ok(timeout) = std::env::var("PORTSIGNAL_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse() {
                config.timeout_secs = parsed;
            }
        }
        if let Ok(ttl) = std::env::var("PORTSIGNAL_CACHE_TTL_SECS") {
            if let Ok(parsed) = ttl.parse() {
                config.cache_ttl_secs = parsed;
            }
        }

        config
    }
}

/// Endpoint paths are joined with plain concatenation, so the base URL must
/// end in a slash even when the override in the environment omits it
fn ensure_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
