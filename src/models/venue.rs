use serde::{Deserialize, Serialize};

use super::ProviderConfig;

/// Listing venue of a security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// Primary exchange listing
    Primary,
    /// Over-the-counter market listing
    OverTheCounter,
}

impl Venue {
    /// Provider-specific symbol suffix for this venue
    pub fn suffix<'a>(&self, config: &'a ProviderConfig) -> &'a str {
        match self {
            Venue::Primary => &config.primary_suffix,
            Venue::OverTheCounter => &config.otc_suffix,
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Venue::Primary => write!(f, "primary"),
            Venue::OverTheCounter => write!(f, "otc"),
        }
    }
}

/// A bare security code paired with the venue it is being tried on.
/// The only form the quote client accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedIdentifier {
    pub code: String,
    pub venue: Venue,
}

impl ResolvedIdentifier {
    pub fn new(code: impl Into<String>, venue: Venue) -> Self {
        Self {
            code: code.into(),
            venue,
        }
    }

    /// Venue-qualified symbol sent to the price provider (code + suffix)
    pub fn qualified_symbol(&self, config: &ProviderConfig) -> String {
        format!("{}{}", self.code, self.venue.suffix(config))
    }
}
