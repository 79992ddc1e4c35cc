pub mod dividend;
pub mod price_service;
pub mod quote_client;
pub mod resolver;
pub mod scanner;
pub mod signal_engine;
pub mod valuator;

pub use dividend::{detect_upcoming, DividendAlert, DividendCalendar, DividendClient};
pub use price_service::{HistorySource, PriceService};
pub use quote_client::QuoteClient;
pub use resolver::venue_candidates;
pub use scanner::{scan, MomentumCandidate};
pub use signal_engine::compute_signal;
pub use valuator::{valuate, PortfolioValuation, ValuationRow};
