use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Holding, Metric};

/// One holding priced at the latest close
#[derive(Debug, Clone, Serialize)]
pub struct ValuationRow {
    pub code: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub average_cost: f64,
    /// Tri-state price so "priced at zero" and "no data" stay distinguishable
    pub price: Metric<f64>,
    /// Numeric price used in the totals (0 when the lookup came up empty)
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
}

/// Portfolio-level aggregate over all rows
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioValuation {
    pub rows: Vec<ValuationRow>,
    pub total_market_value: f64,
    pub total_cost: f64,
    pub total_unrealized_pnl: f64,
    /// Unavailable when total cost is zero (e.g. missing cost column)
    pub total_return_pct: Metric<f64>,
}

/// Combine holdings with latest prices into valuation rows and totals.
///
/// A holding whose price lookup is missing is kept in the output at price
/// zero and still counted in the totals - visible, never silently dropped.
pub fn valuate(holdings: &[Holding], prices: &HashMap<String, f64>) -> PortfolioValuation {
    let rows: Vec<ValuationRow> = holdings
        .iter()
        .map(|holding| {
            let price = Metric::from_option(prices.get(&holding.code).copied());
            let current_price = price.value_or(0.0);
            let market_value = current_price * holding.quantity;
            let unrealized_pnl = market_value - holding.total_cost();

            ValuationRow {
                code: holding.code.clone(),
                category: holding.category.clone(),
                quantity: holding.quantity,
                average_cost: holding.average_cost,
                price,
                current_price,
                market_value,
                unrealized_pnl,
            }
        })
        .collect();

    let total_market_value: f64 = rows.iter().map(|r| r.market_value).sum();
    let total_cost: f64 = rows.iter().map(|r| r.average_cost * r.quantity).sum();
    let total_unrealized_pnl = total_market_value - total_cost;

    let total_return_pct = if total_cost == 0.0 {
        Metric::Unavailable
    } else {
        Metric::Present(total_unrealized_pnl / total_cost * 100.0)
    };

    PortfolioValuation {
        rows,
        total_market_value,
        total_cost,
        total_unrealized_pnl,
        total_return_pct,
    }
}
