use std::path::PathBuf;

use crate::commands::format_metric;
use crate::constants::LATEST_PRICE_LOOKBACK_DAYS;
use crate::error::Error;
use crate::models::{load_holdings, Metric, ProviderConfig};
use crate::services::{valuate, PriceService};

pub fn run(holdings_path: PathBuf) {
    match run_value(&holdings_path) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_value(holdings_path: &PathBuf) -> Result<(), Error> {
    let holdings = load_holdings(holdings_path)?;
    if holdings.is_empty() {
        println!("⚠️  No holdings found in {:?}", holdings_path);
        return Ok(());
    }

    println!("💼 Valuing {} holdings...\n", holdings.len());

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    let valuation = runtime.block_on(async {
        let mut prices = PriceService::new(ProviderConfig::from_env())?;
        let codes: Vec<String> = holdings.iter().map(|h| h.code.clone()).collect();
        let latest = prices.latest_prices(&codes, LATEST_PRICE_LOOKBACK_DAYS).await;
        Ok::<_, Error>(valuate(&holdings, &latest))
    })?;

    for row in &valuation.rows {
        let flag = if row.price.is_present() { " " } else { "⚠️" };
        println!(
            "  {} {:<8} qty {:>10.0}  price {:>8}  value {:>14.0}  P&L {:>+14.0}",
            flag,
            row.code,
            row.quantity,
            format_metric(&row.price),
            row.market_value,
            row.unrealized_pnl,
        );
    }

    println!("\n═══════════════════════════════════════════════════════════");
    println!("  Market value: {:>16.0}", valuation.total_market_value);
    println!("  Total cost:   {:>16.0}", valuation.total_cost);
    println!("  Unrealized:   {:>+16.0}", valuation.total_unrealized_pnl);
    match &valuation.total_return_pct {
        Metric::Present(pct) => println!("  Return:       {:>15.2}%", pct),
        other => println!("  Return:       {:>16}", format_metric(other)),
    }

    Ok(())
}
