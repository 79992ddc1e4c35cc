use chrono::Utc;
use std::path::PathBuf;

use crate::error::Error;
use crate::models::{load_holdings, ProviderConfig};
use crate::services::{detect_upcoming, DividendClient};

pub fn run(holdings_path: PathBuf, lookback_days: i64) {
    match run_dividends(&holdings_path, lookback_days) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_dividends(holdings_path: &PathBuf, lookback_days: i64) -> Result<(), Error> {
    let holdings = load_holdings(holdings_path)?;
    if holdings.is_empty() {
        println!("⚠️  No holdings found in {:?}", holdings_path);
        return Ok(());
    }

    let codes: Vec<String> = holdings.iter().map(|h| h.code.clone()).collect();
    println!("🎯 Checking {} holdings for ex-dividend announcements...\n", codes.len());

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    let alerts = runtime.block_on(async {
        let config = ProviderConfig::from_env();
        let client = DividendClient::new(&config)?;
        let as_of = Utc::now().date_naive();
        Ok::<_, Error>(detect_upcoming(&client, &config, &codes, as_of, lookback_days).await)
    })?;

    if alerts.is_empty() {
        println!("😴 No recent or upcoming ex-dividend dates across {} holdings.", codes.len());
        return Ok(());
    }

    println!("📢 {} announcement(s):\n", alerts.len());
    for alert in &alerts {
        println!(
            "   {:<8} ex-date {}  rate {:>6.2}  price {:>8.2}",
            alert.code, alert.ex_date, alert.rate, alert.current_price
        );
    }

    Ok(())
}
