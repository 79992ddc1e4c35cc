use std::path::PathBuf;

use crate::commands::format_metric;
use crate::error::Error;
use crate::models::{ProviderConfig, Watchlist};
use crate::services::{scan, PriceService};

pub fn run(watchlist_path: PathBuf, group: Option<String>) {
    match run_scan(&watchlist_path, group.as_deref()) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_scan(watchlist_path: &PathBuf, group: Option<&str>) -> Result<(), Error> {
    let watchlist = Watchlist::from_file(watchlist_path)?;

    let codes = match group {
        Some(name) => watchlist
            .get_group(name)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Unknown group '{}'. Available: {}",
                    name,
                    watchlist.group_names().join(", ")
                ))
            })?,
        None => watchlist.all_codes(),
    };

    println!("📡 Scanning {} watchlist entries for momentum...\n", codes.len());

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    let candidates = runtime.block_on(async {
        let mut prices = PriceService::new(ProviderConfig::from_env())?;
        Ok::<_, Error>(scan(&mut prices, &codes).await)
    })?;

    if candidates.is_empty() {
        println!("😴 No breakout candidates today.");
        return Ok(());
    }

    println!("🚀 {} candidate(s), highest conviction first:\n", candidates.len());
    for candidate in &candidates {
        println!(
            "   {:<8} change {:>6.2}%  volume x{:>5.2}  bias {:>6.2}%  support {}",
            candidate.code,
            candidate.change_pct,
            candidate.volume_ratio,
            candidate.ma_bias,
            format_metric(&candidate.support_level),
        );
    }

    Ok(())
}
