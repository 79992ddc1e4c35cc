use crate::commands::format_metric;
use crate::error::Error;
use crate::models::{ProviderConfig, SignalStatus};
use crate::services::{compute_signal, venue_candidates, PriceService};

pub fn run(code: String, lookback_days: u32) {
    match run_signal(&code, lookback_days) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_signal(code: &str, lookback_days: u32) -> Result<(), Error> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let config = ProviderConfig::from_env();
        let mut prices = PriceService::new(config)?;

        let candidates = venue_candidates(code);
        println!(
            "🔍 {} - trying venues in order: {}, {}",
            code, candidates[0], candidates[1]
        );

        let mut histories = prices.fetch_batch(&[code.to_string()], lookback_days).await;
        let history = histories.remove(code).unwrap_or_default();

        if history.is_empty() {
            println!("⚠️  No data on any venue for {}", code);
            return Ok(());
        }

        let signal = compute_signal(&history);

        println!("\n🔹 {} ({} points)", code, history.len());
        if let Some(last) = history.last() {
            println!("   Latest close: {:.2}  ({})", last.close, last.time.format("%Y-%m-%d"));
        }
        println!("   Key line:     {}", format_metric(&signal.key_line));
        println!("   MA bias:      {}%", format_metric(&signal.ma_bias));
        println!("   Status:       {} {}", status_icon(signal.status), signal.status);

        Ok(())
    })
}

fn status_icon(status: SignalStatus) -> &'static str {
    match status {
        SignalStatus::Overheated => "🔥",
        SignalStatus::BrokenSupport => "🔻",
        SignalStatus::NearSupport => "🛡️",
        SignalStatus::Trending => "📈",
        SignalStatus::Insufficient => "❔",
    }
}
