//! Logging helpers
//!
//! Subscriber setup plus the banner lines printed around a run.

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for verbose runs.
/// Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Log startup information
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Starting application run on {}", config.board);
    info!(
        "📊 {} position(s) × {} location(s), up to {} page(s) each",
        config.positions.len(),
        config.locations.len(),
        config.max_search_pages
    );
    if config.skip_apply {
        info!("💡 Dry run: nothing will be submitted");
    }
    info!("{}", "=".repeat(60));
}

/// Log the start of one (position, location) search
///
/// # Arguments
/// - `index`: 1-based index of the pair
/// - `total`: number of pairs
pub fn log_search_start(index: usize, total: usize, position: &str, location: &str) {
    info!("\n{}", "=".repeat(60));
    info!("🔍 Search {}/{}: '{}' in '{}'", index, total, position, location);
    info!("{}", "=".repeat(60));
}

/// Print the final tally
pub fn print_final_stats(applied: usize, skipped: usize, failed: usize, output_dir: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Run summary");
    info!("Finished at: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ Applied: {}", applied);
    info!("⏭️ Skipped: {}", skipped);
    info!("❌ Failed: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\nResults saved to: {}", output_dir.display());
}

/// Truncate long text for log display
///
/// # Arguments
/// - `text`: original text
/// - `max_len`: maximum number of characters kept
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
