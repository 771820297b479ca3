//! Logging helpers
//!
//! Subscriber setup plus the banner lines the CLI prints around a run.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::Role;

/// Install the fmt subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a second init (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 AGMS client starting");
    info!("🌐 Backend: {}", config.api_base_url);
    info!(
        "📊 Enrichment: {} concurrent, {}s timeout",
        config.max_concurrent_enrichment, config.enrichment_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

/// Counters for the dashboard banner
#[derive(Debug, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub awaiting: usize,
    pub approved: usize,
    pub rejected: usize,
    pub enrichment_filled: usize,
    pub enrichment_failed: usize,
    pub subordinate_lists: usize,
    pub subordinates_finalized: usize,
}

pub fn log_dashboard(user: &str, role: Role, stats: &DashboardStats) {
    info!("\n{}", "=".repeat(60));
    info!("📋 {} ({})", user, role);
    info!("{}", "─".repeat(60));
    info!("📄 Submissions: {}", stats.total);
    info!("⏳ Awaiting decision: {}", stats.awaiting);
    info!("✅ Approved: {}", stats.approved);
    info!("❌ Rejected: {}", stats.rejected);
    if stats.enrichment_filled + stats.enrichment_failed > 0 {
        info!(
            "🎓 GPA filled: {} (failed {})",
            stats.enrichment_filled, stats.enrichment_failed
        );
    }
    if stats.subordinate_lists > 0 {
        info!(
            "🗂  Subordinate lists finalized: {}/{}",
            stats.subordinates_finalized, stats.subordinate_lists
        );
    }
    info!("{}", "=".repeat(60));
}

/// Cut long text for log lines
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
