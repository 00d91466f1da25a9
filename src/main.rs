//! Page Timer - A persisted stopwatch for tracking time spent on a page
//!
//! This is the main entry point for the page-timer application.

use tracing::debug;

use page_timer::{commands::run, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout stays clean for status and commit output
    tracing_subscriber::fmt()
        .with_env_filter(format!("page_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "Configuration: store={}, pause_display={:?}, commit_rounding={:?}",
        config.store_path().display(),
        config.pause_display,
        config.commit_rounding
    );

    run(config).await
}
