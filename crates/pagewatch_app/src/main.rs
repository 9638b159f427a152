mod cli;
mod signals;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pagewatch_engine::{Supervisor, SupervisorExit, WatchConfig, WatchContext};
use watch_logging::{watch_debug, watch_info, LogDestination};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    watch_logging::initialize(destination, watch_logging::level_for(cli.verbose, cli.quiet));

    let config = cli.watch_config();
    let schedule = config.schedule;
    if schedule.is_repeating() {
        watch_info!(
            "Will check {} URLs for updates every {} (+ jitter up to {})",
            cli.urls.len(),
            humantime::format_duration(schedule.interval),
            humantime::format_duration(schedule.jitter)
        );
    } else {
        watch_info!(
            "Will check {} URLs for updates ONCE (use --repeat-every to keep checking)",
            cli.urls.len()
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run(config, cli.urls))
}

async fn run(config: WatchConfig, urls: Vec<String>) -> anyhow::Result<()> {
    let shutdown = signals::shutdown_signal()?;
    let context = WatchContext::from_config(&config).context("failed to build the HTTP client")?;
    let supervisor = Supervisor::new(Arc::new(context));

    match supervisor.run(urls, shutdown).await {
        SupervisorExit::Completed => watch_debug!("All checks finished"),
        SupervisorExit::Interrupted => watch_debug!("All watchers stopped"),
    }
    Ok(())
}
