use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use policy_tracker::config::Config;
use policy_tracker::crawler::CrawlEngine;
use policy_tracker::scheduler::CrawlScheduler;

use super::print_events;

pub async fn schedule(config: Config) -> Result<ExitCode> {
    let engine = Arc::new(CrawlEngine::new(&config).context("Failed to initialize crawl engine")?);
    let events = engine.events().clone();
    let printer = print_events(engine.subscribe());

    let handle = match CrawlScheduler::new(engine, config.job())
        .with_check_interval(config.check_interval())
        .with_events(events)
        .start()
    {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start scheduler");
            eprintln!("{}", e.localized_desc());
            return Ok(ExitCode::FAILURE);
        }
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested, waiting for the current crawl to stop");

    let stopped = handle.shutdown().await;
    let _ = printer.await;

    if let Err(e) = stopped {
        tracing::error!(error = %e, "Scheduler did not stop cleanly");
        eprintln!("{}", e.localized_desc());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
