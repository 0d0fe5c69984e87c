use anyhow::{Context, Result};
use std::process::ExitCode;

use policy_tracker::config::Config;
use policy_tracker::crawler::CrawlEngine;
use policy_tracker::error::TrackerErrorTrait;
use policy_tracker::models::CrawlSummary;

use super::print_events;

pub async fn crawl(config: Config, json: bool) -> Result<ExitCode> {
    let engine = CrawlEngine::new(&config).context("Failed to initialize crawl engine")?;
    let printer = print_events(engine.subscribe());

    let result = engine.run_once(config.job()).await;

    // Closing the only sender lets the printer drain and exit.
    drop(engine);
    let _ = printer.await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, category = ?e.category(), "Crawl failed");
            eprintln!("{}", e.localized_desc());
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.store_unreachable() {
        tracing::error!(
            store_errors = summary.store_errors,
            "Record store was unreachable for the whole run"
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &CrawlSummary) {
    println!();
    println!("Crawl Summary");
    println!("=============");
    println!(
        "Pages:     {} fetched, {} failed",
        summary.pages_fetched, summary.pages_failed
    );
    println!("Entries:   {} seen", summary.entries_seen);
    println!("Inserted:  {}", summary.inserted);
    println!("Failed:    {}", summary.insert_failed);
    println!("Skipped:   {}", summary.entries_skipped);
    if summary.date_fallbacks > 0 {
        println!("Dates:     {} unreadable", summary.date_fallbacks);
    }
    println!("Stopped:   {}", summary.stop_reason);
}
