//! Probe CLI commands
//!
//! Handles: ccswitch test <name> / ccswitch test --all

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

use ccswitch_core::paths::AppPaths;
use ccswitch_core::profile::{ProbeResult, TestStatus};
use ccswitch_probe::{
    batch_probe, probe, BatchOptions, CancellationToken, HttpProbeClient, ProbeEvent,
};

use super::{find_index, open_store};

pub struct TestOptions {
    pub question: String,
    pub timeout: Duration,
    pub delay: Duration,
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

pub fn test_one(paths: &AppPaths, name: &str, options: &TestOptions) -> Result<()> {
    let mut store = open_store(paths);
    let index = find_index(&store, name)?;
    let client = HttpProbeClient::new(options.timeout)?;

    println!("Testing '{name}'...");
    let result = runtime()?.block_on(probe(&mut store, index, &client, &options.question))?;
    print_result(name, &result);

    if !result.is_success() {
        bail!("Test failed for '{name}'");
    }
    Ok(())
}

pub fn test_all(paths: &AppPaths, options: &TestOptions) -> Result<()> {
    let mut store = open_store(paths);
    if store.is_empty() {
        println!("No profiles to test.");
        return Ok(());
    }

    let client = Arc::new(HttpProbeClient::new(options.timeout)?);
    let batch = BatchOptions {
        question: options.question.clone(),
        delay: options.delay,
    };
    let cancel = CancellationToken::new();

    let summary = runtime()?.block_on(async {
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nStopping after the current profile...");
                on_signal.cancel();
            }
        });

        batch_probe(&mut store, client, batch, cancel, |event| match event {
            ProbeEvent::Started {
                name,
                position,
                total,
            } => println!("[{}/{total}] Testing '{name}'...", position + 1),
            ProbeEvent::Finished { name, result } => print_result(name, result),
            ProbeEvent::BatchCancelled { skipped } => {
                debug!(count = skipped.len(), "batch cancelled");
            }
            ProbeEvent::BatchCompleted { .. } => {}
        })
        .await
    })?;

    println!();
    if summary.cancelled {
        println!(
            "Cancelled: {} tested, {} skipped ({})",
            summary.probed,
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }
    println!(
        "{} passed, {} unsuccessful",
        summary.passed,
        summary.unsuccessful()
    );
    Ok(())
}

fn print_result(name: &str, result: &ProbeResult) {
    let label = match result.status {
        TestStatus::Passed => "PASS",
        TestStatus::Failed => "FAIL",
        TestStatus::Timeout => "TIMEOUT",
        TestStatus::Error | TestStatus::Untested => "ERROR",
    };
    println!("  {label} {name} ({}): {}", result.tested_at, result.message);
}
