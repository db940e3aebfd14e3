// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Many writers and readers sharing one service on a multi-threaded runtime.
//!
//! Run with: `cargo run --example concurrent`
//! Structured rejections: `cargo run --example concurrent --features "tracing metrics"`

use action_stats::{ActionService, ActionStats};
use futures::future::join_all;

const WRITERS: u64 = 1_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
        .with_target(false)
        .init();

    let service = ActionService::new();

    let mut tasks = Vec::new();
    for i in 1..=WRITERS {
        let jumper = service.clone();
        tasks.push(tokio::spawn(async move {
            jumper.record_event(&format!(r#"{{"action":"Jump", "time":{i}}}"#))
        }));
        let runner = service.clone();
        tasks.push(tokio::spawn(async move {
            runner.record_event(r#"{"action":"run", "time":10}"#)
        }));
    }
    // A few bad records mixed in.
    for raw in [r#"{"action":"", "time":1}"#, r#"{"action":"run", "time":0.5}"#] {
        let service = service.clone();
        tasks.push(tokio::spawn(async move { service.record_event(raw) }));
    }

    let readers: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.report() })
        })
        .collect();

    let failed = join_all(tasks)
        .await
        .into_iter()
        .filter(|r| !matches!(r, Ok(Ok(()))))
        .count();
    for report in join_all(readers).await {
        report??;
    }

    println!("Failed records: {failed}");
    println!("Final stats: {}", service.report()?);

    #[cfg(feature = "metrics")]
    {
        let metrics = service.metrics();
        println!("Accepted: {}", metrics.accepted_count);
        println!("Rejected: {}", metrics.rejected_count());
        println!("Reports: {}", metrics.report_count);
        println!("Uptime: {:?}", metrics.uptime);
    }

    Ok(())
}
