// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Sequential recording and reporting.
//!
//! Run with: `RUST_LOG=debug cargo run --example basic`

use action_stats::{ActionService, ActionStats};
use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let service = ActionService::new();

    service.record_event(r#"{"action":"jump", "time":100}"#)?;
    service.record_event(r#"{"action":"run", "time":75}"#)?;
    info!("Stats: {}", service.report()?);

    service.record_event(r#"{"action":"jump", "time":200}"#)?;
    service.record_event(r#"{"action":"jump", "time":300}"#)?;
    info!("Stats: {}", service.report()?);

    // Rejected input is logged and returned, and leaves the averages alone.
    if let Err(e) = service.record_event(r#"{"action":"jump", "time":-5}"#) {
        info!("Rejected: {e}");
    }

    for entry in service.averages() {
        println!("{:>8}: {}", entry.action, entry.avg);
    }

    Ok(())
}
