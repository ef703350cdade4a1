//! Example: Coordinated Passive Scan
//!
//! This example runs one coordinated passive scan against the first
//! available Bluetooth adapter and prints an annotated report for each
//! observed device.
//!
//! Run with: `cargo run --example passive_scan`

use std::sync::Arc;
use std::time::Duration;

use btlescan_core::{BtleplugRadio, ScanCoordinator, ScanOutcome};
use btlescan_store::SqliteKv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let store = Arc::new(SqliteKv::open_default()?);
    let radio = Arc::new(BtleplugRadio::new().await?);
    let coordinator = ScanCoordinator::embedded(store, radio)?;

    println!("Scanning for BLE advertisements (10s)...");
    println!();

    match coordinator.scan_with_retry(Duration::from_secs(10), 3).await? {
        ScanOutcome::Complete(reports) => {
            if reports.is_empty() {
                println!("No devices observed.");
            } else {
                println!("Observed {} device(s):", reports.len());
                println!();
                for report in &reports {
                    let rssi = report
                        .record
                        .rssi
                        .map(|r| format!("{} dBm", r))
                        .unwrap_or_else(|| "N/A".to_string());

                    println!("  {} [{}]", report.record.addr, report.record.addr_type);
                    println!("    Fingerprint: {}", report.fingerprint);
                    if let Some(name) = report.record.local_name() {
                        println!("    Name: {}", name);
                    }
                    if let Some(ref manufacturer) = report.manufacturer {
                        println!("    Manufacturer: {}", manufacturer);
                    }
                    println!("    RSSI: {}", rssi);
                    println!();
                }
            }
        }
        ScanOutcome::LockContention => {
            println!("Another scanner holds the lock; try again later.");
        }
        ScanOutcome::RadioError { failures } => {
            println!("Adapter failure ({} within the last hour).", failures);
        }
    }

    Ok(())
}
