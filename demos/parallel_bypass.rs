//! # Example: parallel_bypass
//!
//! Demonstrates the ordering bypass: a call fired with `parallel: true` is
//! admitted immediately, even while sequential calls are still queued, and a
//! queued call can be cancelled before it is ever admitted.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► fire "report-1" and "report-2" sequentially (slow client)
//!   ├─► fire "health" with FireOptions::parallel(true)
//!   │     └─► runs alongside "report-1" without waiting
//!   ├─► cancel "report-2" while it is still queued
//!   └─► only "report-1" and "health" complete
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example parallel_bypass
//! ```

use std::sync::Arc;
use std::time::Duration;

use callgate::{CallGate, ClientFn, FireOptions, GateConfig, HandlerState};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== parallel_bypass example ===\n");

    let client = ClientFn::new(|job: &'static str| async move {
        println!("  -> start {job}");
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!("  <- done  {job}");
        Ok::<_, std::convert::Infallible>(job)
    });
    let gate = CallGate::new(client, GateConfig::default());

    let report_1 = Arc::new(gate.handler("report-1"));
    let report_2 = Arc::new(gate.handler("report-2"));
    let health = Arc::new(gate.handler("health"));

    // Sequential reports: report-2 queues behind report-1.
    let fire_1 = tokio::spawn({
        let h = report_1.clone();
        async move { h.fire(FireOptions::default()).await }
    });
    let fire_2 = tokio::spawn({
        let h = report_2.clone();
        async move { h.fire(FireOptions::default()).await }
    });

    // The health probe must not wait for the reports.
    let fire_health = tokio::spawn({
        let h = health.clone();
        async move { h.fire(FireOptions::parallel(true)).await }
    });

    // Give the fires a moment to register, then drop the queued report.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let cancelled = report_2.cancel();
    println!(
        "\ncancel report-2: {} (state: {})\n",
        cancelled,
        report_2.state().as_label()
    );
    assert_eq!(report_2.state(), HandlerState::Cancelled);
    // The cancelled fire future never settles; abort its task.
    fire_2.abort();

    println!("report-1 -> {:?}", fire_1.await??);
    println!("health   -> {:?}", fire_health.await??);
    Ok(())
}
