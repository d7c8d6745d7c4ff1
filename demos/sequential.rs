//! # Example: sequential
//!
//! Demonstrates the default FIFO admission: three calls fired concurrently
//! run strictly one at a time, in registration order.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► build ClientFn (fake fetch, ~300ms per call)
//!   ├─► CallGate::new (queue enabled, queue_logs on)
//!   ├─► fire "users", "orders", "invoices" concurrently
//!   │     ├─► "users" admitted immediately (head)
//!   │     ├─► "orders" waits until "users" unregisters
//!   │     └─► "invoices" waits until "orders" unregisters
//!   └─► print completion order (always users, orders, invoices)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example sequential
//! ```

use std::time::Duration;

use callgate::{CallGate, ClientFn, FireOptions, GateConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== sequential example ===\n");

    // Queue diagnostics go through `tracing` at debug level.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // 1. A fake client: every call takes ~300ms.
    let client = ClientFn::new(|resource: &'static str| async move {
        println!("  -> fetching {resource}");
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("  <- finished {resource}");
        Ok::<_, std::convert::Infallible>(format!("{resource}: 200 OK"))
    });

    // 2. A gate with ordering enabled and queue traces on.
    let gate = CallGate::new(
        client,
        GateConfig {
            queue_logs: true,
            ..GateConfig::default()
        },
    );

    // 3. Fire three calls at once; the gate serializes them.
    let users = gate.handler("users");
    let orders = gate.handler("orders");
    let invoices = gate.handler("invoices");

    let (users, orders, invoices) = tokio::join!(
        users.fire(FireOptions::default()),
        orders.fire(FireOptions::default()),
        invoices.fire(FireOptions::default()),
    );

    println!("\nresults:");
    println!("  {}", users?);
    println!("  {}", orders?);
    println!("  {}", invoices?);
    Ok(())
}
