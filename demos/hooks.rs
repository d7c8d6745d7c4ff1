//! # Example: hooks
//!
//! Demonstrates the hook pipeline and resolve validation:
//! - a global `UpdateConfig` hook appends an auth token to every request,
//! - a global `BeforeResolve` hook strips the response envelope,
//! - a per-handler `BeforeResolve` override shadows the global one,
//! - a resolve-validation predicate rejects non-200 responses even though
//!   the client itself succeeded.
//!
//! ## Run
//! ```bash
//! cargo run --example hooks
//! ```

use callgate::{CallError, CallGate, ClientFn, FireOptions, GateConfig, Hook};

#[derive(Debug, Clone)]
struct Response {
    status: u16,
    body: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== hooks example ===\n");

    // The fake server: /missing answers 404, everything else 200.
    let client = ClientFn::new(|url: String| async move {
        let status = if url.starts_with("/missing") { 404 } else { 200 };
        Ok::<_, std::convert::Infallible>(Response {
            status,
            body: format!("payload of {url}"),
        })
    });

    let gate = CallGate::new(client, GateConfig::default());
    gate.set_hook(Hook::update_config(|url: String| format!("{url}?token=s3cr3t")))
        .set_hook(Hook::before_resolve(|res: Response, _| Response {
            body: res.body.to_uppercase(),
            ..res
        }))
        .set_resolve_validation(|res| res.status == 200);

    // Global hooks apply.
    let ok = gate
        .handler("/users".to_string())
        .fire(FireOptions::default())
        .await;
    println!("/users   -> {ok:?}");

    // Instance override shadows the global BeforeResolve for this call only.
    let raw = gate.handler("/orders".to_string());
    raw.set_hook(Hook::before_resolve(|res, _| res));
    println!("/orders  -> {:?}", raw.fire(FireOptions::default()).await);

    // The client succeeded, but validation routes this to the failure path.
    let missing = gate
        .handler("/missing".to_string())
        .fire(FireOptions::default())
        .await;
    match missing {
        Err(CallError::Rejected(res)) => println!("/missing -> rejected with {}", res.status),
        other => println!("/missing -> unexpected: {other:?}"),
    }
    Ok(())
}
