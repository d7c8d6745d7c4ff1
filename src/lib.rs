//! # callgate
//!
//! **Callgate** is a thin call-sequencing layer placed in front of an
//! arbitrary asynchronous client (an HTTP call, an RPC, anything async).
//!
//! Callers fire many concurrent calls; by default exactly **one** is admitted
//! to run at a time, in first-registered order. Individual calls can opt out
//! of ordering ("parallel" mode), and calls that have not yet been admitted
//! can be cancelled. A pluggable hook pipeline intercepts the lifecycle
//! (config rewriting, pre-invocation, success/failure) without touching the
//! queue or the call logic.
//!
//! ## Architecture
//! ```text
//!   CallHandler A      CallHandler B      CallHandler C (parallel)
//!       │ fire()           │ fire()           │ fire()
//!       ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  CallGate (per client)                                  │
//! │  - global HookTable (instance tables shadow it)         │
//! │  - global resolve-validation predicate                  │
//! │  - default parallel status                              │
//! └──────┬──────────────────┬──────────────────┬────────────┘
//!        ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  AdmissionQueue (process-wide or injected)              │
//! │  [ A:fired ][ B:pending ][ C:fired(parallel) ]          │
//! │     head ── admitted ──► next fires when head removed   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle of one fired call
//! ```text
//! fire()
//!   ├─► queue.register(id)                 Created ─► Queued
//!   ├─► UpdateConfig hook (transform)
//!   ├─► queue.await_admission(id)          Queued ─► Admitted
//!   ├─► BeforeFire hook                    Admitted ─► Invoking
//!   ├─► client.call(config)
//!   │     ├─ ok + validated ─► AfterSuccess, BeforeResolve ─► Succeeded
//!   │     └─ err / rejected ─► AfterFail, BeforeReject     ─► Failed
//!   └─► queue.unregister(id)               admits the next queued call
//! ```
//!
//! ## Guarantees
//! - **FIFO admission**: non-parallel calls are admitted in registration
//!   order, each only after its predecessor unregisters.
//! - **Guaranteed cleanup**: unregistration runs exactly once per fired call
//!   (via an RAII guard), so a failure never stalls the queue.
//! - **Non-preemptive cancel**: cancelling only prevents a not-yet-admitted
//!   call from running; it never interrupts an invocation, and it never
//!   settles the suspended fire future.
//!
//! ## Example
//! ```
//! use callgate::{CallGate, ClientFn, FireOptions, GateConfig, Hook};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Any async function can be a client.
//!     let client = ClientFn::new(|url: String| async move {
//!         Ok::<_, std::convert::Infallible>(format!("fetched {url}"))
//!     });
//!
//!     let gate = CallGate::new(client, GateConfig::default());
//!     gate.set_hook(Hook::update_config(|url: String| format!("{url}?v=2")));
//!
//!     // Sequential by default: one call admitted at a time.
//!     let call = gate.handler("https://api.test/users".to_string());
//!     let body = call.fire(FireOptions::default()).await?;
//!     assert_eq!(body, "fetched https://api.test/users?v=2");
//!
//!     // Parallel calls bypass ordering.
//!     let rushed = gate.handler("https://api.test/health".to_string());
//!     rushed.fire(FireOptions::parallel(true)).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod gate;
mod handler;
mod hooks;
mod queue;

// ---- Public re-exports ----

pub use client::{Client, ClientFn};
pub use config::{FireOptions, GateConfig};
pub use error::{CallError, FireError};
pub use gate::CallGate;
pub use handler::{CallHandler, HandlerState};
pub use hooks::{
    AfterFailFn, AfterSuccessFn, BeforeFireFn, BeforeRejectFn, BeforeResolveFn, Hook, HookTable,
    UpdateConfigFn, ValidateFn,
};
pub use queue::{AdmissionQueue, EntryStatus};
