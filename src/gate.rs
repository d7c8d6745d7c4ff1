//! # Call gate: the shared sequencing front for one client.
//!
//! [`CallGate`] bundles the client, the (optional) admission queue, the
//! global hook table, and the global resolve-validation predicate. It is the
//! `init` surface of the crate: construct one per client, share it (it is
//! returned in an [`Arc`]), and mint a [`CallHandler`] per call.
//!
//! Global hooks and validation are process-shared mutable state with no
//! access control — the last writer wins, exactly like the per-instance
//! tables.
//!
//! ## Example
//! ```
//! use callgate::{CallGate, ClientFn, FireOptions, GateConfig, Hook};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClientFn::new(|url: String| async move {
//!     Ok::<_, std::convert::Infallible>(format!("GET {url}"))
//! });
//!
//! let gate = CallGate::new(client, GateConfig::default());
//! gate.set_hook(Hook::before_resolve(|body: String, _| body.to_uppercase()));
//!
//! let call = gate.handler("/users".to_string());
//! assert_eq!(call.fire(FireOptions::default()).await?, "GET /USERS");
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock};

use crate::client::Client;
use crate::config::GateConfig;
use crate::handler::CallHandler;
use crate::hooks::{Hook, HookTable, ValidateFn};
use crate::queue::AdmissionQueue;

/// Sequencing front for a single client.
///
/// Owns the process-shared defaults consulted by every handler it mints:
/// the global hook table (instance tables shadow it) and the global
/// resolve-validation predicate (default: every result resolves).
pub struct CallGate<C: Client> {
    client: Arc<C>,
    queue: Option<Arc<AdmissionQueue>>,
    hooks: RwLock<HookTable<C>>,
    validation: RwLock<ValidateFn<C>>,
    default_parallel: bool,
}

impl<C: Client> CallGate<C> {
    /// Creates a gate wired to the process-wide
    /// [`AdmissionQueue::global`] when `config.queue` is enabled.
    pub fn new(client: impl Into<Arc<C>>, config: GateConfig) -> Arc<Self> {
        let queue = config.queue.then(AdmissionQueue::global);
        Self::build(client.into(), config, queue)
    }

    /// Creates a gate with an explicitly injected queue.
    ///
    /// Use this to isolate ordering from the process-wide queue (tests, or
    /// independent sequencing domains within one process).
    pub fn with_queue(
        client: impl Into<Arc<C>>,
        config: GateConfig,
        queue: Arc<AdmissionQueue>,
    ) -> Arc<Self> {
        Self::build(client.into(), config, Some(queue))
    }

    fn build(client: Arc<C>, config: GateConfig, queue: Option<Arc<AdmissionQueue>>) -> Arc<Self> {
        if let Some(queue) = &queue {
            queue.set_trace(config.queue_logs);
        }
        Arc::new(Self {
            client,
            queue,
            hooks: RwLock::new(HookTable::with_identity_defaults()),
            validation: RwLock::new(Arc::new(|_: &C::Output| true)),
            default_parallel: config.default_parallel,
        })
    }

    /// Mints a handler for one call with the given config bound.
    pub fn handler(self: &Arc<Self>, config: C::Config) -> CallHandler<C> {
        CallHandler::new(self.clone(), config)
    }

    /// Installs a global hook, replacing any previous one under the same
    /// name. Handlers without an instance override pick it up on their next
    /// hook execution.
    pub fn set_hook(&self, hook: Hook<C>) -> &Self {
        self.hooks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .set(hook);
        self
    }

    /// Installs the global resolve-validation predicate.
    pub fn set_resolve_validation(
        &self,
        f: impl Fn(&C::Output) -> bool + Send + Sync + 'static,
    ) -> &Self {
        *self.validation.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(f);
        self
    }

    /// The gate's admission queue, if ordering is enabled.
    pub fn queue(&self) -> Option<&Arc<AdmissionQueue>> {
        self.queue.as_ref()
    }

    pub(crate) fn client(&self) -> Arc<C> {
        self.client.clone()
    }

    pub(crate) fn default_parallel(&self) -> bool {
        self.default_parallel
    }

    /// Snapshot of the global hook table (six `Arc` clones).
    pub(crate) fn hook_table(&self) -> HookTable<C> {
        self.hooks.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn validation(&self) -> ValidateFn<C> {
        self.validation
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientFn;
    use crate::config::FireOptions;

    use std::io;

    type Echo = ClientFn<u32, u32, io::Error>;

    fn echo() -> Echo {
        ClientFn::new(|n: u32| async move { Ok(n) })
    }

    #[test]
    fn test_default_validation_accepts_everything() {
        let gate = CallGate::with_queue(echo(), GateConfig::default(), AdmissionQueue::new());
        let validate = gate.validation();
        assert!(validate(&0));
        assert!(validate(&u32::MAX));
    }

    #[test]
    fn test_identity_defaults_are_installed_globally() {
        let gate = CallGate::with_queue(echo(), GateConfig::default(), AdmissionQueue::new());
        let table = gate.hook_table();
        assert!(table.update_config().is_some());
        assert!(table.before_resolve().is_some());
        assert!(table.before_reject().is_some());
        assert!(table.before_fire().is_none());
    }

    #[tokio::test]
    async fn test_default_parallel_applies_when_fire_leaves_it_unset() {
        let queue = AdmissionQueue::new();
        let gate = CallGate::with_queue(
            echo(),
            GateConfig {
                default_parallel: true,
                ..GateConfig::default()
            },
            queue.clone(),
        );

        // Park a sequential blocker at the head, directly on the queue.
        let blocker = queue.register(None);
        let _admitted = queue.await_admission(&blocker, false);

        // Unset parallel inherits the gate default and bypasses the blocker.
        let handler = gate.handler(7);
        assert_eq!(handler.fire(FireOptions::default()).await.unwrap(), 7);

        // An explicit override still queues.
        let queued = gate.handler(8);
        let fut = queued.fire(FireOptions::parallel(false));
        let mut fut = std::pin::pin!(fut);
        assert!(futures::poll!(fut.as_mut()).is_pending());
        assert_eq!(queued.state(), crate::HandlerState::Queued);
        queue.unregister(&blocker);
        assert_eq!(fut.await.unwrap(), 8);
    }
}
