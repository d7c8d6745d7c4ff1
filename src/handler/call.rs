//! # Call handler: one instance per logical call.
//!
//! [`CallHandler`] drives a single call through its lifecycle: register with
//! the admission queue, wait for admission, run the hook-wrapped invocation,
//! settle as success or failure, and always unregister so the next queued
//! call is admitted.
//!
//! ## Flow
//! ```text
//! fire()
//!   ├─► queue.register(id)            Created ─► Queued
//!   ├─► UpdateConfig hook             (transforms the bound config)
//!   ├─► queue.await_admission(id)     Queued ─► Admitted
//!   ├─► BeforeFire hook               Admitted ─► Invoking
//!   ├─► client.call(config)
//!   ├─ ok + valid ─► AfterSuccess, BeforeResolve    ─► Succeeded
//!   ├─ ok + invalid ─► AfterFail, BeforeReject      ─► Failed
//!   ├─ err ─► AfterFail, BeforeReject               ─► Failed
//!   └─► queue.unregister(id)          (guaranteed, admits the next entry)
//! ```
//!
//! Queue cleanup is held by an RAII guard, so the entry is unregistered even
//! when the `fire` future is dropped mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};

use crate::client::Client;
use crate::config::FireOptions;
use crate::error::{CallError, FireError};
use crate::gate::CallGate;
use crate::handler::state::HandlerState;
use crate::hooks::{Hook, HookTable, ValidateFn};
use crate::queue::AdmissionQueue;

/// Unregisters the queue entry on drop.
///
/// Unregistration is the sole admission trigger for queued entries, so it
/// must happen exactly once per fired call — including when the caller drops
/// the `fire` future before it settles.
struct QueueGuard {
    queue: Arc<AdmissionQueue>,
    id: String,
}

impl Drop for QueueGuard {
    fn drop(&mut self) {
        self.queue.unregister(&self.id);
    }
}

/// Handler for a single call sequenced by a [`CallGate`].
///
/// Holds the bound config, per-instance hook overrides, a per-instance
/// resolve-validation override, and the lifecycle state. All methods take
/// `&self`, so a handler can be shared (e.g. in an `Arc`) to [`cancel`]
/// a fire that is still waiting for admission.
///
/// [`cancel`]: CallHandler::cancel
pub struct CallHandler<C: Client> {
    gate: Arc<CallGate<C>>,
    client: RwLock<Arc<C>>,
    config: Mutex<Option<C::Config>>,
    hooks: RwLock<HookTable<C>>,
    validation: RwLock<Option<ValidateFn<C>>>,
    state: Mutex<HandlerState>,
    id: Mutex<Option<String>>,
    /// Resolved parallel status of the in-flight fire.
    parallel: AtomicBool,
}

impl<C: Client> CallHandler<C> {
    pub(crate) fn new(gate: Arc<CallGate<C>>, config: C::Config) -> Self {
        Self {
            client: RwLock::new(gate.client()),
            gate,
            config: Mutex::new(Some(config)),
            hooks: RwLock::new(HookTable::default()),
            validation: RwLock::new(None),
            state: Mutex::new(HandlerState::Created),
            id: Mutex::new(None),
            parallel: AtomicBool::new(false),
        }
    }

    /// Overrides the gate's client for this handler only.
    pub fn set_client(&self, client: Arc<C>) -> &Self {
        *write(&self.client) = client;
        self
    }

    /// Installs an instance-scope hook, shadowing the gate's global hook of
    /// the same name for this handler only. Last write wins.
    pub fn set_hook(&self, hook: Hook<C>) -> &Self {
        write(&self.hooks).set(hook);
        self
    }

    /// Installs an instance-scope resolve-validation predicate.
    pub fn set_resolve_validation(
        &self,
        f: impl Fn(&C::Output) -> bool + Send + Sync + 'static,
    ) -> &Self {
        *write(&self.validation) = Some(Arc::new(f));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandlerState {
        *lock(&self.state)
    }

    /// Queue id assigned by [`fire`](CallHandler::fire), once registered.
    pub fn id(&self) -> Option<String> {
        lock(&self.id).clone()
    }

    /// Fires the call and settles it.
    ///
    /// Registers with the admission queue (when the gate has one), applies
    /// the `UpdateConfig` hook, waits for admission, then runs the
    /// hook-wrapped invocation. Both failure sources — a client error and a
    /// result rejected by validation — are funneled through `AfterFail` and
    /// `BeforeReject` before being returned.
    ///
    /// A second call returns [`CallError::AlreadyFired`] synchronously,
    /// without touching the queue or the hooks.
    // Desugared `async fn` with an explicit `Send` bound: spawning a future
    // that awaits `fire` otherwise trips rustc's "implementation of `Send`
    // is not general enough" over-generalization for clients whose config
    // type contains a `'static` reference (rust-lang/rust#102211).
    pub fn fire(
        &self,
        options: FireOptions,
    ) -> impl std::future::Future<Output = Result<C::Output, FireError<C>>> + Send + '_ {
        async move {
            {
                let mut state = lock(&self.state);
                if *state != HandlerState::Created {
                    return Err(CallError::AlreadyFired);
                }
                if self.gate.queue().is_some() {
                    *state = HandlerState::Queued;
                } else {
                    *state = HandlerState::Admitted;
                }
            }

            let parallel = options
                .parallel
                .unwrap_or_else(|| self.gate.default_parallel());
            self.parallel.store(parallel, Ordering::Relaxed);

            let queued = self.gate.queue().map(|queue| {
                let id = queue.register(options.id.as_deref());
                *lock(&self.id) = Some(id.clone());
                QueueGuard {
                    queue: queue.clone(),
                    id,
                }
            });

            let config = match lock(&self.config).take() {
                Some(config) => config,
                None => return Err(CallError::AlreadyFired),
            };
            let config = self.exec_update_config(config);

            if let Some(guard) = &queued {
                guard.queue.await_admission(&guard.id, parallel).await;
                self.set_state(HandlerState::Admitted);
            }

            self.exec_before_fire(&options);
            self.set_state(HandlerState::Invoking);

            let client = read(&self.client).clone();
            let result = client.call(config).await;

            match result {
                Ok(output) => {
                    let validate = self.resolve_validation();
                    if validate(&output) {
                        self.exec_after_success(&output, &options);
                        let output = self.exec_before_resolve(output, &options);
                        self.set_state(HandlerState::Succeeded);
                        Ok(output)
                    } else {
                        self.settle_failure(CallError::Rejected(output), &options)
                    }
                }
                Err(err) => self.settle_failure(CallError::Client(err), &options),
            }
            // `queued` drops here, unregistering the entry and admitting the
            // next queued call.
        }
    }

    /// Cancels a fire that is still waiting for admission.
    ///
    /// Returns `true` only when the handler is `Queued`, the fire was not
    /// parallel, and the queue still held the pending entry. The suspended
    /// `fire` future is **not** settled; callers are expected to drop it.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        if *state != HandlerState::Queued || self.parallel.load(Ordering::Relaxed) {
            return false;
        }
        let Some(queue) = self.gate.queue() else {
            return false;
        };
        let Some(id) = lock(&self.id).clone() else {
            return false;
        };
        if queue.cancel(&id) {
            *state = HandlerState::Cancelled;
            true
        } else {
            false
        }
    }

    fn set_state(&self, next: HandlerState) {
        *lock(&self.state) = next;
    }

    fn settle_failure(
        &self,
        err: FireError<C>,
        options: &FireOptions,
    ) -> Result<C::Output, FireError<C>> {
        self.exec_after_fail(&err, options);
        let err = self.exec_before_reject(err, options);
        self.set_state(HandlerState::Failed);
        Err(err)
    }

    // Hook resolution: instance table first, then the gate's global table.

    fn exec_update_config(&self, config: C::Config) -> C::Config {
        let hook = read(&self.hooks)
            .update_config()
            .or_else(|| self.gate.hook_table().update_config());
        match hook {
            Some(f) => f(config),
            None => config,
        }
    }

    fn exec_before_fire(&self, options: &FireOptions) {
        let hook = read(&self.hooks)
            .before_fire()
            .or_else(|| self.gate.hook_table().before_fire());
        if let Some(f) = hook {
            f(options);
        }
    }

    fn exec_after_success(&self, output: &C::Output, options: &FireOptions) {
        let hook = read(&self.hooks)
            .after_success()
            .or_else(|| self.gate.hook_table().after_success());
        if let Some(f) = hook {
            f(output, options);
        }
    }

    fn exec_before_resolve(&self, output: C::Output, options: &FireOptions) -> C::Output {
        let hook = read(&self.hooks)
            .before_resolve()
            .or_else(|| self.gate.hook_table().before_resolve());
        match hook {
            Some(f) => f(output, options),
            None => output,
        }
    }

    fn exec_after_fail(&self, err: &FireError<C>, options: &FireOptions) {
        let hook = read(&self.hooks)
            .after_fail()
            .or_else(|| self.gate.hook_table().after_fail());
        if let Some(f) = hook {
            f(err, options);
        }
    }

    fn exec_before_reject(&self, err: FireError<C>, options: &FireOptions) -> FireError<C> {
        let hook = read(&self.hooks)
            .before_reject()
            .or_else(|| self.gate.hook_table().before_reject());
        match hook {
            Some(f) => f(err, options),
            None => err,
        }
    }

    fn resolve_validation(&self) -> ValidateFn<C> {
        read(&self.validation)
            .clone()
            .unwrap_or_else(|| self.gate.validation())
    }
}

// Handler state cannot be left half-updated, so poisoned locks are safe to
// reuse.

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn read<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(rwlock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(|e| e.into_inner())
}
