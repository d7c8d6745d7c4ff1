//! # Admission queue: FIFO ordering for fired calls.
//!
//! A process-wide queue that tracks every in-flight call's admission status
//! and decides, on each state change, which pending call (if any) runs next.
//!
//! ## Rules
//! - Insertion order is the FIFO contract: the head is the earliest
//!   still-registered entry, regardless of status.
//! - A non-parallel entry is fired when its listener attaches while it holds
//!   the head position, or when a later [`unregister`](AdmissionQueue::unregister)
//!   makes it the pending head. Unregistration is the **only** admission
//!   trigger for queued entries.
//! - A parallel entry bypasses the head check and fires as soon as its
//!   listener attaches — but it still occupies its insertion slot, so a
//!   parallel entry sitting at the head delays a later sequential entry's
//!   self-admission until the parallel entry is removed.
//! - [`cancel`](AdmissionQueue::cancel) succeeds only while the entry is
//!   still pending. It removes bookkeeping but never settles the waiter:
//!   a cancelled waiter's admission future stays suspended forever.
//!
//! ## Example
//! ```
//! use callgate::AdmissionQueue;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = AdmissionQueue::new();
//! let id = queue.register(None);
//!
//! // Sole entry, so admission is granted immediately.
//! queue.await_admission(&id, false).await;
//! queue.unregister(&id);
//! # }
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::oneshot;
use tracing::debug;

use super::entry::{EntryStatus, QueueEntry};

static GLOBAL: OnceLock<Arc<AdmissionQueue>> = OnceLock::new();

/// Insertion-ordered admission queue.
///
/// All mutation happens behind an internal mutex; no lock is held across an
/// await point. Create isolated instances with [`AdmissionQueue::new`] or
/// share the process-wide one via [`AdmissionQueue::global`].
pub struct AdmissionQueue {
    inner: Mutex<Inner>,
    trace: AtomicBool,
}

struct Inner {
    /// Count of all entries ever registered; prefix of generated ids.
    count: u64,
    entries: VecDeque<QueueEntry>,
}

impl Inner {
    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn generate_id(&mut self) -> String {
        self.count += 1;
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(8)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        format!("{}__{}", self.count, suffix)
    }
}

impl AdmissionQueue {
    /// Creates an isolated queue instance.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                count: 0,
                entries: VecDeque::new(),
            }),
            trace: AtomicBool::new(false),
        })
    }

    /// Returns the process-wide queue, created lazily on first use.
    ///
    /// Every gate built with [`GateConfig::queue`](crate::GateConfig::queue)
    /// shares this instance, so sequential calls are ordered across gates.
    pub fn global() -> Arc<Self> {
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// Enables or disables diagnostic trace events (`tracing` debug level).
    pub fn set_trace(&self, enabled: bool) {
        self.trace.store(enabled, Ordering::Relaxed);
    }

    /// Registers a new entry at the tail and returns its id.
    ///
    /// A non-empty, unoccupied `custom_id` is kept as-is; anything else gets
    /// a generated `{counter}__{random suffix}` id. Generated ids are
    /// effectively (probabilistically) unique; no collision retry is made.
    /// Never fails.
    pub fn register(&self, custom_id: Option<&str>) -> String {
        let mut inner = self.lock();
        let id = match custom_id {
            Some(id) if !id.is_empty() && inner.position(id).is_none() => id.to_string(),
            _ => inner.generate_id(),
        };
        inner.entries.push_back(QueueEntry::new(id.clone()));
        if self.trace_enabled() {
            debug!(target: "callgate::queue", id = %id, "added");
        }
        id
    }

    /// Returns a future that resolves when `id` is admitted.
    ///
    /// The listener attaches **eagerly** (before the future is first polled):
    /// the entry becomes pending, or — with `parallel` — is fired on the
    /// spot. A non-parallel entry also fires immediately when it already
    /// holds the head position. An unknown id is (re-)inserted at the tail
    /// first.
    ///
    /// If the entry is removed before being fired, the returned future never
    /// resolves (see the module docs on cancellation).
    pub fn await_admission(&self, id: &str, parallel: bool) -> impl Future<Output = ()> + Send {
        let rx = self.attach_listener(id, parallel);
        async move {
            if rx.await.is_err() {
                // Entry removed before admission (cancelled or cleaned up).
                // The queue contract leaves such waiters suspended instead
                // of failing them.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Removes `id` unconditionally, then fires the new head if it is
    /// pending. Returns whether an entry was removed.
    ///
    /// This is the sole admission trigger for queued entries, so it must be
    /// called exactly once per fired call regardless of outcome.
    pub fn unregister(&self, id: &str) -> bool {
        let mut inner = self.lock();
        let removed = match inner.position(id) {
            Some(idx) => {
                inner.entries.remove(idx);
                true
            }
            None => false,
        };
        if removed && self.trace_enabled() {
            debug!(target: "callgate::queue", id = %id, "removed");
        }
        if inner
            .entries
            .front()
            .is_some_and(|e| e.status == EntryStatus::Pending)
        {
            self.fire_at(&mut inner, 0);
        }
        removed
    }

    /// Cancels a still-pending entry.
    ///
    /// Returns `true` (and removes the entry) only while its status is
    /// [`EntryStatus::Pending`]; `false` for registered, parallel, fired, or
    /// unknown ids. The caller's in-flight admission future is **not**
    /// settled — cancellation only prevents a future admission grant.
    pub fn cancel(&self, id: &str) -> bool {
        let mut inner = self.lock();
        match inner.position(id) {
            Some(idx) if inner.entries[idx].status == EntryStatus::Pending => {
                inner.entries.remove(idx);
                if self.trace_enabled() {
                    debug!(target: "callgate::queue", id = %id, "cancelled");
                }
                true
            }
            _ => false,
        }
    }

    /// Current admission status of `id`, if registered.
    pub fn status(&self, id: &str) -> Option<EntryStatus> {
        let inner = self.lock();
        inner.position(id).map(|idx| inner.entries[idx].status)
    }

    /// Number of registered (not yet removed) entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// `true` when no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn attach_listener(&self, id: &str, parallel: bool) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.lock();

        let idx = match inner.position(id) {
            Some(idx) => idx,
            None => {
                inner.entries.push_back(QueueEntry::new(id.to_string()));
                inner.entries.len() - 1
            }
        };
        {
            let entry = &mut inner.entries[idx];
            entry.listener = Some(tx);
            entry.status = if parallel {
                EntryStatus::Parallel
            } else {
                EntryStatus::Pending
            };
        }

        // Parallel entries bypass ordering entirely. A sequential entry
        // self-admits only from the head position; the head re-check also
        // re-admits a pending head that lost an earlier grant.
        if parallel || idx == 0 {
            self.fire_at(&mut inner, idx);
        }
        rx
    }

    fn fire_at(&self, inner: &mut Inner, idx: usize) {
        if let Some(entry) = inner.entries.get_mut(idx) {
            let from = entry.status.as_label();
            if entry.fire() && self.trace_enabled() {
                debug!(target: "callgate::queue", id = %entry.id, from, "fired");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Queue mutations cannot leave Inner half-updated, so a poisoned
        // lock is still safe to reuse.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn trace_enabled(&self) -> bool {
        self.trace.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::poll;
    use std::pin::pin;

    #[test]
    fn test_register_keeps_free_custom_ids() {
        let queue = AdmissionQueue::new();
        assert_eq!(queue.register(Some("users")), "users");
        assert_eq!(queue.status("users"), Some(EntryStatus::Registered));
    }

    #[test]
    fn test_register_generates_id_when_custom_id_is_unusable() {
        let queue = AdmissionQueue::new();
        queue.register(Some("users"));

        // Occupied and empty custom ids both fall back to generation.
        let occupied = queue.register(Some("users"));
        let empty = queue.register(Some(""));
        let absent = queue.register(None);

        for id in [&occupied, &empty, &absent] {
            assert_ne!(id.as_str(), "users");
            let (counter, suffix) = id.split_once("__").expect("generated id format");
            assert!(counter.parse::<u64>().is_ok());
            assert_eq!(suffix.len(), 8);
        }
        assert_ne!(occupied, empty);
        assert_eq!(queue.len(), 4);
    }

    #[tokio::test]
    async fn test_sequential_admission_follows_registration_order() {
        let queue = AdmissionQueue::new();
        let a = queue.register(None);
        let b = queue.register(None);
        let c = queue.register(None);

        let mut fut_a = pin!(queue.await_admission(&a, false));
        let mut fut_b = pin!(queue.await_admission(&b, false));
        let mut fut_c = pin!(queue.await_admission(&c, false));

        // Head self-admits; the rest wait.
        assert!(poll!(fut_a.as_mut()).is_ready());
        assert!(poll!(fut_b.as_mut()).is_pending());
        assert!(poll!(fut_c.as_mut()).is_pending());

        queue.unregister(&a);
        assert!(poll!(fut_b.as_mut()).is_ready());
        assert!(poll!(fut_c.as_mut()).is_pending());

        queue.unregister(&b);
        assert!(poll!(fut_c.as_mut()).is_ready());
    }

    #[tokio::test]
    async fn test_parallel_entry_is_admitted_immediately() {
        let queue = AdmissionQueue::new();
        let a = queue.register(None);
        let b = queue.register(None);
        let p = queue.register(None);

        let mut fut_a = pin!(queue.await_admission(&a, false));
        let mut fut_b = pin!(queue.await_admission(&b, false));
        assert!(poll!(fut_a.as_mut()).is_ready());
        assert!(poll!(fut_b.as_mut()).is_pending());

        // Fires despite two earlier entries still occupying the queue.
        let mut fut_p = pin!(queue.await_admission(&p, true));
        assert!(poll!(fut_p.as_mut()).is_ready());
        assert_eq!(queue.status(&p), Some(EntryStatus::Fired));

        // The parallel entry did not steal b's turn.
        queue.unregister(&a);
        assert!(poll!(fut_b.as_mut()).is_ready());
    }

    #[tokio::test]
    async fn test_parallel_head_delays_later_sequential_entry() {
        let queue = AdmissionQueue::new();
        let p = queue.register(None);
        let s = queue.register(None);

        let mut fut_p = pin!(queue.await_admission(&p, true));
        assert!(poll!(fut_p.as_mut()).is_ready());

        // The fired parallel entry still holds the head slot, so the
        // sequential entry cannot self-admit until it is removed.
        let mut fut_s = pin!(queue.await_admission(&s, false));
        assert!(poll!(fut_s.as_mut()).is_pending());

        queue.unregister(&p);
        assert!(poll!(fut_s.as_mut()).is_ready());
    }

    #[tokio::test]
    async fn test_cancel_succeeds_only_while_pending() {
        let queue = AdmissionQueue::new();
        let a = queue.register(None);
        let b = queue.register(None);
        let c = queue.register(None);

        // Registered (no listener yet): not cancellable.
        assert!(!queue.cancel(&b));

        let mut fut_a = pin!(queue.await_admission(&a, false));
        let mut fut_b = pin!(queue.await_admission(&b, false));
        assert!(poll!(fut_a.as_mut()).is_ready());
        assert!(poll!(fut_b.as_mut()).is_pending());

        assert!(queue.cancel(&b));
        assert!(!queue.cancel(&b)); // unknown now
        assert!(!queue.cancel(&a)); // already fired
        assert!(!queue.cancel("nope"));

        // The cancelled waiter must stay suspended, and the queue must move
        // past the removed entry.
        let mut fut_c = pin!(queue.await_admission(&c, false));
        assert!(poll!(fut_c.as_mut()).is_pending());
        queue.unregister(&a);
        assert!(poll!(fut_b.as_mut()).is_pending());
        assert!(poll!(fut_c.as_mut()).is_ready());
    }

    #[tokio::test]
    async fn test_unregister_of_unknown_id_still_checks_the_head() {
        let queue = AdmissionQueue::new();
        let a = queue.register(None);
        let b = queue.register(None);

        let mut fut_a = pin!(queue.await_admission(&a, false));
        let mut fut_b = pin!(queue.await_admission(&b, false));
        assert!(poll!(fut_a.as_mut()).is_ready());

        // `a` is fired but still occupies the head, so nothing changes.
        assert!(!queue.unregister("ghost"));
        assert!(poll!(fut_b.as_mut()).is_pending());

        assert!(queue.unregister(&a));
        assert!(poll!(fut_b.as_mut()).is_ready());
    }

    #[tokio::test]
    async fn test_await_admission_inserts_unknown_ids_at_the_tail() {
        let queue = AdmissionQueue::new();
        let a = queue.register(None);
        let mut fut_a = pin!(queue.await_admission(&a, false));
        assert!(poll!(fut_a.as_mut()).is_ready());

        // Never registered: inserted behind `a`, so it waits.
        let mut fut_x = pin!(queue.await_admission("stray", false));
        assert!(poll!(fut_x.as_mut()).is_pending());
        assert_eq!(queue.len(), 2);

        queue.unregister(&a);
        assert!(poll!(fut_x.as_mut()).is_ready());
    }

    #[test]
    fn test_global_queue_is_shared() {
        let one = AdmissionQueue::global();
        let two = AdmissionQueue::global();
        assert!(Arc::ptr_eq(&one, &two));
    }
}
