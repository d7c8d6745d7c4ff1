//! Queue entry bookkeeping: one entry per registered call.

use tokio::sync::oneshot;

/// Admission status of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Registered but no admission listener attached yet.
    ///
    /// Covers the window between `register` and `await_admission`; entries in
    /// this state are never fired by the head check and cannot be cancelled.
    Registered,

    /// Waiting for its turn at the head of the queue.
    Pending,

    /// Exempt from ordering; fired as soon as the listener attaches.
    Parallel,

    /// Admission granted; the listener has been consumed.
    Fired,
}

impl EntryStatus {
    /// Returns a short stable label (snake_case) for trace lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            EntryStatus::Registered => "registered",
            EntryStatus::Pending => "pending",
            EntryStatus::Parallel => "parallel",
            EntryStatus::Fired => "fired",
        }
    }
}

/// One registered call awaiting (or granted) admission.
pub(super) struct QueueEntry {
    pub(super) id: String,
    pub(super) status: EntryStatus,
    /// Single-shot admission listener, consumed exactly once on fire.
    pub(super) listener: Option<oneshot::Sender<()>>,
}

impl QueueEntry {
    pub(super) fn new(id: String) -> Self {
        Self {
            id,
            status: EntryStatus::Registered,
            listener: None,
        }
    }

    /// Fires the admission listener, if one is attached.
    ///
    /// Marks the entry [`EntryStatus::Fired`] and consumes the listener.
    /// Returns `false` when no listener was attached (the entry is left
    /// untouched, mirroring the head check skipping `Registered` entries).
    pub(super) fn fire(&mut self) -> bool {
        match self.listener.take() {
            Some(tx) => {
                self.status = EntryStatus::Fired;
                // The waiter may already be gone; admission is then a no-op.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_without_listener_is_a_noop() {
        let mut entry = QueueEntry::new("1__abc".into());
        assert!(!entry.fire());
        assert_eq!(entry.status, EntryStatus::Registered);
    }

    #[tokio::test]
    async fn test_fire_consumes_the_listener_once() {
        let (tx, rx) = oneshot::channel();
        let mut entry = QueueEntry::new("1__abc".into());
        entry.listener = Some(tx);
        entry.status = EntryStatus::Pending;

        assert!(entry.fire());
        assert_eq!(entry.status, EntryStatus::Fired);
        assert!(rx.await.is_ok());

        // Listener is gone; a second fire does nothing.
        assert!(!entry.fire());
    }
}
