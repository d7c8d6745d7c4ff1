//! Lifecycle states of a call handler.

/// Lifecycle state of a [`CallHandler`](crate::CallHandler).
///
/// ```text
/// Created ──► Queued ──► Admitted ──► Invoking ──► Succeeded
///               │                         │
///               ▼                         └──────► Failed
///           Cancelled
/// ```
///
/// `Cancelled` is reachable only from `Queued`, before admission, and only
/// for non-parallel fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Client and config bound; no queue interaction yet.
    Created,
    /// Registered with the admission queue, waiting for its turn.
    Queued,
    /// Admission granted; hooks not yet run.
    Admitted,
    /// Client call in flight.
    Invoking,
    /// Settled with a validated, resolved output.
    Succeeded,
    /// Settled with a client error or a rejected result.
    Failed,
    /// Removed from the queue before ever being admitted.
    Cancelled,
}

impl HandlerState {
    /// `true` for states the handler can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandlerState::Succeeded | HandlerState::Failed | HandlerState::Cancelled
        )
    }

    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerState::Created => "created",
            HandlerState::Queued => "queued",
            HandlerState::Admitted => "admitted",
            HandlerState::Invoking => "invoking",
            HandlerState::Succeeded => "succeeded",
            HandlerState::Failed => "failed",
            HandlerState::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(HandlerState::Succeeded.is_terminal());
        assert!(HandlerState::Failed.is_terminal());
        assert!(HandlerState::Cancelled.is_terminal());
        assert!(!HandlerState::Created.is_terminal());
        assert!(!HandlerState::Queued.is_terminal());
        assert!(!HandlerState::Admitted.is_terminal());
        assert!(!HandlerState::Invoking.is_terminal());
    }
}
