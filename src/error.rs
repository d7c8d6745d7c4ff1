//! Error types surfaced by fired calls.
//!
//! A fired call can fail in two ways that share one rejection path:
//!
//! - [`CallError::Client`] — the underlying client call itself failed.
//! - [`CallError::Rejected`] — the client call succeeded, but the result did
//!   not pass the resolve-validation predicate.
//!
//! Both are funneled through the `AfterFail` and `BeforeReject` hooks before
//! being returned, so callers distinguish them only by the payload they carry.
//! [`CallError::AlreadyFired`] is a setup error: it is returned synchronously
//! and never routed through hooks.

use thiserror::Error;

use crate::client::Client;

/// Error returned by [`CallHandler::fire`](crate::CallHandler::fire).
///
/// Generic over the client's output type `T` (carried by rejected results)
/// and the client's error type `E`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CallError<T, E> {
    /// The client call failed on its own.
    #[error("client call failed: {0}")]
    Client(E),

    /// The client call succeeded but the result failed resolve validation.
    ///
    /// Carries the raw (pre-`BeforeResolve`) output so reject hooks and
    /// callers can inspect it.
    #[error("call result failed resolve validation")]
    Rejected(T),

    /// `fire()` was called more than once on the same handler.
    #[error("fire() was already called on this handler")]
    AlreadyFired,
}

impl<T, E> CallError<T, E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::Client(_) => "call_client_failed",
            CallError::Rejected(_) => "call_rejected",
            CallError::AlreadyFired => "call_already_fired",
        }
    }

    /// `true` if the result was rejected by resolve validation.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CallError::Rejected(_))
    }

    /// `true` if the underlying client call itself failed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CallError::Client(_))
    }
}

/// Shorthand for the [`CallError`] produced by firing against client `C`.
pub type FireError<C> = CallError<<C as Client>::Output, <C as Client>::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let client: CallError<u32, std::io::Error> =
            CallError::Client(std::io::Error::other("boom"));
        assert_eq!(client.as_label(), "call_client_failed");
        assert!(client.is_client_error());
        assert!(!client.is_rejection());

        let rejected: CallError<u32, std::io::Error> = CallError::Rejected(7);
        assert_eq!(rejected.as_label(), "call_rejected");
        assert!(rejected.is_rejection());

        let refired: CallError<u32, std::io::Error> = CallError::AlreadyFired;
        assert_eq!(refired.as_label(), "call_already_fired");
    }
}
