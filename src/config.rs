//! # Gate configuration and per-fire options.
//!
//! [`GateConfig`] controls a [`CallGate`](crate::CallGate): whether ordering
//! is enabled, whether the queue emits diagnostic traces, and the default
//! parallel status for fires that don't specify one.
//!
//! [`FireOptions`] is the per-call bundle accepted by
//! [`CallHandler::fire`](crate::CallHandler::fire).
//!
//! # Example
//! ```
//! use callgate::{FireOptions, GateConfig};
//!
//! let mut cfg = GateConfig::default();
//! cfg.queue_logs = true;
//!
//! let opts = FireOptions::parallel(true).with_id("profile-fetch");
//! assert_eq!(opts.parallel, Some(true));
//! ```

/// Configuration for a [`CallGate`](crate::CallGate).
#[derive(Clone, Debug)]
pub struct GateConfig {
    /// Enable FIFO admission ordering.
    ///
    /// When `false` the gate never touches the queue: every fire is admitted
    /// immediately and cancellation is meaningless.
    pub queue: bool,

    /// Emit `tracing` debug events for queue add/fire/remove/cancel.
    pub queue_logs: bool,

    /// Default ordering-bypass status for fires that leave
    /// [`FireOptions::parallel`] unset.
    pub default_parallel: bool,
}

impl Default for GateConfig {
    /// Provides a default configuration:
    /// - `queue = true` (one call admitted at a time)
    /// - `queue_logs = false`
    /// - `default_parallel = false` (sequential unless a fire opts out)
    fn default() -> Self {
        Self {
            queue: true,
            queue_logs: false,
            default_parallel: false,
        }
    }
}

/// Per-call options accepted by [`CallHandler::fire`](crate::CallHandler::fire).
#[derive(Clone, Debug, Default)]
pub struct FireOptions {
    /// Bypass admission ordering for this call.
    ///
    /// `None` inherits [`GateConfig::default_parallel`].
    pub parallel: Option<bool>,

    /// Custom queue id for this call.
    ///
    /// Ignored (a fresh id is generated) when empty or already occupied.
    pub id: Option<String>,
}

impl FireOptions {
    /// Options with an explicit parallel status.
    pub fn parallel(flag: bool) -> Self {
        Self {
            parallel: Some(flag),
            ..Self::default()
        }
    }

    /// Sets a custom queue id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
