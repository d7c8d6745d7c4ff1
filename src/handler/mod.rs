//! Per-call handler and its lifecycle state machine.

mod call;
mod state;

pub use call::CallHandler;
pub use state::HandlerState;
