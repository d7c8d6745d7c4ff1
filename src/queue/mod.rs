//! FIFO admission queue for fired calls.

mod admission;
mod entry;

pub use admission::AdmissionQueue;
pub use entry::EntryStatus;
