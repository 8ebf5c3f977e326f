//! Polling and mutation units.
//!
//! Both publish [`SyncState`] snapshots through tokio watch channels, so
//! any number of consumers can observe a resource without coordinating
//! with the task that refreshes it.

mod mutation;
mod poll;
mod state;

pub use mutation::MutationUnit;
pub use poll::{Producer, SyncUnit};
pub use state::SyncState;
