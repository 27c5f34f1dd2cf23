//! Position tracking with synchronous crash-safe persistence.

mod book;
mod snapshot;

pub use book::{LedgerStats, PositionLedger, TieBreak};
pub use snapshot::{LedgerError, LedgerSnapshot, SnapshotStore};
