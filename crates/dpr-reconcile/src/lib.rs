//! dpr-reconcile
//!
//! Reconciliation of validated daily facts into date-versioned streams.
//!
//! Architectural decisions:
//! - At most one snapshot per (entity key, exact date) in every stream
//! - Append-If-Absent: event-log streams, insert when the date is free
//! - Insert-If-Changed: change-log streams, insert when the date is free AND
//!   the candidate differs from the most recent earlier snapshot
//! - Snapshots are never updated or deleted
//!
//! The store is the only side-effecting boundary; everything else here is
//! pure. Dates must be reconciled in increasing order per key: only the single
//! most recent earlier snapshot is consulted.

pub mod memory;
mod policy;
mod store;
mod stream;
mod types;

pub use memory::{InMemoryDateIds, InMemorySnapshotStore};
pub use policy::{
    append_if_absent, insert_if_changed, insert_if_changed_by, reconcile, Candidate, Decision,
};
pub use store::{DateIdResolver, Snapshot, SnapshotStore, StoreFault};
pub use stream::{Column, ColumnKind, FactStream, Policy};
pub use types::*;
