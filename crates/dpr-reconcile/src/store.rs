use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Attributes, DateId, FactStream, SnapshotKey};

/// The most recent earlier snapshot of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: DateId,
    pub attrs: Attributes,
}

/// The store could not be reached, or answered with data that does not fit
/// the stream's shape. Fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFault {
    Unavailable {
        op: &'static str,
        table: &'static str,
        message: String,
    },
    Malformed {
        table: &'static str,
        column: String,
        message: String,
    },
}

impl fmt::Display for StoreFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFault::Unavailable { op, table, message } => {
                write!(f, "store {op} on '{table}' failed: {message}")
            }
            StoreFault::Malformed {
                table,
                column,
                message,
            } => write!(f, "store returned malformed '{table}.{column}': {message}"),
        }
    }
}

impl std::error::Error for StoreFault {}

/// Temporal snapshot store, one logical table per fact stream.
///
/// Implementations must be read-your-writes: a successful `insert` is
/// visible to the next `exists_for_date`/`latest_before` of the same run.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn exists_for_date(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<bool, StoreFault>;

    /// Snapshot with the greatest date strictly before `date`.
    async fn latest_before(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<Option<Snapshot>, StoreFault>;

    async fn insert(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
        attrs: &Attributes,
    ) -> Result<(), StoreFault>;
}

/// Maps calendar dates to their store-assigned identifiers. Identifiers are
/// queried, never computed.
#[async_trait]
pub trait DateIdResolver: Send + Sync {
    /// `None` when the date is not registered.
    async fn date_id(&self, date: NaiveDate) -> Result<Option<DateId>, StoreFault>;
}
