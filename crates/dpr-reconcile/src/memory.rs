//! In-process snapshot store.
//!
//! Backs the scenario tests and dry runs. Keeps every inserted snapshot and
//! an insert log so callers can assert exactly what was written.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::store::{DateIdResolver, Snapshot, SnapshotStore, StoreFault};
use crate::{Attributes, DateId, FactStream, SnapshotKey};

type Streams = BTreeMap<(FactStream, SnapshotKey), BTreeMap<DateId, Attributes>>;

#[derive(Debug, Default)]
struct Inner {
    streams: Streams,
    log: Vec<(FactStream, SnapshotKey, DateId)>,
    fail_inserts: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    inner: Mutex<Inner>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, op: &'static str, stream: FactStream) -> Result<MutexGuard<'_, Inner>, StoreFault> {
        self.inner.lock().map_err(|_| StoreFault::Unavailable {
            op,
            table: stream.table(),
            message: "in-memory store lock poisoned".to_string(),
        })
    }

    /// Seed a snapshot directly, bypassing policies (history from "earlier runs").
    pub fn seed(&self, stream: FactStream, key: SnapshotKey, date: DateId, attrs: Attributes) {
        if let Ok(mut g) = self.inner.lock() {
            g.streams.entry((stream, key)).or_default().insert(date, attrs);
        }
    }

    /// Make every subsequent insert fail with `message`.
    pub fn fail_inserts(&self, message: &str) {
        if let Ok(mut g) = self.inner.lock() {
            g.fail_inserts = Some(message.to_string());
        }
    }

    /// Inserts performed through the store contract (seeds excluded).
    pub fn insert_count(&self, stream: FactStream) -> usize {
        self.inner
            .lock()
            .map(|g| g.log.iter().filter(|(s, _, _)| *s == stream).count())
            .unwrap_or(0)
    }

    pub fn total_inserts(&self) -> usize {
        self.inner.lock().map(|g| g.log.len()).unwrap_or(0)
    }

    /// Insert log in call order.
    pub fn insert_log(&self) -> Vec<(FactStream, SnapshotKey, DateId)> {
        self.inner.lock().map(|g| g.log.clone()).unwrap_or_default()
    }

    pub fn snapshot_at(&self, stream: FactStream, key: &SnapshotKey, date: DateId) -> Option<Attributes> {
        let g = self.inner.lock().ok()?;
        g.streams
            .get(&(stream, key.clone()))
            .and_then(|by_date| by_date.get(&date))
            .cloned()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn exists_for_date(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<bool, StoreFault> {
        let g = self.lock("exists_for_date", stream)?;
        Ok(g
            .streams
            .get(&(stream, key.clone()))
            .is_some_and(|by_date| by_date.contains_key(&date)))
    }

    async fn latest_before(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<Option<Snapshot>, StoreFault> {
        let g = self.lock("latest_before", stream)?;
        Ok(g.streams.get(&(stream, key.clone())).and_then(|by_date| {
            by_date
                .range(..date)
                .next_back()
                .map(|(d, attrs)| Snapshot {
                    date: *d,
                    attrs: attrs.clone(),
                })
        }))
    }

    async fn insert(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
        attrs: &Attributes,
    ) -> Result<(), StoreFault> {
        let mut g = self.lock("insert", stream)?;
        if let Some(message) = &g.fail_inserts {
            return Err(StoreFault::Unavailable {
                op: "insert",
                table: stream.table(),
                message: message.clone(),
            });
        }
        g.streams
            .entry((stream, key.clone()))
            .or_default()
            .insert(date, attrs.clone());
        g.log.push((stream, key.clone(), date));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Date identifiers
// ---------------------------------------------------------------------------

/// Registered report dates, one id per consecutive day.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDateIds {
    ids: BTreeMap<NaiveDate, DateId>,
}

impl InMemoryDateIds {
    /// Register `days` consecutive dates from `first`, numbered from `first_id`.
    pub fn consecutive(first: NaiveDate, days: u64, first_id: i64) -> Self {
        let ids = (0..days)
            .filter_map(|i| first.checked_add_days(Days::new(i)).map(|d| (d, DateId(first_id + i as i64))))
            .collect();
        Self { ids }
    }

    pub fn register(&mut self, date: NaiveDate, id: DateId) {
        self.ids.insert(date, id);
    }

    pub fn get(&self, date: NaiveDate) -> Option<DateId> {
        self.ids.get(&date).copied()
    }
}

#[async_trait]
impl DateIdResolver for InMemoryDateIds {
    async fn date_id(&self, date: NaiveDate) -> Result<Option<DateId>, StoreFault> {
        Ok(self.get(date))
    }
}
