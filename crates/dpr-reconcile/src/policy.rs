use serde::Serialize;

use crate::store::{SnapshotStore, StoreFault};
use crate::{attribute_set_differs_except, Attributes, DateId, FactStream, Policy, SnapshotKey};

/// One snapshot the caller would like to see stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub stream: FactStream,
    pub key: SnapshotKey,
    pub date: DateId,
    pub attrs: Attributes,
}

impl Candidate {
    pub fn new(stream: FactStream, key: SnapshotKey, date: DateId, attrs: Attributes) -> Self {
        Self {
            stream,
            key,
            date,
            attrs,
        }
    }
}

/// What a policy did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Inserted,
    /// A snapshot already exists for this key and date.
    AlreadyPresent,
    /// Insert-If-Changed only: identical to the previous snapshot.
    Unchanged,
}

impl Decision {
    pub fn inserted(&self) -> bool {
        matches!(self, Decision::Inserted)
    }
}

/// Append-If-Absent: insert when nothing is stored for the exact date.
pub async fn append_if_absent<S>(store: &S, c: &Candidate) -> Result<Decision, StoreFault>
where
    S: SnapshotStore + ?Sized,
{
    if store.exists_for_date(c.stream, &c.key, c.date).await? {
        return Ok(Decision::AlreadyPresent);
    }
    store.insert(c.stream, &c.key, c.date, &c.attrs).await?;
    Ok(Decision::Inserted)
}

/// Insert-If-Changed with the default loose attribute comparison.
pub async fn insert_if_changed<S>(store: &S, c: &Candidate) -> Result<Decision, StoreFault>
where
    S: SnapshotStore + ?Sized,
{
    let stamped = c.stream.stamped_columns();
    insert_if_changed_by(store, c, |cand, prev| attribute_set_differs_except(cand, prev, stamped)).await
}

/// Insert-If-Changed: insert when nothing is stored for the exact date and
/// `differs(candidate, previous)` holds against the most recent earlier
/// snapshot.
pub async fn insert_if_changed_by<S, F>(store: &S, c: &Candidate, differs: F) -> Result<Decision, StoreFault>
where
    S: SnapshotStore + ?Sized,
    F: Fn(&Attributes, Option<&Attributes>) -> bool + Send,
{
    let prev = store.latest_before(c.stream, &c.key, c.date).await?;
    let changed = differs(&c.attrs, prev.as_ref().map(|p| &p.attrs));

    if store.exists_for_date(c.stream, &c.key, c.date).await? {
        return Ok(Decision::AlreadyPresent);
    }
    if !changed {
        return Ok(Decision::Unchanged);
    }
    store.insert(c.stream, &c.key, c.date, &c.attrs).await?;
    Ok(Decision::Inserted)
}

/// Apply the stream's own policy.
pub async fn reconcile<S>(store: &S, c: &Candidate) -> Result<Decision, StoreFault>
where
    S: SnapshotStore + ?Sized,
{
    match c.stream.policy() {
        Policy::AppendIfAbsent => append_if_absent(store, c).await,
        Policy::InsertIfChanged => insert_if_changed(store, c).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySnapshotStore;

    fn well(id: i64) -> SnapshotKey {
        SnapshotKey::Well(id)
    }

    fn stock(cat: i64) -> Attributes {
        Attributes::new()
            .with("well_stock_category_id", Some(cat))
            .with("production_method_id", Some(2_i64))
    }

    #[tokio::test]
    async fn append_inserts_exactly_once_per_date() {
        let store = InMemorySnapshotStore::new();
        let a = Candidate::new(
            FactStream::DailyWellParameters,
            well(1),
            DateId(10),
            Attributes::new().with("choke", Some(8.0)),
        );
        assert_eq!(append_if_absent(&store, &a).await.unwrap(), Decision::Inserted);

        // different values, same key/date: still no insert
        let b = Candidate {
            attrs: Attributes::new().with("choke", Some(9.0)),
            ..a.clone()
        };
        assert_eq!(
            append_if_absent(&store, &b).await.unwrap(),
            Decision::AlreadyPresent
        );
        assert_eq!(store.insert_count(FactStream::DailyWellParameters), 1);
        assert_eq!(
            store.snapshot_at(FactStream::DailyWellParameters, &well(1), DateId(10)),
            Some(a.attrs)
        );
    }

    #[tokio::test]
    async fn insert_if_changed_writes_only_on_change() {
        let store = InMemorySnapshotStore::new();
        let day = |d: i64, cat: i64| Candidate::new(FactStream::WellStock, well(1), DateId(d), stock(cat));

        assert_eq!(insert_if_changed(&store, &day(10, 1)).await.unwrap(), Decision::Inserted);
        assert_eq!(insert_if_changed(&store, &day(11, 1)).await.unwrap(), Decision::Unchanged);
        assert_eq!(insert_if_changed(&store, &day(12, 2)).await.unwrap(), Decision::Inserted);
        assert_eq!(insert_if_changed(&store, &day(12, 3)).await.unwrap(), Decision::AlreadyPresent);
        assert_eq!(store.insert_count(FactStream::WellStock), 2);
    }

    #[tokio::test]
    async fn all_absent_candidate_without_history_is_not_a_change() {
        let store = InMemorySnapshotStore::new();
        let c = Candidate::new(
            FactStream::WellDowntimeReasons,
            well(1),
            DateId(10),
            Attributes::new()
                .with("downtime_category", None::<String>)
                .with("comments", None::<String>),
        );
        assert_eq!(insert_if_changed(&store, &c).await.unwrap(), Decision::Unchanged);
        assert_eq!(store.insert_count(FactStream::WellDowntimeReasons), 0);
    }

    #[tokio::test]
    async fn custom_equality_is_honoured() {
        let store = InMemorySnapshotStore::new();
        let c = Candidate::new(FactStream::Completions, well(1), DateId(10), stock(1));
        let never = |_: &Attributes, _: Option<&Attributes>| false;
        assert_eq!(
            insert_if_changed_by(&store, &c, never).await.unwrap(),
            Decision::Unchanged
        );
    }

    #[tokio::test]
    async fn reconcile_dispatches_on_stream_policy() {
        let store = InMemorySnapshotStore::new();
        for d in 1..=3 {
            let c = Candidate::new(FactStream::WellTests, well(1), DateId(d), stock(1));
            assert_eq!(reconcile(&store, &c).await.unwrap(), Decision::Inserted);
            let c = Candidate::new(FactStream::WellStock, well(1), DateId(d), stock(1));
            let want = if d == 1 { Decision::Inserted } else { Decision::Unchanged };
            assert_eq!(reconcile(&store, &c).await.unwrap(), want);
        }
    }

    #[tokio::test]
    async fn stamped_stock_constant_does_not_trigger_an_insert() {
        let store = InMemorySnapshotStore::new();
        let blank = Attributes::new()
            .with("well_stock_category_id", None::<i64>)
            .with("well_stock_sub_category_id", 1_i64)
            .with("production_method_id", None::<i64>);
        let c = Candidate::new(FactStream::WellStock, well(1), DateId(1), blank.clone());
        assert_eq!(insert_if_changed(&store, &c).await.unwrap(), Decision::Unchanged);
        assert_eq!(store.total_inserts(), 0);

        // a legacy row with another constant is not a change either
        let legacy = blank.clone().with("well_stock_category_id", Some(4_i64)).with("well_stock_sub_category_id", 7_i64);
        store.seed(FactStream::WellStock, well(1), DateId(1), legacy);
        let same = blank.with("well_stock_category_id", Some(4_i64));
        let c = Candidate::new(FactStream::WellStock, well(1), DateId(2), same);
        assert_eq!(insert_if_changed(&store, &c).await.unwrap(), Decision::Unchanged);
    }

    #[tokio::test]
    async fn store_faults_propagate() {
        let store = InMemorySnapshotStore::new();
        store.fail_inserts("disk full");
        let c = Candidate::new(FactStream::WellStock, well(1), DateId(1), stock(1));
        assert!(matches!(
            reconcile(&store, &c).await,
            Err(StoreFault::Unavailable { op: "insert", .. })
        ));
    }
}
