//! Postgres `SnapshotStore`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::debug;

use dpr_reconcile::{
    AttrValue, Attributes, ColumnKind, DateId, FactStream, Snapshot, SnapshotKey, SnapshotStore,
    StoreFault,
};

#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// SQL generation
// ---------------------------------------------------------------------------

/// `k1 = $1 and k2 = $2 and <date> <op> $n`, with `$n` the next placeholder.
fn key_and_date_predicate(stream: FactStream, date_op: &str) -> String {
    let mut parts: Vec<String> = stream
        .key_columns()
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{name} = ${}", i + 1))
        .collect();
    parts.push(format!(
        "{} {date_op} ${}",
        stream.date_column(),
        stream.key_columns().len() + 1
    ));
    parts.join(" and ")
}

pub fn exists_sql(stream: FactStream) -> String {
    format!(
        "select exists (select 1 from {} where {})",
        stream.table(),
        key_and_date_predicate(stream, "=")
    )
}

pub fn latest_before_sql(stream: FactStream) -> String {
    let mut cols = vec![stream.date_column()];
    cols.extend(stream.column_names());
    format!(
        "select {} from {} where {} order by {} desc limit 1",
        cols.join(", "),
        stream.table(),
        key_and_date_predicate(stream, "<"),
        stream.date_column()
    )
}

pub fn insert_sql(stream: FactStream) -> String {
    let mut cols: Vec<&str> = stream.key_columns().iter().map(|(n, _)| *n).collect();
    cols.push(stream.date_column());
    cols.extend(stream.column_names());
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("${i}")).collect();
    format!(
        "insert into {} ({}) values ({})",
        stream.table(),
        cols.join(", "),
        placeholders.join(", ")
    )
}

// ---------------------------------------------------------------------------
// Binding and decoding
// ---------------------------------------------------------------------------

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn unavailable(op: &'static str, stream: FactStream, err: sqlx::Error) -> StoreFault {
    StoreFault::Unavailable {
        op,
        table: stream.table(),
        message: err.to_string(),
    }
}

fn malformed(stream: FactStream, column: &str, message: impl Into<String>) -> StoreFault {
    StoreFault::Malformed {
        table: stream.table(),
        column: column.to_string(),
        message: message.into(),
    }
}

fn bind_key<'q>(q: PgQuery<'q>, stream: FactStream, key: &SnapshotKey) -> Result<PgQuery<'q>, StoreFault> {
    match (stream, key) {
        (FactStream::Flowmeters, SnapshotKey::Platform(id)) => Ok(q.bind(*id)),
        (FactStream::DailyGeneralComments, SnapshotKey::FieldPlatform { field_id, platform }) => {
            Ok(q.bind(*field_id).bind(platform.clone()))
        }
        (FactStream::Flowmeters | FactStream::DailyGeneralComments, _) | (_, SnapshotKey::Platform(_)) => {
            Err(malformed(stream, "key", format!("key {key} does not address this stream")))
        }
        (_, SnapshotKey::FieldPlatform { .. }) => {
            Err(malformed(stream, "key", format!("key {key} does not address this stream")))
        }
        (_, SnapshotKey::Well(id)) => Ok(q.bind(*id)),
    }
}

/// Bind one attribute with the Postgres type its column is declared with.
fn bind_attr<'q>(
    q: PgQuery<'q>,
    stream: FactStream,
    column: &str,
    kind: ColumnKind,
    value: &AttrValue,
) -> Result<PgQuery<'q>, StoreFault> {
    let mismatch = || malformed(stream, column, format!("cannot store {value} as {kind:?}"));
    Ok(match kind {
        ColumnKind::Int => q.bind(match value {
            AttrValue::Absent => None,
            AttrValue::Int(v) => Some(*v),
            AttrValue::Num(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => return Err(mismatch()),
        }),
        ColumnKind::Num => q.bind(match value {
            AttrValue::Absent => None,
            other => Some(other.as_f64().ok_or_else(mismatch)?),
        }),
        ColumnKind::Text => q.bind(match value {
            AttrValue::Absent => None,
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Int(v) => Some(v.to_string()),
            AttrValue::Num(v) => Some(v.to_string()),
            AttrValue::Date(d) => Some(d.to_string()),
        }),
        ColumnKind::Date => q.bind(match value {
            AttrValue::Absent => None,
            AttrValue::Date(d) => Some(*d),
            _ => return Err(mismatch()),
        }),
    })
}

fn decode_attr(row: &PgRow, stream: FactStream, column: &str, kind: ColumnKind) -> Result<AttrValue, StoreFault> {
    let bad = |e: sqlx::Error| malformed(stream, column, e.to_string());
    Ok(match kind {
        ColumnKind::Int => row.try_get::<Option<i64>, _>(column).map_err(bad)?.into(),
        ColumnKind::Num => row.try_get::<Option<f64>, _>(column).map_err(bad)?.into(),
        ColumnKind::Text => row.try_get::<Option<String>, _>(column).map_err(bad)?.into(),
        ColumnKind::Date => row.try_get::<Option<NaiveDate>, _>(column).map_err(bad)?.into(),
    })
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn exists_for_date(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<bool, StoreFault> {
        let sql = exists_sql(stream);
        let q = bind_key(sqlx::query(&sql), stream, key)?.bind(date.0);
        let row = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unavailable("exists_for_date", stream, e))?;
        row.try_get::<bool, _>(0)
            .map_err(|e| malformed(stream, "exists", e.to_string()))
    }

    async fn latest_before(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
    ) -> Result<Option<Snapshot>, StoreFault> {
        let sql = latest_before_sql(stream);
        let q = bind_key(sqlx::query(&sql), stream, key)?.bind(date.0);
        let Some(row) = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("latest_before", stream, e))?
        else {
            return Ok(None);
        };

        let date_col = stream.date_column();
        let prev_date = row
            .try_get::<i64, _>(date_col)
            .map_err(|e| malformed(stream, date_col, e.to_string()))?;

        let mut attrs = Attributes::new();
        for (column, kind) in stream.columns() {
            attrs.set(column, decode_attr(&row, stream, column, *kind)?);
        }
        Ok(Some(Snapshot {
            date: DateId(prev_date),
            attrs,
        }))
    }

    async fn insert(
        &self,
        stream: FactStream,
        key: &SnapshotKey,
        date: DateId,
        attrs: &Attributes,
    ) -> Result<(), StoreFault> {
        let sql = insert_sql(stream);
        let mut q = bind_key(sqlx::query(&sql), stream, key)?.bind(date.0);
        for (column, kind) in stream.columns() {
            q = bind_attr(q, stream, column, *kind, attrs.get(column))?;
        }
        let res = q
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("insert", stream, e))?;
        debug!(table = stream.table(), %key, date = date.0, rows = res.rows_affected(), "snapshot inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_sql_keys_by_entity_and_exact_date() {
        assert_eq!(
            exists_sql(FactStream::WellTests),
            "select exists (select 1 from well_tests where well_id = $1 and well_test_date = $2)"
        );
        assert_eq!(
            exists_sql(FactStream::DailyGeneralComments),
            "select exists (select 1 from daily_general_comments where field_id = $1 and platform = $2 and report_date_id = $3)"
        );
    }

    #[test]
    fn latest_before_is_strictly_earlier_and_newest_first() {
        let sql = latest_before_sql(FactStream::WellDowntimeReasons);
        assert_eq!(
            sql,
            "select report_date_id, downtime_category, production_sub_skins_activity_id, comments \
             from well_downtime_reasons where well_id = $1 and report_date_id < $2 \
             order by report_date_id desc limit 1"
        );
    }

    #[test]
    fn insert_sql_placeholders_cover_every_column() {
        for stream in FactStream::ALL {
            let sql = insert_sql(stream);
            let n = stream.key_columns().len() + 1 + stream.columns().len();
            assert!(sql.contains(&format!("${n})")), "{sql}");
            assert!(!sql.contains(&format!("${}", n + 1)), "{sql}");
        }
        assert_eq!(
            insert_sql(FactStream::Flowmeters),
            "insert into flowmeters (platform_id, report_date_id, reading1, reading2, reading3, reading4, calibration_date) \
             values ($1, $2, $3, $4, $5, $6, $7)"
        );
    }

    #[test]
    fn schema_declares_every_stream_column() {
        let schema = include_str!("../migrations/0001_dpr_schema.sql");
        for stream in FactStream::ALL {
            let table = format!("create table if not exists {} (", stream.table());
            let start = schema.find(&table).unwrap_or_else(|| panic!("missing table {stream}"));
            let body = &schema[start..];
            let body = &body[..body.find(");").unwrap()];
            for (name, _) in stream.key_columns().iter().chain(stream.columns()) {
                assert!(body.contains(&format!("  {name} ")), "{stream}.{name}");
            }
            assert!(body.contains(&format!("  {} ", stream.date_column())), "{stream}");
        }
    }
}
