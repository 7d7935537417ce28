use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use dpr_reconcile::{DateId, DateIdResolver, StoreFault};

/// Looks report dates up in `report_dates`.
#[derive(Debug, Clone)]
pub struct PgDateIds {
    pool: PgPool,
}

impl PgDateIds {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DateIdResolver for PgDateIds {
    async fn date_id(&self, date: NaiveDate) -> Result<Option<DateId>, StoreFault> {
        let row: Option<(i64,)> = sqlx::query_as("select id from report_dates where report_date = $1")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreFault::Unavailable {
                op: "date_id",
                table: "report_dates",
                message: e.to_string(),
            })?;
        Ok(row.map(|(id,)| DateId(id)))
    }
}

/// Register every date in `[first, last]` that is not registered yet, in
/// ascending order. Returns the number of new rows.
///
/// Refuses to register dates earlier than the newest registered one, since
/// ids must keep growing with the date.
pub async fn register_report_dates(pool: &PgPool, first: NaiveDate, last: NaiveDate) -> Result<u64> {
    if first > last {
        return Err(anyhow!("first date {first} is after last date {last}"));
    }

    let (newest,): (Option<NaiveDate>,) = sqlx::query_as("select max(report_date) from report_dates")
        .fetch_one(pool)
        .await
        .context("register_report_dates max query failed")?;
    if let Some(newest) = newest {
        // the part of the range at or before `newest` must already be registered
        let head_end = last.min(newest);
        if first <= head_end {
            let (known,): (i64,) = sqlx::query_as(
                "select count(*)::bigint from report_dates where report_date between $1 and $2",
            )
            .bind(first)
            .bind(head_end)
            .fetch_one(pool)
            .await
            .context("register_report_dates coverage query failed")?;
            if known != (head_end - first).num_days() + 1 {
                return Err(anyhow!(
                    "cannot backfill report dates {first}..={head_end}: newest registered date is {newest}"
                ));
            }
        }
    }

    let res = sqlx::query(
        r#"
        insert into report_dates (report_date)
        select d::date
        from generate_series($1::date, $2::date, interval '1 day') as d
        where d::date > coalesce((select max(report_date) from report_dates), '-infinity'::date)
        order by d
        "#,
    )
    .bind(first)
    .bind(last)
    .execute(pool)
    .await
    .context("register_report_dates insert failed")?;

    Ok(res.rows_affected())
}
