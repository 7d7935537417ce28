//! dpr-db
//!
//! Postgres side of the engine: connection, embedded migrations, reference
//! data, report-date identifiers, and the fact-stream snapshot store.
//!
//! Architectural decisions:
//! - Plain `sqlx::query()` + binds everywhere (no compile-time macros), so
//!   the crate builds without a live database.
//! - Fact-stream SQL is generated from the stream column specs in
//!   `dpr-reconcile`; the schema in `migrations/` must agree with them.
//! - The snapshot store maps every driver error to `StoreFault`, which the
//!   report driver treats as fatal. Wiring helpers use `anyhow`.

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

mod dates;
mod reference;
mod snapshots;

pub use dates::{register_report_dates, PgDateIds};
pub use reference::load_reference_data;
pub use snapshots::{exists_sql, insert_sql, latest_before_sql, PgSnapshotStore};

pub use dpr_config::ENV_DB_URL;

/// Connect to Postgres using DPR_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

pub async fn connect(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='report_dates'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    let registered_dates = if exists {
        let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*)::bigint from report_dates")
            .fetch_one(pool)
            .await
            .context("status report_dates count failed")?;
        n
    } else {
        0
    };

    Ok(DbStatus {
        ok,
        has_report_dates_table: exists,
        registered_dates,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_report_dates_table: bool,
    pub registered_dates: i64,
}
