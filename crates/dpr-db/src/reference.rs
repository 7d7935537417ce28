use anyhow::{Context, Result};
use sqlx::PgPool;

use dpr_extract::{NamedRow, PlatformRow, ReferenceData, WellRow};

async fn named_rows(pool: &PgPool, table: &str) -> Result<Vec<NamedRow>> {
    let sql = format!("select id, name from {table} order by id");
    let rows: Vec<(i64, String)> = sqlx::query_as(&sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("load {table} failed"))?;
    Ok(rows.into_iter().map(|(id, name)| NamedRow { id, name }).collect())
}

/// Load all lookup tables. Read once at run start.
pub async fn load_reference_data(pool: &PgPool) -> Result<ReferenceData> {
    let platforms: Vec<(i64, String, i64, Option<String>)> =
        sqlx::query_as("select id, name, field_id, square from platforms order by id")
            .fetch_all(pool)
            .await
            .context("load platforms failed")?;
    let wells: Vec<(i64, String, i64)> =
        sqlx::query_as("select id, name, platform_id from wells order by id")
            .fetch_all(pool)
            .await
            .context("load wells failed")?;

    Ok(ReferenceData {
        fields: named_rows(pool, "fields").await?,
        platforms: platforms
            .into_iter()
            .map(|(id, name, field_id, square)| PlatformRow {
                id,
                name,
                field_id,
                square,
            })
            .collect(),
        wells: wells
            .into_iter()
            .map(|(id, name, platform_id)| WellRow { id, name, platform_id })
            .collect(),
        well_stock_categories: named_rows(pool, "well_stock_categories").await?,
        production_sub_categories: named_rows(pool, "production_well_stock_sub_categories").await?,
        production_methods: named_rows(pool, "production_methods").await?,
        horizons: named_rows(pool, "horizons").await?,
        sub_skin_activities: named_rows(pool, "production_sub_skins_activities").await?,
    })
}
