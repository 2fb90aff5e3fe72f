//! Saved-set persistence.
//!
//! One row per access code in the `saved_sets` table, holding a JSON array
//! of denormalized protein snapshots. A missing row reads as an empty set;
//! writes are last-write-wins upserts (the accepted concurrency limitation
//! of this storage shape).

use pdx_common::types::SavedProtein;
use sqlx::PgPool;
use tracing::debug;

use super::DbResult;

/// Read the saved set for an access code; missing row means empty.
pub async fn fetch_saved(pool: &PgPool, access_code: &str) -> DbResult<Vec<SavedProtein>> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT entries FROM saved_sets WHERE access_code = $1")
            .bind(access_code)
            .fetch_optional(pool)
            .await?;

    match row {
        None => Ok(Vec::new()),
        Some((entries,)) => {
            let entries: Vec<SavedProtein> = serde_json::from_value(entries)?;
            debug!(count = entries.len(), "Loaded saved set");
            Ok(entries)
        }
    }
}

/// Write the full saved set for an access code, creating the row if needed.
pub async fn write_saved(
    pool: &PgPool,
    access_code: &str,
    entries: &[SavedProtein],
) -> DbResult<()> {
    let payload = serde_json::to_value(entries)?;

    sqlx::query(
        r#"
        INSERT INTO saved_sets (access_code, entries, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (access_code)
        DO UPDATE SET entries = EXCLUDED.entries, updated_at = NOW()
        "#,
    )
    .bind(access_code)
    .bind(payload)
    .execute(pool)
    .await?;

    debug!(count = entries.len(), "Wrote saved set");
    Ok(())
}
