//! Access-code gate.
//!
//! The dashboard is gated by a shared 6-digit numeric code held in the
//! `access_codes` lookup table. Format violations are rejected locally,
//! before any database call.

use sqlx::PgPool;
use tracing::debug;

use super::DbResult;

/// Required access-code length.
pub const ACCESS_CODE_LEN: usize = 6;

/// Whether the string is exactly six ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == ACCESS_CODE_LEN && code.chars().all(|c| c.is_ascii_digit())
}

/// Check a well-formed code against the lookup table.
///
/// Callers should reject malformed codes with [`is_well_formed`] first; a
/// malformed code passed here simply returns `false` from the lookup.
pub async fn verify_code(pool: &PgPool, code: &str) -> DbResult<bool> {
    let valid: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM access_codes WHERE code = $1)")
            .bind(code)
            .fetch_one(pool)
            .await?;

    debug!(valid = valid, "Access code checked");
    Ok(valid)
}
