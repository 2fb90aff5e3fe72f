//! Database operations for the protein table.
//!
//! Translates [`SearchFilter`] and [`SequenceQuery`] values into constrained
//! queries against the hosted database. The count query and the data query
//! are built from the same condition set so their results stay consistent,
//! and every listing is ordered by the primary identifier ascending so
//! pagination is stable across repeated calls.

use async_trait::async_trait;
use pdx_common::types::ProteinRecord;
use sqlx::PgPool;

use super::DbResult;
use crate::search::{MatchMode, SearchFilter, SequenceQuery};

const SELECT_COLUMNS: &str =
    "SELECT id, accession, name, organism, domains, sequence, length FROM proteins";

/// Read access to the protein table.
///
/// The search service is written against this trait so its cache, retry, and
/// count-degradation logic can be exercised with an in-memory fake.
#[async_trait]
pub trait ProteinStore: Send + Sync + 'static {
    /// Fetch a window of filtered records, ordered by id ascending.
    async fn fetch_filtered(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ProteinRecord>>;

    /// Count rows matching the identical filter.
    async fn count_filtered(&self, filter: &SearchFilter) -> DbResult<i64>;

    /// Fetch a window of sequence-matched records, ordered by id ascending.
    async fn fetch_by_sequence(
        &self,
        query: &SequenceQuery,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ProteinRecord>>;

    /// Count rows matching the identical sequence query.
    async fn count_by_sequence(&self, query: &SequenceQuery) -> DbResult<i64>;

    /// Fetch one record by primary identifier.
    async fn fetch_by_id(&self, id: i64) -> DbResult<Option<ProteinRecord>>;
}

/// Postgres-backed [`ProteinStore`].
#[derive(Clone)]
pub struct PgProteinStore {
    pool: PgPool,
}

impl PgProteinStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE`/`ILIKE` metacharacters so user input matches literally
/// instead of acting as a wildcard.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// WHERE clause plus its bind values, shared between count and data queries.
fn filter_conditions(filter: &SearchFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    // name/organism match case-insensitively, domain case-sensitively
    if let Some(ref name) = filter.name {
        conditions.push(format!("name ILIKE ${}", binds.len() + 1));
        binds.push(format!("%{}%", escape_like(name)));
    }
    if let Some(ref organism) = filter.organism {
        conditions.push(format!("organism ILIKE ${}", binds.len() + 1));
        binds.push(format!("%{}%", escape_like(organism)));
    }
    if let Some(ref domain) = filter.domain {
        conditions.push(format!("domains LIKE ${}", binds.len() + 1));
        binds.push(format!("%{}%", escape_like(domain)));
    }

    (conditions.join(" AND "), binds)
}

/// WHERE clause plus bind value for a sequence query.
fn sequence_condition(query: &SequenceQuery) -> (String, String) {
    match query.mode {
        MatchMode::Exact => ("sequence = $1".to_string(), query.sequence.clone()),
        MatchMode::Prefix => (
            "sequence LIKE $1".to_string(),
            format!("{}%", escape_like(&query.sequence)),
        ),
        MatchMode::Contains => (
            "sequence LIKE $1".to_string(),
            format!("%{}%", escape_like(&query.sequence)),
        ),
    }
}

#[async_trait]
impl ProteinStore for PgProteinStore {
    async fn fetch_filtered(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ProteinRecord>> {
        let (where_clause, binds) = filter_conditions(filter);

        let sql = format!(
            "{} WHERE {} ORDER BY id ASC LIMIT ${} OFFSET ${}",
            SELECT_COLUMNS,
            where_clause,
            binds.len() + 1,
            binds.len() + 2
        );

        let mut query = sqlx::query_as::<_, ProteinRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        query = query.bind(limit).bind(offset);

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ProteinRecord::from).collect())
    }

    async fn count_filtered(&self, filter: &SearchFilter) -> DbResult<i64> {
        let (where_clause, binds) = filter_conditions(filter);
        let sql = format!("SELECT COUNT(*) FROM proteins WHERE {}", where_clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        let count = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn fetch_by_sequence(
        &self,
        seq_query: &SequenceQuery,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ProteinRecord>> {
        let (condition, bind) = sequence_condition(seq_query);
        let sql = format!(
            "{} WHERE {} ORDER BY id ASC LIMIT $2 OFFSET $3",
            SELECT_COLUMNS, condition
        );

        let rows = sqlx::query_as::<_, ProteinRow>(&sql)
            .bind(&bind)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ProteinRecord::from).collect())
    }

    async fn count_by_sequence(&self, seq_query: &SequenceQuery) -> DbResult<i64> {
        let (condition, bind) = sequence_condition(seq_query);
        let sql = format!("SELECT COUNT(*) FROM proteins WHERE {}", condition);

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(&bind)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch_by_id(&self, id: i64) -> DbResult<Option<ProteinRecord>> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query_as::<_, ProteinRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProteinRecord::from))
    }
}

/// Internal row type for protein queries.
#[derive(Debug, sqlx::FromRow)]
struct ProteinRow {
    id: i64,
    accession: String,
    name: String,
    organism: String,
    domains: Option<String>,
    sequence: String,
    length: i32,
}

impl From<ProteinRow> for ProteinRecord {
    fn from(row: ProteinRow) -> Self {
        ProteinRecord {
            id: row.id,
            accession: row.accession,
            name: row.name,
            organism: row.organism,
            domains: row.domains,
            sequence: row.sequence,
            length: row.length,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conditions_single_field() {
        let filter = SearchFilter::new(Some("kinase".to_string()), None, None);
        let (clause, binds) = filter_conditions(&filter);
        assert_eq!(clause, "name ILIKE $1");
        assert_eq!(binds, vec!["%kinase%"]);
    }

    #[test]
    fn test_filter_conditions_combined_with_and() {
        let filter = SearchFilter::new(
            Some("kinase".to_string()),
            Some("human".to_string()),
            Some("PF00069".to_string()),
        );
        let (clause, binds) = filter_conditions(&filter);
        assert_eq!(
            clause,
            "name ILIKE $1 AND organism ILIKE $2 AND domains LIKE $3"
        );
        assert_eq!(binds, vec!["%kinase%", "%human%", "%PF00069%"]);
    }

    #[test]
    fn test_domain_filter_is_case_sensitive() {
        let filter = SearchFilter::new(None, None, Some("PF03245".to_string()));
        let (clause, _) = filter_conditions(&filter);
        assert_eq!(clause, "domains LIKE $1");
        assert!(!clause.contains("ILIKE"));
    }

    #[test]
    fn test_like_metacharacters_match_literally() {
        let filter = SearchFilter::new(Some("100% kinase_x".to_string()), None, None);
        let (_, binds) = filter_conditions(&filter);
        assert_eq!(binds, vec![r"%100\% kinase\_x%"]);

        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_sequence_condition_modes() {
        let exact = SequenceQuery::new("MALW", MatchMode::Exact).unwrap();
        assert_eq!(
            sequence_condition(&exact),
            ("sequence = $1".to_string(), "MALW".to_string())
        );

        let prefix = SequenceQuery::new("MALW", MatchMode::Prefix).unwrap();
        assert_eq!(
            sequence_condition(&prefix),
            ("sequence LIKE $1".to_string(), "MALW%".to_string())
        );

        let contains = SequenceQuery::new("MALW", MatchMode::Contains).unwrap();
        assert_eq!(
            sequence_condition(&contains),
            ("sequence LIKE $1".to_string(), "%MALW%".to_string())
        );
    }

    #[test]
    fn test_count_and_data_share_conditions() {
        // Both queries are built from filter_conditions, so a drift between
        // count and data filters would have to break this assertion first.
        let filter = SearchFilter::new(Some("insulin".to_string()), None, None);
        let (data_clause, data_binds) = filter_conditions(&filter);
        let (count_clause, count_binds) = filter_conditions(&filter);
        assert_eq!(data_clause, count_clause);
        assert_eq!(data_binds, count_binds);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_fetch_filtered_against_database() {
        // Covered by integration runs with a seeded proteins table
    }
}
