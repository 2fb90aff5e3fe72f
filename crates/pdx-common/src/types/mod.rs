//! Common types used across PDX

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size for general protein listings.
pub const LIST_PAGE_SIZE: i64 = 50;

/// Page size for sequence searches.
pub const SEQUENCE_PAGE_SIZE: i64 = 20;

/// A protein record as stored in the external database.
///
/// Records are owned and persisted entirely by the external database; the
/// client never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    /// Primary identifier
    pub id: i64,

    /// Accession number (e.g. "P01308")
    pub accession: String,

    /// Protein name
    pub name: String,

    /// Organism name
    pub organism: String,

    /// Raw domain header, e.g. `PF03245(27...149)`
    pub domains: Option<String>,

    /// Amino-acid sequence
    pub sequence: String,

    /// Sequence length in residues
    pub length: i32,
}

impl ProteinRecord {
    /// Denormalized snapshot for the saved-set table.
    pub fn to_saved(&self, saved_date: DateTime<Utc>) -> SavedProtein {
        SavedProtein {
            id: self.id,
            accession: self.accession.clone(),
            name: self.name.clone(),
            organism: self.organism.clone(),
            domains: self.domains.clone(),
            length: self.length,
            saved_date,
        }
    }
}

/// Denormalized protein snapshot stored in a saved set.
///
/// One saved-set row per access code holds a JSON array of these. No
/// relational integrity is enforced beyond application logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProtein {
    pub id: i64,
    pub accession: String,
    pub name: String,
    pub organism: String,
    pub domains: Option<String>,
    pub length: i32,
    pub saved_date: DateTime<Utc>,
}

/// Pagination parameters for list queries.
///
/// Pages are 1-indexed; the offset is derived for SQL `LIMIT`/`OFFSET`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: i64,

    /// Items per page
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    /// Page of the general listing (50 rows).
    pub fn listing(page: i64) -> Self {
        Self::new(page, LIST_PAGE_SIZE)
    }

    /// Page of a sequence search (20 rows).
    pub fn sequence(page: i64) -> Self {
        Self::new(page, SEQUENCE_PAGE_SIZE)
    }

    /// Offset for the SQL OFFSET clause.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Total pages for a given row count.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total == 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offsets() {
        assert_eq!(PageRequest::listing(1).offset(), 0);
        assert_eq!(PageRequest::listing(3).offset(), 100);
        assert_eq!(PageRequest::sequence(2).offset(), 20);
    }

    #[test]
    fn test_page_request_clamps_page() {
        assert_eq!(PageRequest::listing(0).page, 1);
        assert_eq!(PageRequest::listing(-5).page, 1);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let page = PageRequest::listing(1);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(50), 1);
        assert_eq!(page.total_pages(51), 2);
        assert_eq!(page.total_pages(2_000_000), 40_000);
    }

    #[test]
    fn test_to_saved_snapshot() {
        let record = ProteinRecord {
            id: 7,
            accession: "P01308".to_string(),
            name: "Insulin".to_string(),
            organism: "Homo sapiens".to_string(),
            domains: Some("PF03245(27...149)".to_string()),
            sequence: "MALWMRLLPLLALLALWGPDPAAA".to_string(),
            length: 24,
        };
        let saved = record.to_saved(Utc::now());
        assert_eq!(saved.id, 7);
        assert_eq!(saved.accession, "P01308");
        assert_eq!(saved.length, 24);
    }
}
