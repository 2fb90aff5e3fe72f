//! Search filters, sequence queries, and result pages.
//!
//! Validation happens here, before any database call: a filter that fails
//! its minimum-length rule is rejected locally and never retried.

use clap::ValueEnum;
use pdx_common::types::{PageRequest, ProteinRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod service;

/// Minimum length for `name` and `organism` filter terms.
pub const MIN_FILTER_LEN: usize = 3;

/// Minimum length for a sequence search term.
pub const MIN_SEQUENCE_LEN: usize = 3;

/// Ceiling for contains-mode sequence searches; longer inputs are truncated
/// and the result is flagged so the caller can warn the user.
pub const CONTAINS_CEILING: usize = 100;

/// Validation failures, rejected before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one filter is required (name, organism, or domain)")]
    EmptyFilter,

    #[error("filter '{field}' must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("sequence must be at least {min} characters")]
    SequenceTooShort { min: usize },
}

/// Transient filter set for a protein listing search.
///
/// Each field is optional; present fields are combined with AND. `name` and
/// `organism` match case-insensitively, `domain` case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub name: Option<String>,
    pub organism: Option<String>,
    pub domain: Option<String>,
}

impl SearchFilter {
    /// Build a filter from raw CLI input, dropping blank fields.
    pub fn new(
        name: Option<String>,
        organism: Option<String>,
        domain: Option<String>,
    ) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            name: clean(name),
            organism: clean(organism),
            domain: clean(domain),
        }
    }

    /// Check the minimum-length rules.
    ///
    /// At least one field must be usable: `name`/`organism` with ≥ 3
    /// characters, or a non-empty `domain`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            if name.chars().count() < MIN_FILTER_LEN {
                return Err(ValidationError::TooShort {
                    field: "name",
                    min: MIN_FILTER_LEN,
                });
            }
        }
        if let Some(ref organism) = self.organism {
            if organism.chars().count() < MIN_FILTER_LEN {
                return Err(ValidationError::TooShort {
                    field: "organism",
                    min: MIN_FILTER_LEN,
                });
            }
        }
        if self.name.is_none() && self.organism.is_none() && self.domain.is_none() {
            return Err(ValidationError::EmptyFilter);
        }
        Ok(())
    }

    /// Stable serialization used for cache keys and new-search detection.
    pub fn signature(&self) -> String {
        format!(
            "name={}|organism={}|domain={}",
            self.name.as_deref().unwrap_or(""),
            self.organism.as_deref().unwrap_or(""),
            self.domain.as_deref().unwrap_or("")
        )
    }
}

/// How a sequence search term is matched against the sequence column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact equality
    Exact,
    /// Starts-with
    #[default]
    Prefix,
    /// Substring anywhere in the sequence
    Contains,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Prefix => write!(f, "prefix"),
            MatchMode::Contains => write!(f, "contains"),
        }
    }
}

/// A validated sequence search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceQuery {
    pub sequence: String,
    pub mode: MatchMode,
    /// Set when contains-mode input exceeded [`CONTAINS_CEILING`] and was cut
    pub truncated: bool,
}

impl SequenceQuery {
    /// Normalize and validate a raw sequence term.
    ///
    /// Whitespace is stripped and the term upper-cased (amino-acid codes are
    /// case-insensitive in practice). Contains-mode terms longer than the
    /// ceiling are truncated and flagged.
    pub fn new(raw: &str, mode: MatchMode) -> Result<Self, ValidationError> {
        let mut sequence: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if sequence.chars().count() < MIN_SEQUENCE_LEN {
            return Err(ValidationError::SequenceTooShort {
                min: MIN_SEQUENCE_LEN,
            });
        }

        // Count in chars and cut at a boundary; the term is not guaranteed
        // to be ASCII
        let mut truncated = false;
        if mode == MatchMode::Contains {
            if let Some((cut, _)) = sequence.char_indices().nth(CONTAINS_CEILING) {
                sequence.truncate(cut);
                truncated = true;
            }
        }

        Ok(Self {
            sequence,
            mode,
            truncated,
        })
    }

    /// Stable serialization used for cache keys and new-search detection.
    pub fn signature(&self) -> String {
        format!("seq={}|mode={}", self.sequence, self.mode)
    }
}

/// Count information attached to a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountOutcome {
    /// Count query succeeded; total pages derivable
    Exact { total: i64, total_pages: i64 },
    /// Count query timed out; probe tells us only whether more rows exist
    Degraded { has_more: bool },
}

/// One page of search results with its count outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub records: Vec<ProteinRecord>,
    pub page: i64,
    pub page_size: i64,
    pub count: CountOutcome,
    /// Contains-mode input was truncated to the ceiling before querying
    pub truncated: bool,
}

impl SearchPage {
    pub fn counted(records: Vec<ProteinRecord>, request: PageRequest, total: i64) -> Self {
        Self {
            records,
            page: request.page,
            page_size: request.page_size,
            count: CountOutcome::Exact {
                total,
                total_pages: request.total_pages(total),
            },
            truncated: false,
        }
    }

    pub fn probed(records: Vec<ProteinRecord>, request: PageRequest, has_more: bool) -> Self {
        Self {
            records,
            page: request.page,
            page_size: request.page_size,
            count: CountOutcome::Degraded { has_more },
            truncated: false,
        }
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
