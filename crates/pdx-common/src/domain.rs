//! Typed parser for protein domain-header strings.
//!
//! UniProt-style exports encode domain annotations as
//! `CODE(start...end[,start...end,...])`, optionally several annotations per
//! header. Examples seen in real data:
//!
//! - `PF03245(27...149)`: one domain, one range
//! - `PF00704(34...320,355...427)`: one domain, two ranges
//!
//! Parsing never fails: anything the grammar does not cover is carried
//! through verbatim as [`DomainHeader::Unparsed`] so callers can still
//! display the raw string.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single `start...end` span within a domain annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRange {
    /// 1-based start position in the sequence
    pub start: u32,
    /// 1-based end position (inclusive)
    pub end: u32,
}

impl DomainRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of residues covered by this range.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl std::fmt::Display for DomainRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...{}", self.start, self.end)
    }
}

/// One domain annotation: a code plus the ranges it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAnnotation {
    /// Domain identifier (e.g. a Pfam accession like `PF03245`)
    pub code: String,
    /// One or more covered ranges, in header order
    pub ranges: Vec<DomainRange>,
}

impl std::fmt::Display for DomainAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ranges: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}({})", self.code, ranges.join(","))
    }
}

/// Parsed form of a domain header string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainHeader {
    /// Exactly one annotation covering exactly one range
    Single(DomainAnnotation),
    /// Multiple ranges and/or multiple annotations
    Multi(Vec<DomainAnnotation>),
    /// Header did not match the grammar; raw text preserved
    Unparsed(String),
}

// The pattern is a literal and cannot fail to compile.
#[allow(clippy::unwrap_used)]
fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // code, then a parenthesized comma-separated list of start...end spans
        Regex::new(r"([A-Za-z][A-Za-z0-9_.-]*)\((\d+\.\.\.\d+(?:,\d+\.\.\.\d+)*)\)").unwrap()
    })
}

impl DomainHeader {
    /// Parse a raw header string into its typed form.
    pub fn parse(header: &str) -> Self {
        let mut annotations = Vec::new();

        for caps in annotation_re().captures_iter(header) {
            let code = caps[1].to_string();
            let mut ranges = Vec::new();
            for span in caps[2].split(',') {
                let Some((start, end)) = span.split_once("...") else {
                    continue;
                };
                match (start.parse::<u32>(), end.parse::<u32>()) {
                    (Ok(start), Ok(end)) => ranges.push(DomainRange::new(start, end)),
                    _ => continue,
                }
            }
            if !ranges.is_empty() {
                annotations.push(DomainAnnotation { code, ranges });
            }
        }

        match annotations.len() {
            0 => DomainHeader::Unparsed(header.to_string()),
            1 if annotations[0].ranges.len() == 1 => {
                DomainHeader::Single(annotations.remove(0))
            }
            _ => DomainHeader::Multi(annotations),
        }
    }

    /// All parsed annotations; empty for [`DomainHeader::Unparsed`].
    pub fn annotations(&self) -> &[DomainAnnotation] {
        match self {
            DomainHeader::Single(a) => std::slice::from_ref(a),
            DomainHeader::Multi(list) => list,
            DomainHeader::Unparsed(_) => &[],
        }
    }

    /// Whether the header matched the grammar.
    pub fn is_parsed(&self) -> bool {
        !matches!(self, DomainHeader::Unparsed(_))
    }
}

impl std::fmt::Display for DomainHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainHeader::Single(a) => write!(f, "{}", a),
            DomainHeader::Multi(list) => {
                let parts: Vec<String> = list.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", parts.join(";"))
            }
            DomainHeader::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}
