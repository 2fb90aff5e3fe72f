//! Sequence search command implementation

use colored::Colorize;
use tracing::debug;

use crate::commands::{display_page, service};
use crate::error::Result;
use crate::search::{MatchMode, SequenceQuery};
use crate::OutputFormat;

/// Run the sequence search command
pub async fn run(
    sequence: String,
    mode: MatchMode,
    page: i64,
    format: OutputFormat,
    database_url: Option<String>,
) -> Result<()> {
    let query = SequenceQuery::new(&sequence, mode)?;

    if query.truncated {
        eprintln!(
            "{}",
            format!(
                "Warning: contains matching is limited to {} residues; the term was shortened",
                crate::search::CONTAINS_CEILING
            )
            .yellow()
        );
    }

    debug!(mode = ?mode, residues = query.sequence.len(), page = page, "Starting sequence search");

    let service = service(database_url.as_deref()).await?;
    let results = service.sequence_search(&query, page).await?;
    display_page(&results, format)
}
