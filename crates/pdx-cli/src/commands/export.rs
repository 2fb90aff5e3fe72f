//! Export command implementation
//!
//! Runs a filtered search and writes the result page as RFC 4180 CSV.

use colored::Colorize;
use tracing::debug;

use crate::commands::service;
use crate::error::Result;
use crate::export::write_csv;
use crate::search::SearchFilter;

/// Run the export command
pub async fn run(
    name: Option<String>,
    organism: Option<String>,
    domain: Option<String>,
    page: i64,
    output: Option<std::path::PathBuf>,
    database_url: Option<String>,
) -> Result<()> {
    let filter = SearchFilter::new(name, organism, domain);

    debug!(filter = ?filter, page = page, "Exporting search results");

    let service = service(database_url.as_deref()).await?;
    let results = service.search(&filter, page).await?;

    if results.records.is_empty() {
        println!("{}", "No results to export".bold().red());
        return Ok(());
    }

    let path = write_csv(&results.records, output.as_deref())?;
    println!(
        "{} Exported {} proteins to {}",
        "✓".green(),
        results.records.len(),
        path.display().to_string().cyan()
    );

    Ok(())
}
