//! Search command implementation
//!
//! Filtered protein listing over name, organism, and domain.

use colored::Colorize;
use tracing::debug;

use crate::commands::{display_page, service};
use crate::error::Result;
use crate::search::SearchFilter;
use crate::OutputFormat;

/// Run the search command
#[allow(clippy::too_many_arguments)]
pub async fn run(
    name: Option<String>,
    organism: Option<String>,
    domain: Option<String>,
    page: i64,
    fresh: bool,
    defer_count: bool,
    format: OutputFormat,
    database_url: Option<String>,
) -> Result<()> {
    let filter = SearchFilter::new(name, organism, domain);

    debug!(filter = ?filter, page = page, fresh = fresh, "Starting protein search");

    let service = service(database_url.as_deref()).await?;
    if fresh {
        service.clear_cache();
    }

    if defer_count {
        // Page first, exact total backfilled once the count lands
        let (results, pending_total) = service.search_deferred_count(&filter, page).await?;
        display_page(&results, format)?;

        match pending_total.await {
            Ok(Some(total)) => println!("Exact total: {total} results"),
            _ => println!("{}", "Exact total unavailable".yellow()),
        }
        return Ok(());
    }

    let results = service.search(&filter, page).await?;
    display_page(&results, format)
}
