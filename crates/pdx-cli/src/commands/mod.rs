//! Command implementations for the PDX CLI

pub mod access;
pub mod export;
pub mod saved;
pub mod search;
pub mod sequence;
pub mod show;

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use sqlx::PgPool;

use crate::db::proteins::PgProteinStore;
use crate::db::{self, DbConfig};
use crate::error::Result;
use crate::search::service::SearchService;
use crate::search::{CountOutcome, SearchPage};
use crate::OutputFormat;

/// Connect to the protein database.
///
/// An explicit `--database-url` wins over environment configuration.
pub(crate) async fn connect(database_url: Option<&str>) -> Result<PgPool> {
    let config = match database_url {
        Some(url) => DbConfig::default().with_url(url),
        None => DbConfig::from_env()?,
    };
    let pool = db::create_pool(&config).await?;
    Ok(pool)
}

/// Build a search service over the live database.
pub(crate) async fn service(database_url: Option<&str>) -> Result<SearchService<PgProteinStore>> {
    let pool = connect(database_url).await?;
    Ok(SearchService::new(PgProteinStore::new(pool)))
}

/// Display a result page in the requested format.
pub(crate) fn display_page(page: &SearchPage, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => display_table(page),
        OutputFormat::Json => display_json(page),
        OutputFormat::Compact => display_compact(page),
    }
}

fn display_table(page: &SearchPage) -> Result<()> {
    if page.records.is_empty() {
        println!("{}", "No results found".bold().red());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Accession", "Name", "Organism", "Length"]);

    for record in &page.records {
        table.add_row(vec![
            record.id.to_string(),
            record.accession.clone(),
            truncate_string(&record.name, 50),
            truncate_string(&record.organism, 40),
            record.length.to_string(),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    match page.count {
        CountOutcome::Exact { total, total_pages } => {
            println!(
                "Showing {} of {} results (page {}/{})",
                page.records.len(),
                total,
                page.page,
                total_pages
            );
        }
        CountOutcome::Degraded { has_more } => {
            println!(
                "Showing {} results (page {})",
                page.records.len(),
                page.page
            );
            if has_more {
                println!("{}", "More results available on the next page".yellow());
            } else {
                println!("End of results");
            }
        }
    }

    if page.truncated {
        println!(
            "{}",
            "Note: the sequence term was shortened for contains matching".yellow()
        );
    }

    Ok(())
}

fn display_json(page: &SearchPage) -> Result<()> {
    let json = serde_json::to_string_pretty(page)?;
    println!("{json}");
    Ok(())
}

fn display_compact(page: &SearchPage) -> Result<()> {
    for record in &page.records {
        println!("{}\t{}\t{}", record.id, record.accession, record.name);
    }
    Ok(())
}

/// Truncate a string to a maximum length with ellipsis
pub(crate) fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
