//! Saved-set command implementation
//!
//! Lists, adds, and removes proteins in the per-access-code saved set.

use chrono::Utc;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use sqlx::PgPool;
use tracing::debug;

use crate::commands::{connect, truncate_string};
use crate::db::proteins::{PgProteinStore, ProteinStore};
use crate::db::{access, saved as saved_db};
use crate::error::{CliError, Result};
use crate::saved::{merge_entries, remove_entries};
use crate::SavedCommand;

/// Run a saved-set subcommand
pub async fn run(code: String, command: SavedCommand, database_url: Option<String>) -> Result<()> {
    let pool = connect(database_url.as_deref()).await?;
    let code = authorize(&pool, &code).await?;

    match command {
        SavedCommand::List => list(&pool, &code).await,
        SavedCommand::Add { ids } => add(&pool, &code, &ids).await,
        SavedCommand::Remove { ids } => remove(&pool, &code, &ids).await,
    }
}

/// Validate the code format locally, then against the lookup table.
async fn authorize(pool: &PgPool, code: &str) -> Result<String> {
    let code = code.trim().to_string();
    if !access::is_well_formed(&code) {
        return Err(CliError::access_denied("codes are exactly 6 digits"));
    }
    if !access::verify_code(pool, &code).await? {
        return Err(CliError::access_denied("code not recognized"));
    }
    Ok(code)
}

async fn list(pool: &PgPool, code: &str) -> Result<()> {
    let entries = saved_db::fetch_saved(pool, code).await?;

    if entries.is_empty() {
        println!("No saved proteins");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Accession", "Name", "Organism", "Saved"]);

    for entry in &entries {
        table.add_row(vec![
            entry.id.to_string(),
            entry.accession.clone(),
            truncate_string(&entry.name, 50),
            truncate_string(&entry.organism, 40),
            entry.saved_date.format("%Y-%m-%d").to_string(),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!("{} saved proteins", entries.len());

    Ok(())
}

async fn add(pool: &PgPool, code: &str, ids: &[i64]) -> Result<()> {
    let store = PgProteinStore::new(pool.clone());
    let now = Utc::now();

    // Fetch one at a time; the saved set stays small in practice
    let mut incoming = Vec::with_capacity(ids.len());
    for &id in ids {
        match store.fetch_by_id(id).await? {
            Some(record) => incoming.push(record.to_saved(now)),
            None => return Err(CliError::ProteinNotFound(id)),
        }
    }

    let existing = saved_db::fetch_saved(pool, code).await?;
    let before = existing.len();
    let merged = merge_entries(existing, incoming);
    let added = merged.len() - before;

    saved_db::write_saved(pool, code, &merged).await?;

    debug!(added = added, total = merged.len(), "Saved set updated");
    println!(
        "{} Added {} proteins ({} already saved), {} total",
        "✓".green(),
        added,
        ids.len() - added,
        merged.len()
    );

    Ok(())
}

async fn remove(pool: &PgPool, code: &str, ids: &[i64]) -> Result<()> {
    let existing = saved_db::fetch_saved(pool, code).await?;
    let before = existing.len();
    let remaining = remove_entries(existing, ids);
    let removed = before - remaining.len();

    saved_db::write_saved(pool, code, &remaining).await?;

    debug!(removed = removed, total = remaining.len(), "Saved set updated");
    println!(
        "{} Removed {} proteins, {} remaining",
        "✓".green(),
        removed,
        remaining.len()
    );

    Ok(())
}
