//! Show command implementation
//!
//! Detail view for a single protein, including parsed domain annotations.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use pdx_common::domain::DomainHeader;
use pdx_common::types::ProteinRecord;

use crate::commands::service;
use crate::error::Result;

/// Residues per sequence line in the detail view.
const SEQUENCE_LINE_WIDTH: usize = 60;

/// Run the show command
pub async fn run(id: i64, database_url: Option<String>) -> Result<()> {
    let service = service(database_url.as_deref()).await?;

    let Some(record) = service.fetch_protein(id).await? else {
        println!("{}", format!("Protein {id} not found").bold().red());
        return Ok(());
    };

    display_detail(&record);
    Ok(())
}

fn display_detail(record: &ProteinRecord) {
    println!();
    println!("{}", format!("  {}", record.name).bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);

    table.add_row(vec!["ID", &record.id.to_string()]);
    table.add_row(vec!["Accession", &record.accession]);
    table.add_row(vec!["Name", &record.name]);
    table.add_row(vec!["Organism", &record.organism]);
    table.add_row(vec!["Length", &format!("{} aa", record.length)]);

    println!("{table}");

    println!();
    println!("{}", "Domains".bold());
    match &record.domains {
        None => println!("  (none annotated)"),
        Some(raw) => display_domains(raw),
    }

    println!();
    println!("{}", "Sequence".bold());
    for chunk in sequence_lines(&record.sequence) {
        println!("  {chunk}");
    }
    println!();
}

fn display_domains(raw: &str) {
    match DomainHeader::parse(raw) {
        DomainHeader::Unparsed(text) => println!("  {text}"),
        header => {
            for annotation in header.annotations() {
                let ranges: Vec<String> = annotation
                    .ranges
                    .iter()
                    .map(|r| format!("{}...{} ({} aa)", r.start, r.end, r.len()))
                    .collect();
                println!("  {}  {}", annotation.code.cyan(), ranges.join(", "));
            }
        }
    }
}

fn sequence_lines(sequence: &str) -> Vec<String> {
    sequence
        .as_bytes()
        .chunks(SEQUENCE_LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}
