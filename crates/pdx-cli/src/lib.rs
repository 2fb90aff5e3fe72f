//! PDX CLI Library
//!
//! Command-line client for exploring a hosted protein database.
//!
//! # Overview
//!
//! The PDX CLI is a thin client over the external database; it owns no
//! storage of its own:
//!
//! - **Search**: filter proteins by name, organism, or domain (`pdx search`)
//! - **Sequence Search**: exact/prefix/contains matching (`pdx sequence`)
//! - **Detail View**: one protein with parsed domains (`pdx show`)
//! - **Export**: flatten results to CSV (`pdx export`)
//! - **Saved Sets**: per access code collections (`pdx saved`)
//! - **Access Gate**: validate a 6-digit code (`pdx access`)

pub mod cache;
pub mod commands;
pub mod db;
pub mod error;
pub mod export;
pub mod retry;
pub mod saved;
pub mod search;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand, ValueEnum};

use search::MatchMode;

/// PDX - Protein Data Explorer
#[derive(Parser, Debug)]
#[command(name = "pdx")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

/// Output format for result listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON document
    Json,
    /// One `id<TAB>accession<TAB>name` line per record
    Compact,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search proteins by name, organism, and/or domain
    Search {
        /// Filter by protein name (case-insensitive substring, min 3 chars)
        #[arg(short, long)]
        name: Option<String>,

        /// Filter by organism (case-insensitive substring, min 3 chars)
        #[arg(short, long)]
        organism: Option<String>,

        /// Filter by domain code (case-sensitive substring)
        #[arg(short, long)]
        domain: Option<String>,

        /// Page number (50 results per page)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Clear the result cache before searching
        #[arg(long)]
        fresh: bool,

        /// Show the page immediately and backfill the exact total afterwards
        #[arg(long)]
        defer_count: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Search proteins by amino-acid sequence
    Sequence {
        /// Sequence term (min 3 residues)
        sequence: String,

        /// Match mode
        #[arg(short, long, value_enum, default_value_t = MatchMode::Prefix)]
        mode: MatchMode,

        /// Page number (20 results per page)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show one protein in detail
    Show {
        /// Protein id
        id: i64,
    },

    /// Export search results to CSV
    Export {
        /// Filter by protein name (case-insensitive substring, min 3 chars)
        #[arg(short, long)]
        name: Option<String>,

        /// Filter by organism (case-insensitive substring, min 3 chars)
        #[arg(short, long)]
        organism: Option<String>,

        /// Filter by domain code (case-sensitive substring)
        #[arg(short, long)]
        domain: Option<String>,

        /// Page to export (50 results per page)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Output file (defaults to proteins-<timestamp>.csv)
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },

    /// Manage the saved protein set for an access code
    Saved {
        /// 6-digit access code
        #[arg(short, long)]
        code: String,

        #[command(subcommand)]
        command: SavedCommand,
    },

    /// Verify an access code against the lookup table
    Access {
        /// 6-digit access code
        code: String,
    },
}

/// Saved-set subcommands
#[derive(Subcommand, Debug)]
pub enum SavedCommand {
    /// List the saved proteins
    List,

    /// Add proteins by id (idempotent)
    Add {
        /// Protein ids to save
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Remove proteins by id
    Remove {
        /// Protein ids to remove
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}
