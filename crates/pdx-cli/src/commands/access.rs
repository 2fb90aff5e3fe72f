//! Access command implementation
//!
//! Verifies a 6-digit access code against the lookup table.

use colored::Colorize;

use crate::commands::connect;
use crate::db::access;
use crate::error::{CliError, Result};

/// Run the access command
pub async fn run(code: String, database_url: Option<String>) -> Result<()> {
    let code = code.trim();

    if !access::is_well_formed(code) {
        return Err(CliError::access_denied("codes are exactly 6 digits"));
    }

    let pool = connect(database_url.as_deref()).await?;
    if access::verify_code(&pool, code).await? {
        println!("{} Access code accepted", "✓".green());
        Ok(())
    } else {
        Err(CliError::access_denied("code not recognized"))
    }
}
