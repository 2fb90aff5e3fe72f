//! PDX Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the PDX project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all PDX workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Domain Headers**: Typed parser for protein-domain annotation strings
//! - **Types**: Shared domain types and data structures
//! - **Logging**: Centralized tracing setup
//!
//! # Example
//!
//! ```no_run
//! use pdx_common::{Result, PdxError};
//! use pdx_common::domain::DomainHeader;
//!
//! fn describe(header: &str) -> Result<()> {
//!     let parsed = DomainHeader::parse(header);
//!     println!("{} ranges", parsed.annotations().len());
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PdxError, Result};
