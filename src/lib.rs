//! # rustpubmed
//!
//! Find PubMed papers with authors affiliated to pharmaceutical or biotech companies.
//!
//! ## Modules
//!
//! - [`eutils`] - ESearch/EFetch client
//! - [`parser`] - EFetch XML to article records
//! - [`rules`] - Keyword list and email pattern
//! - [`classify`] - Non-academic author detection
//! - [`export`] - CSV output
//! - [`pipeline`] - End-to-end run
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::{eutils::{ClientConfig, PubmedClient}, pipeline, rules::ClassifierRules};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubmedClient::new(ClientConfig::default())?;
//!     let rules = ClassifierRules::builtin()?;
//!     let outcome = pipeline::run(&client, "CRISPR gene editing", 50, &rules).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod error;
pub mod eutils;
pub mod export;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod rules;

pub use error::{PubmedError, Result};
