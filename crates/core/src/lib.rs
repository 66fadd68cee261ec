//! # promptweave core
//!
//! Domain types and error definitions shared by every promptweave crate.
//! This crate has no knowledge of catalogs on disk or of the formatting
//! engine. It defines the vocabulary the other crates implement against.
//!
//! - [`Role`] — the participant categories a block can be wrapped with
//! - [`TemplateEntry`] — one named configuration of chat markers
//! - [`Error`] — the top-level error with one variant per bounded context

pub mod error;
pub mod role;
pub mod template;

// Re-export key types at crate root for ergonomics
pub use error::{CatalogError, Error, FormatError, Result};
pub use role::Role;
pub use template::TemplateEntry;
