//! Template catalog — the table of chat marker configurations.
//!
//! Each entry names a model family (and optionally a version) and lists the
//! literal markers that open and close system, user, model, memory and other
//! blocks. Exactly one entry is active per formatter.
//!
//! # Catalog file
//!
//! JSON (a bare array, or an object with a `templates` array):
//!
//! ```json
//! [
//!   {
//!     "model": "chatml",
//!     "sys_start": "<|im_start|>system", "sys_end": "<|im_end|>",
//!     "user_start": "<|im_start|>user", "user_end": "<|im_end|>",
//!     "model_start": "<|im_start|>assistant", "model_end": "<|im_end|>",
//!     "header_postfix": "\n", "end_prefix": "\n"
//!   }
//! ]
//! ```
//!
//! or TOML with `[[templates]]` tables using the same keys.

mod builtin;
mod catalog;

pub use catalog::TagCatalog;
pub use promptweave_core::{CatalogError, TemplateEntry};
