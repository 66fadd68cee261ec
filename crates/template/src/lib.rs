//! Transcript segmentation and chat-template block formatting.
//!
//! Turns a role-tagged transcript plus a memory note into a single prompt
//! wrapped in the markers of one model family, and turns generated text
//! back into `role: content` lines.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌────────────────┐   ┌──────────────┐
//! │ transcript │──▶│  Lexer  │──▶│ SegmentBuilder │──▶│   Assembler  │──▶ prompt
//! └────────────┘   └─────────┘   └────────────────┘   └──────────────┘
//!                                        │                    │
//!                                  ┌─────┴────────────────────┴─┐
//!                                  │ ResolvedTags (TagCatalog)  │
//!                                  └─────────────┬──────────────┘
//!                                                │
//!                          generated text ──▶ split_generated ──▶ display
//! ```
//!
//! # Example
//!
//! ```
//! use promptweave_catalog::TagCatalog;
//! use promptweave_config::EngineConfig;
//! use promptweave_template::PromptFormatter;
//!
//! let catalog = TagCatalog::with_defaults();
//! let formatter =
//!     PromptFormatter::from_catalog(&catalog, "chatml", None, EngineConfig::default()).unwrap();
//! let prompt = formatter.format("User: hello\nModel:", "").unwrap();
//! assert_eq!(
//!     prompt.text,
//!     "<|im_start|>user\nhello\n<|im_end|>\n<|im_start|>assistant\n"
//! );
//! ```

mod assembler;
mod lexer;
mod memory;
mod segment;
mod splitter;
mod state;
mod tags;

pub use assembler::{FormattedPrompt, PromptFormatter};
pub use lexer::{LexedLine, Lexer, Token};
pub use memory::{MemoryNote, split_memory};
pub use segment::{Block, Finalized, SegmentBuilder};
pub use splitter::split_generated;
pub use state::{Declarations, EngineState, Phase};
pub use tags::{OtherTags, ResolvedTags, RoleTags};
