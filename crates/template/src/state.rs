//! Per-call engine state.
//!
//! A fresh [`EngineState`] is created at the start of every formatting call
//! and threaded through the assembler and segment builder as `&mut`.
//! Declarations made in one call never reach the next.

use crate::lexer::LexedLine;
use promptweave_core::Role;
use std::collections::HashMap;
use tracing::debug;

/// Where the transcript scan currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No owner label seen yet; lines form the ownerless leading segment.
    #[default]
    BeforeFirstOwner,
    InsideSegment,
}

/// Alias and pseudonym tables for one call.
#[derive(Debug, Default)]
pub struct Declarations {
    aliases: HashMap<String, Role>,
    pseudonyms: HashMap<String, String>,
}

impl Declarations {
    /// Record the declarations found on a lexed line. Later declarations
    /// for the same owner replace earlier ones.
    pub fn record(&mut self, line: &LexedLine) {
        for (owner, role) in &line.aliases {
            debug!(owner = %owner, role = %role, "Alias declared");
            self.aliases.insert(owner.clone(), role.clone());
        }
        for (owner, role) in &line.pseudonyms {
            debug!(owner = %owner, role = %role, "Pseudonym declared");
            self.pseudonyms.insert(owner.clone(), role.clone());
        }
    }

    pub fn alias(&self, owner: &str) -> Option<&Role> {
        self.aliases.get(owner)
    }

    pub fn pseudonym(&self, owner: &str) -> Option<&str> {
        self.pseudonyms.get(owner).map(String::as_str)
    }
}

/// Engine flags and tables scoped to a single formatting call.
#[derive(Debug, Default)]
pub struct EngineState {
    pub phase: Phase,
    /// The transcript ends mid-utterance; the last block stays open.
    pub continuation: bool,
    /// An ignore marker cut the scan short; first and last blocks get trimmed.
    pub no_next_line: bool,
    pub comment_active: bool,
    pub story_mode: bool,
    /// Number of segments finalized so far.
    pub segment_index: usize,
    pub declarations: Declarations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_declaration_wins() {
        let mut decls = Declarations::default();
        decls.record(&LexedLine {
            pseudonyms: vec![("Bob".into(), "user".into())],
            ..LexedLine::default()
        });
        decls.record(&LexedLine {
            pseudonyms: vec![("Bob".into(), "model".into())],
            aliases: vec![("Bob".into(), Role::System)],
            ..LexedLine::default()
        });
        assert_eq!(decls.pseudonym("Bob"), Some("model"));
        assert_eq!(decls.alias("Bob"), Some(&Role::System));
        assert_eq!(decls.alias("Eve"), None);
    }

    #[test]
    fn fresh_state_is_clean() {
        let state = EngineState::default();
        assert_eq!(state.phase, Phase::BeforeFirstOwner);
        assert!(!state.continuation);
        assert!(!state.no_next_line);
        assert!(state.declarations.pseudonym("Bob").is_none());
    }
}
