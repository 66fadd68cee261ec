//! Prompt assembly — the top-level driver.
//!
//! Splits the transcript into lines, lexes each one, detects owner
//! boundaries, feeds the [`SegmentBuilder`] and stitches the finished blocks
//! together with the system and memory blocks.
//!
//! ```text
//! beginning
//! [system block]                     from `System:<text>|||` in the memory note
//! [ownerless leading text]
//! block, block, ...                  memory block after the first closed
//!                                    other-role block, else in front
//! last block                         left open: no end marker, no newline
//! ```

use crate::lexer::{LexedLine, Lexer};
use crate::memory::split_memory;
use crate::segment::{Block, Finalized, SegmentBuilder};
use crate::splitter::split_generated;
use crate::state::{EngineState, Phase};
use crate::tags::ResolvedTags;
use promptweave_catalog::TagCatalog;
use promptweave_config::EngineConfig;
use promptweave_core::{FormatError, Role, TemplateEntry};
use tracing::{debug, info};

/// A formatted prompt ready for the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPrompt {
    pub text: String,
    /// The last block was left open so the generator continues it.
    pub continuation: bool,
    /// The transcript was cut at an ignore-following marker.
    pub truncated: bool,
    /// Number of transcript blocks, not counting system and memory.
    pub blocks: usize,
}

/// Formats transcripts with one active template.
///
/// `format` takes `&self` and keeps all per-call state local, so one
/// formatter can serve many calls, including concurrent ones.
pub struct PromptFormatter {
    settings: EngineConfig,
    lexer: Lexer,
    tags: ResolvedTags,
}

impl PromptFormatter {
    pub fn new(entry: &TemplateEntry, settings: EngineConfig) -> Result<Self, FormatError> {
        let lexer = Lexer::new(&settings.markers)?;
        Ok(Self {
            settings,
            lexer,
            tags: ResolvedTags::resolve(entry),
        })
    }

    /// Select `(family, version)` from the catalog and build a formatter.
    pub fn from_catalog(
        catalog: &TagCatalog,
        family: &str,
        version: Option<&str>,
        settings: EngineConfig,
    ) -> promptweave_core::Result<Self> {
        let entry = catalog.select(family, version)?;
        Ok(Self::new(entry, settings)?)
    }

    /// Replace the active template. Blocks finalized afterwards use the new
    /// markers.
    pub fn apply_config(&mut self, entry: &TemplateEntry) {
        self.tags = ResolvedTags::resolve(entry);
        info!(template = %self.tags.selector, "Template applied");
    }

    pub fn tags(&self) -> &ResolvedTags {
        &self.tags
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Re-label generated text using the active template.
    pub fn split_generated(&self, text: &str) -> String {
        split_generated(&self.tags, text)
    }

    /// Format a transcript and memory note into one prompt.
    pub fn format(&self, transcript: &str, memory: &str) -> Result<FormattedPrompt, FormatError> {
        let mut state = EngineState::default();

        let note = split_memory(memory, &self.settings.memory)?;
        let (system, story_in_system) = match note.system {
            Some(raw) => self.clean_note(raw, &mut state),
            None => (String::new(), false),
        };
        let (memory, story_in_memory) = self.clean_note(note.memory, &mut state);

        let (system, memory) = if story_in_system || story_in_memory {
            debug!("Story mode requested by memory note");
            state.story_mode = true;
            (self.settings.story_preamble.clone(), String::new())
        } else {
            (system, memory)
        };

        let mut blocks = self.scan(transcript, &mut state);

        if state.no_next_line {
            if let Some(first) = blocks.first_mut() {
                first.content = first.content.trim().to_string();
            }
            if let Some(last) = blocks.last_mut() {
                last.content = last.content.trim().to_string();
            }
        }
        let block_count = blocks.len();

        let mut text = String::new();
        text.push_str(&self.tags.beginning);

        let system = system.trim();
        if !system.is_empty() {
            Block::wrapped(Role::System, system, &self.tags).render_into(&mut text);
        }

        let memory = memory.trim();
        if !memory.is_empty() {
            let at = blocks
                .iter()
                .position(|b| b.closed && b.is_other())
                .map_or(0, |i| i + 1);
            blocks.insert(at, Block::wrapped(Role::Memory, memory, &self.tags));
        }

        for block in &blocks {
            block.render_into(&mut text);
        }

        debug!(
            template = %self.tags.selector,
            blocks = block_count,
            continuation = state.continuation,
            truncated = state.no_next_line,
            "Prompt formatted"
        );

        Ok(FormattedPrompt {
            text,
            continuation: state.continuation,
            truncated: state.no_next_line,
            blocks: block_count,
        })
    }

    /// Walk the transcript lines and build the block sequence.
    fn scan(&self, transcript: &str, state: &mut EngineState) -> Vec<Block> {
        let mut builder = SegmentBuilder::default();
        let mut blocks = Vec::new();

        if state.story_mode {
            builder.open(Role::Model.label());
            state.phase = Phase::InsideSegment;
        }

        let mut stopped = false;
        for (idx, raw) in transcript.split('\n').enumerate() {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let mut lexed = self.lexer.lex_line(raw, &mut state.comment_active);

            if !lexed.discarded && !lexed.continue_section && !state.story_mode {
                if let Some((owner, rest)) =
                    detect_owner(&lexed.text, self.settings.owner_colon_limit)
                {
                    if state.phase == Phase::InsideSegment || builder.has_content() {
                        let finalized = builder.finalize(state, &self.tags);
                        collect(finalized, &mut blocks);
                    }
                    builder.open(owner);
                    state.phase = Phase::InsideSegment;
                    lexed.text = rest;
                }
            }

            builder.push(&lexed, state);

            if lexed.ignore_following {
                debug!(line = idx + 1, "Ignore marker reached, stopping scan");
                state.continuation = true;
                state.no_next_line = true;
                stopped = true;
                break;
            }
        }

        if !stopped {
            state.continuation = true;
        }
        let finalized = builder.finalize(state, &self.tags);
        collect(finalized, &mut blocks);
        blocks
    }

    /// Strip comments and control tags from a memory or system text,
    /// recording any declarations it makes. Returns the visible text and
    /// whether the story-mode marker was present.
    fn clean_note(&self, raw: &str, state: &mut EngineState) -> (String, bool) {
        let mut comment_active = false;
        let mut story = false;
        let mut kept: Vec<String> = Vec::new();

        for line in raw.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let lexed: LexedLine = self.lexer.lex_line(line, &mut comment_active);
            state.declarations.record(&lexed);
            story |= lexed.story_mode;
            if !lexed.discarded {
                kept.push(lexed.text);
            }
            if lexed.ignore_following {
                break;
            }
        }
        (kept.join("\n"), story)
    }
}

/// Split `text` at an owner-label colon. The colon must sit at character
/// index `limit` or earlier, outside any `<...>` tag left in the text, and
/// the owner must not be blank.
pub(crate) fn detect_owner(text: &str, limit: usize) -> Option<(String, String)> {
    let colon = owner_colon(text)?;
    let head = &text[..colon];
    if head.chars().count() > limit {
        return None;
    }
    let owner = head.trim();
    if owner.is_empty() {
        return None;
    }
    Some((owner.to_string(), text[colon + 1..].to_string()))
}

/// Byte offset of the first colon not enclosed in angle brackets.
fn owner_colon(text: &str) -> Option<usize> {
    let mut in_tag = false;
    for (i, c) in text.char_indices() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            ':' if !in_tag => return Some(i),
            _ => {}
        }
    }
    None
}

fn collect(finalized: Finalized, blocks: &mut Vec<Block>) {
    match finalized {
        Finalized::Block(block) => blocks.push(block),
        Finalized::Splice(block) => match blocks.last_mut() {
            Some(prev) => {
                prev.content.push('\n');
                prev.content.push_str(&block.content);
            }
            None => blocks.push(block),
        },
        Finalized::Empty => {}
    }
}
