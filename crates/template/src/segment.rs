//! Segment building: accumulates the lines of one speaker and finalizes
//! them into a marker-wrapped [`Block`].

use crate::lexer::LexedLine;
use crate::state::EngineState;
use crate::tags::ResolvedTags;
use promptweave_core::Role;
use tracing::debug;

/// A finalized, marker-wrapped segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// `None` for ownerless leading text, which carries no markers.
    pub role: Option<Role>,
    pub start: String,
    pub content: String,
    /// Empty when the block was left open for continuation.
    pub end: String,
    /// Closed blocks end with their end marker and a newline.
    pub closed: bool,
}

impl Block {
    pub fn plain(content: impl Into<String>, closed: bool) -> Self {
        Self {
            role: None,
            start: String::new(),
            content: content.into(),
            end: String::new(),
            closed,
        }
    }

    /// Wrap `content` in the markers of `role`, closed.
    pub fn wrapped(role: Role, content: impl Into<String>, tags: &ResolvedTags) -> Self {
        let markers = tags.block_tags(&role);
        Self {
            role: Some(role),
            start: markers.start,
            content: content.into(),
            end: markers.end,
            closed: true,
        }
    }

    pub fn is_other(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_other)
    }

    pub fn render_into(&self, out: &mut String) {
        out.push_str(&self.start);
        out.push_str(&self.content);
        if self.closed {
            out.push_str(&self.end);
            out.push('\n');
        }
    }
}

/// Result of finalizing a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalized {
    /// A block owned by a speaker.
    Block(Block),
    /// Ownerless text; joins the previous block when there is one.
    Splice(Block),
    /// Nothing to emit.
    Empty,
}

/// The in-progress segment.
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    owner: Option<String>,
    lines: Vec<String>,
}

impl SegmentBuilder {
    /// Start a new segment for `owner`. The previous segment must have been
    /// finalized.
    pub fn open(&mut self, owner: impl Into<String>) {
        self.owner = Some(owner.into());
        self.lines.clear();
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether any accumulated line has visible text.
    pub fn has_content(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }

    /// Record the line's declarations and append its text unless the line
    /// was reduced to nothing by comments or control tags.
    pub fn push(&mut self, line: &LexedLine, state: &mut EngineState) {
        state.declarations.record(line);
        if !line.discarded {
            self.lines.push(line.text.clone());
        }
    }

    /// Turn the accumulated lines into a block and reset to an empty,
    /// ownerless segment.
    pub fn finalize(&mut self, state: &mut EngineState, tags: &ResolvedTags) -> Finalized {
        let owner = self.owner.take();
        let lines = std::mem::take(&mut self.lines);
        state.segment_index += 1;

        let mut content = String::new();
        for line in &lines {
            content.push_str(line);
            content.push('\n');
        }
        let content = if state.continuation {
            let trimmed = content.trim_start();
            trimmed.strip_suffix('\n').unwrap_or(trimmed).to_string()
        } else {
            content.trim().to_string()
        };
        let closed = !state.continuation;

        let Some(owner) = owner else {
            if content.trim().is_empty() {
                return Finalized::Empty;
            }
            return Finalized::Splice(Block::plain(content, closed));
        };

        let (role, content) = match state.declarations.pseudonym(&owner) {
            Some(label) => {
                let prefixed = format!("{owner}: {content}");
                let prefixed = if closed {
                    prefixed.trim_end().to_string()
                } else {
                    prefixed
                };
                (Role::from_label(label), prefixed)
            }
            None => (resolve_role(&owner, state, tags), content),
        };

        debug!(
            segment = state.segment_index,
            owner = %owner,
            role = %role,
            lines = lines.len(),
            closed,
            "Segment finalized"
        );

        let markers = tags.block_tags(&role);
        Finalized::Block(Block {
            role: Some(role),
            start: markers.start,
            content,
            end: if closed { markers.end } else { String::new() },
            closed,
        })
    }
}

/// Alias table, then reserved names, then the literal owner name.
fn resolve_role(owner: &str, state: &EngineState, tags: &ResolvedTags) -> Role {
    if let Some(role) = state.declarations.alias(owner) {
        return role.clone();
    }
    if let Some(role) = Role::from_reserved(owner) {
        return role;
    }
    if !tags.other_configured {
        debug!(owner, template = %tags.selector, "Unknown owner, using inline label");
    }
    Role::Other(owner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptweave_core::TemplateEntry;

    fn tags() -> ResolvedTags {
        ResolvedTags::resolve(
            &TemplateEntry::new("chatml")
                .system("<|im_start|>system", "<|im_end|>")
                .user("<|im_start|>user", "<|im_end|>")
                .assistant("<|im_start|>assistant", "<|im_end|>")
                .header_postfix("\n")
                .end_prefix("\n"),
        )
    }

    fn line(text: &str) -> LexedLine {
        LexedLine {
            text: text.into(),
            ..LexedLine::default()
        }
    }

    fn block(finalized: Finalized) -> Block {
        match finalized {
            Finalized::Block(b) => b,
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn reserved_owner_gets_role_markers() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.open("User");
        builder.push(&line(" hello"), &mut state);
        builder.push(&line("world "), &mut state);

        let b = block(builder.finalize(&mut state, &tags()));
        assert_eq!(b.role, Some(Role::User));
        assert_eq!(b.content, "hello\nworld");

        let mut out = String::new();
        b.render_into(&mut out);
        assert_eq!(out, "<|im_start|>user\nhello\nworld\n<|im_end|>\n");
        assert_eq!(state.segment_index, 1);
        assert!(builder.owner().is_none());
    }

    #[test]
    fn alias_resolves_owner() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.open("Bob");
        builder.push(
            &LexedLine {
                text: " hello".into(),
                aliases: vec![("Bob".into(), Role::User)],
                ..LexedLine::default()
            },
            &mut state,
        );
        let b = block(builder.finalize(&mut state, &tags()));
        assert_eq!(b.role, Some(Role::User));
        assert_eq!(b.start, "<|im_start|>user\n");
        assert_eq!(b.content, "hello");
    }

    #[test]
    fn pseudonym_keeps_owner_name_inline() {
        let mut state = EngineState::default();
        state.declarations.record(&LexedLine {
            pseudonyms: vec![("Bob".into(), "model".into())],
            ..LexedLine::default()
        });
        let mut builder = SegmentBuilder::default();
        builder.open("Bob");
        builder.push(&line(" hi there"), &mut state);

        let b = block(builder.finalize(&mut state, &tags()));
        assert_eq!(b.role, Some(Role::Model));
        assert_eq!(b.start, "<|im_start|>assistant\n");
        assert_eq!(b.content, "Bob: hi there");
    }

    #[test]
    fn unknown_owner_uses_inline_label() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.open("Zorg");
        builder.push(&line(" test"), &mut state);

        let b = block(builder.finalize(&mut state, &tags()));
        let mut out = String::new();
        b.render_into(&mut out);
        assert_eq!(out, "Zorg: \ntest\n");
    }

    #[test]
    fn continuation_leaves_block_open() {
        let mut state = EngineState {
            continuation: true,
            ..EngineState::default()
        };
        let mut builder = SegmentBuilder::default();
        builder.open("model");
        builder.push(&line(" Once upon a "), &mut state);

        let b = block(builder.finalize(&mut state, &tags()));
        assert!(!b.closed);
        assert!(b.end.is_empty());
        assert_eq!(b.content, "Once upon a ");

        let mut out = String::new();
        b.render_into(&mut out);
        assert_eq!(out, "<|im_start|>assistant\nOnce upon a ");
    }

    #[test]
    fn ownerless_text_is_spliced() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.push(&line("  preface  "), &mut state);
        assert_eq!(
            builder.finalize(&mut state, &tags()),
            Finalized::Splice(Block::plain("preface", true))
        );
    }

    #[test]
    fn empty_ownerless_segment_is_empty() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.push(&line("   "), &mut state);
        assert!(!builder.has_content());
        assert_eq!(builder.finalize(&mut state, &tags()), Finalized::Empty);
    }

    #[test]
    fn discarded_lines_still_declare() {
        let mut state = EngineState::default();
        let mut builder = SegmentBuilder::default();
        builder.open("Eve");
        builder.push(
            &LexedLine {
                aliases: vec![("Eve".into(), Role::System)],
                discarded: true,
                ..LexedLine::default()
            },
            &mut state,
        );
        builder.push(&line(" rules"), &mut state);
        let b = block(builder.finalize(&mut state, &tags()));
        assert_eq!(b.role, Some(Role::System));
        assert_eq!(b.content, "rules");
    }
}
