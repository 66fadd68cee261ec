//! Output splitting. Re-labels generated text for display.
//!
//! When a reply runs past its own turn, the generator emits end markers
//! and start markers of further turns. Each such part is rewritten as
//! `role: content`. A reply without end markers is returned untouched.

use crate::tags::ResolvedTags;
use promptweave_core::Role;

const SENTINEL: &str = "\u{1e}promptweave-split\u{1e}";

pub fn split_generated(tags: &ResolvedTags, text: &str) -> String {
    let mut ends: Vec<&str> = tags
        .canonical()
        .into_iter()
        .map(|(_, t)| t.end.trim())
        .chain(tags.other_configured.then(|| tags.other.end.trim()))
        .filter(|end| !end.is_empty())
        .collect();
    ends.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    ends.dedup();

    let mut marked = text.to_string();
    for end in &ends {
        marked = marked.replace(end, SENTINEL);
    }

    let parts: Vec<&str> = marked.split(SENTINEL).collect();
    if parts.len() == 1 {
        return text.to_string();
    }

    let mut starts: Vec<StartMarker> = tags
        .canonical()
        .into_iter()
        .map(|(role, t)| StartMarker {
            role,
            full: t.start.as_str(),
            trimmed: t.start.trim(),
        })
        .filter(|m| !m.trimmed.is_empty())
        .collect();
    // Longest marker first; roles sharing a marker resolve to the
    // conversational one.
    starts.sort_by_key(|m| (std::cmp::Reverse(m.trimmed.len()), tie_rank(&m.role)));

    parts
        .iter()
        .map(|part| part.trim_start())
        .filter(|part| !part.trim().is_empty())
        .map(|part| relabel(tags, &starts, part))
        .collect::<Vec<_>>()
        .join("\n")
}

struct StartMarker<'a> {
    role: Role,
    /// The start marker as written, header postfix included.
    full: &'a str,
    trimmed: &'a str,
}

impl StartMarker<'_> {
    /// The text after this marker, if `part` opens with it. A marker ending
    /// in a word character only matches at a word boundary, so
    /// `<|im_start|>userbot` is not a user turn.
    fn strip<'p>(&self, part: &'p str) -> Option<&'p str> {
        if let Some(rest) = part.strip_prefix(self.full) {
            return Some(rest);
        }
        let rest = part.strip_prefix(self.trimmed)?;
        let bounded = rest.is_empty()
            || rest.starts_with(char::is_whitespace)
            || !self.trimmed.ends_with(|c: char| c.is_alphanumeric() || c == '_');
        bounded.then_some(rest)
    }
}

fn tie_rank(role: &Role) -> u8 {
    match role {
        Role::User => 0,
        Role::Model => 1,
        Role::System => 2,
        Role::Memory => 3,
        Role::Other(_) => 4,
    }
}

fn relabel(tags: &ResolvedTags, starts: &[StartMarker<'_>], part: &str) -> String {
    for marker in starts {
        if let Some(rest) = marker.strip(part) {
            return format!("{}: {}", marker.role.label(), rest.trim());
        }
    }

    if tags.other_configured && !tags.other.start.is_empty() {
        if let Some(rest) = part.strip_prefix(tags.other.start.as_str()) {
            let postfix = if tags.other.postfix.is_empty() {
                "\n"
            } else {
                tags.other.postfix.as_str()
            };
            if let Some((label, content)) = rest.split_once(postfix) {
                let label = label.trim();
                if !label.is_empty() {
                    return format!("{label}: {}", content.trim());
                }
            }
        }
    }

    part.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptweave_catalog::TagCatalog;
    use promptweave_core::TemplateEntry;

    fn chatml() -> ResolvedTags {
        ResolvedTags::resolve(
            &TemplateEntry::new("chatml")
                .system("<|im_start|>system", "<|im_end|>")
                .user("<|im_start|>user", "<|im_end|>")
                .assistant("<|im_start|>assistant", "<|im_end|>")
                .other("<|im_start|>", "\n<|im_end|>")
                .header_postfix("\n")
                .end_prefix("\n"),
        )
    }

    #[test]
    fn single_part_is_verbatim() {
        let text = "  Sure, here it is.\n";
        assert_eq!(split_generated(&chatml(), text), text);
    }

    #[test]
    fn runaway_turns_are_relabelled() {
        let text = "Fine, thanks.<|im_end|>\n<|im_start|>user\nAnd you?<|im_end|>\n<|im_start|>assistant\nGreat";
        assert_eq!(
            split_generated(&chatml(), text),
            "Fine, thanks.\nuser: And you?\nmodel: Great"
        );
    }

    #[test]
    fn other_role_label_is_recovered() {
        let text = "ok<|im_end|>\n<|im_start|>Zorg\nGreetings<|im_end|>";
        assert_eq!(split_generated(&chatml(), text), "ok\nZorg: Greetings");
    }

    #[test]
    fn echoed_block_round_trips() {
        let tags = chatml();
        let block = format!("{}hello{}\n", tags.user.start, tags.user.end);
        assert_eq!(split_generated(&tags, &block), "user: hello");
    }

    #[test]
    fn other_label_starting_with_role_name() {
        let text = "ok<|im_end|>\n<|im_start|>userbot\nbeep<|im_end|>";
        assert_eq!(split_generated(&chatml(), text), "ok\nuserbot: beep");
    }

    #[test]
    fn shared_start_marker_resolves_to_user_for_gemma() {
        let catalog = TagCatalog::with_defaults();
        let tags = ResolvedTags::resolve(catalog.select("gemma", None).unwrap());
        let text = "Sure.<end_of_turn>\n<start_of_turn>user\nAnd you?<end_of_turn>";
        assert_eq!(split_generated(&tags, text), "Sure.\nuser: And you?");
    }

    #[test]
    fn shared_start_marker_resolves_to_user_for_mistral() {
        let catalog = TagCatalog::with_defaults();
        let tags = ResolvedTags::resolve(catalog.select("mistral", None).unwrap());
        let text = "Sure.</s>[INST] And you? [/INST]";
        assert_eq!(split_generated(&tags, text), "Sure.\nuser: And you?");
    }

    #[test]
    fn echoed_user_block_round_trips_for_every_builtin() {
        let catalog = TagCatalog::with_defaults();
        for entry in catalog.entries() {
            let tags = ResolvedTags::resolve(entry);
            if tags.user.end.trim().is_empty() {
                continue;
            }
            let block = format!("{}hello{}\n", tags.user.start, tags.user.end);
            assert_eq!(
                split_generated(&tags, &block),
                "user: hello",
                "template {}",
                tags.selector
            );
        }
    }

    #[test]
    fn inline_fallback_has_no_end_marker() {
        let tags = ResolvedTags::resolve(
            &TemplateEntry::new("bare")
                .system("S:", "")
                .user("U:", "")
                .assistant("M:", ""),
        );
        let text = "U: hi\nM: yo";
        assert_eq!(split_generated(&tags, text), text);
    }
}
