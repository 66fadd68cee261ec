//! Tag resolution: turns one catalog entry into the literal strings
//! written around each block.

use promptweave_core::{Role, TemplateEntry};

/// Start and end markers for one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTags {
    pub start: String,
    pub end: String,
}

/// Markers for named participants outside the canonical roles.
///
/// A block renders as `start + label + postfix + content + end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherTags {
    pub start: String,
    pub end: String,
    pub postfix: String,
}

impl Default for OtherTags {
    /// Inline `name: ` convention used when the entry has no other markers.
    fn default() -> Self {
        Self {
            start: String::new(),
            end: String::new(),
            postfix: ": \n".into(),
        }
    }
}

/// The resolved marker set of the active template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTags {
    /// `family@version` of the entry these tags came from.
    pub selector: String,
    pub beginning: String,
    pub system: RoleTags,
    pub user: RoleTags,
    pub model: RoleTags,
    pub memory: RoleTags,
    pub other: OtherTags,
    /// Whether `other` came from the entry rather than the inline fallback.
    pub other_configured: bool,
}

impl ResolvedTags {
    pub fn resolve(entry: &TemplateEntry) -> Self {
        let role_tags = |role: Role, start: &str, end: &str| {
            let postfix = if entry.postfix_disabled(&role) {
                ""
            } else {
                entry.header_postfix.as_str()
            };
            RoleTags {
                start: format!("{start}{postfix}"),
                end: format!("{}{end}", entry.end_prefix),
            }
        };

        let mem_start = entry.mem_start.as_deref().unwrap_or(&entry.sys_start);
        let mem_end = entry.mem_end.as_deref().unwrap_or(&entry.sys_end);

        let (other, other_configured) = match (&entry.other_start, &entry.other_end) {
            (Some(start), Some(end)) => (
                OtherTags {
                    start: start.clone(),
                    end: end.clone(),
                    postfix: entry.header_postfix.clone(),
                },
                true,
            ),
            _ => (OtherTags::default(), false),
        };

        Self {
            selector: entry.selector(),
            beginning: entry.beginning.clone(),
            system: role_tags(Role::System, &entry.sys_start, &entry.sys_end),
            user: role_tags(Role::User, &entry.user_start, &entry.user_end),
            model: role_tags(Role::Model, &entry.model_start, &entry.model_end),
            memory: role_tags(Role::Memory, mem_start, mem_end),
            other,
            other_configured,
        }
    }

    /// Markers for a block of the given role. Labels outside the canonical
    /// roles fall back to the other-role markers.
    pub fn block_tags(&self, role: &Role) -> RoleTags {
        match role {
            Role::System => self.system.clone(),
            Role::User => self.user.clone(),
            Role::Model => self.model.clone(),
            Role::Memory => self.memory.clone(),
            Role::Other(label) => RoleTags {
                start: format!("{}{label}{}", self.other.start, self.other.postfix),
                end: self.other.end.clone(),
            },
        }
    }

    /// The canonical roles with their markers.
    pub fn canonical(&self) -> [(Role, &RoleTags); 4] {
        [
            (Role::System, &self.system),
            (Role::User, &self.user),
            (Role::Model, &self.model),
            (Role::Memory, &self.memory),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chatml() -> TemplateEntry {
        TemplateEntry::new("chatml")
            .system("<|im_start|>system", "<|im_end|>")
            .user("<|im_start|>user", "<|im_end|>")
            .assistant("<|im_start|>assistant", "<|im_end|>")
            .header_postfix("\n")
            .end_prefix("\n")
    }

    #[test]
    fn postfix_and_prefix_applied() {
        let tags = ResolvedTags::resolve(&chatml());
        assert_eq!(tags.user.start, "<|im_start|>user\n");
        assert_eq!(tags.user.end, "\n<|im_end|>");
        assert_eq!(tags.model.start, "<|im_start|>assistant\n");
    }

    #[test]
    fn disabled_postfix_is_omitted() {
        let tags = ResolvedTags::resolve(&chatml().disable_postfix_for("sys"));
        assert_eq!(tags.system.start, "<|im_start|>system");
        assert_eq!(tags.user.start, "<|im_start|>user\n");
    }

    #[test]
    fn memory_falls_back_to_system_markers() {
        let tags = ResolvedTags::resolve(&chatml());
        assert_eq!(tags.memory, tags.system);

        let tags = ResolvedTags::resolve(&chatml().memory("<|im_start|>memory", "<|im_end|>"));
        assert_eq!(tags.memory.start, "<|im_start|>memory\n");
    }

    #[test]
    fn other_without_config_uses_inline_label() {
        let tags = ResolvedTags::resolve(&chatml());
        assert!(!tags.other_configured);
        let zorg = tags.block_tags(&Role::Other("Zorg".into()));
        assert_eq!(zorg.start, "Zorg: \n");
        assert_eq!(zorg.end, "");
    }

    #[test]
    fn configured_other_is_verbatim() {
        let tags = ResolvedTags::resolve(&chatml().other("<|im_start|>", "\n<|im_end|>"));
        assert!(tags.other_configured);
        let zorg = tags.block_tags(&Role::Other("Zorg".into()));
        assert_eq!(zorg.start, "<|im_start|>Zorg\n");
        assert_eq!(zorg.end, "\n<|im_end|>");
    }

    #[test]
    fn resolving_twice_is_identical() {
        let entry = chatml().other("<|im_start|>", "\n<|im_end|>");
        assert_eq!(ResolvedTags::resolve(&entry), ResolvedTags::resolve(&entry));
    }
}
