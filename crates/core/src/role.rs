//! Participant roles a formatted block can be wrapped with.

use serde::{Deserialize, Serialize};

/// The role of a block in a formatted prompt.
///
/// The four canonical roles map onto dedicated markers in a
/// [`TemplateEntry`](crate::TemplateEntry). Every other speaker is carried as
/// [`Role::Other`] with its literal label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The human side of the conversation
    User,
    /// The text generator
    Model,
    /// Background notes injected ahead of the conversation
    Memory,
    /// Any other named participant
    Other(String),
}

impl Role {
    /// Match one of the reserved owner names a transcript may use directly.
    ///
    /// Case-insensitive. Memory is not a reserved owner; it only comes from
    /// the separate memory note.
    pub fn from_reserved(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sys" | "system" => Some(Role::System),
            "user" => Some(Role::User),
            "model" => Some(Role::Model),
            _ => None,
        }
    }

    /// Resolve a display label: reserved names become canonical roles,
    /// anything else is kept as an [`Role::Other`] label.
    pub fn from_label(label: &str) -> Self {
        Self::from_reserved(label).unwrap_or_else(|| Role::Other(label.trim().to_string()))
    }

    /// Parse a role name as used in `disable_postfix` lists.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(Role::Memory),
            other => Self::from_reserved(other),
        }
    }

    /// The label written in front of re-labelled output (`"user: ..."`).
    pub fn label(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Model => "model",
            Role::Memory => "memory",
            Role::Other(name) => name,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Role::Other(_))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
