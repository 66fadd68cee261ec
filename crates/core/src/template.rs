//! Template entries — one named set of chat markers for a model family.
//!
//! Entries are plain data: the catalog crate loads and selects them, the
//! template crate resolves them into the strings written around each block.

use crate::error::CatalogError;
use crate::role::Role;
use serde::{Deserialize, Serialize};

/// A single catalog entry describing how one model family marks up turns.
///
/// Field names follow the on-disk catalog keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Model family name (e.g. `"chatml"`, `"llama3"`).
    pub model: String,

    /// Optional version within the family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub sys_start: String,
    pub sys_end: String,
    pub user_start: String,
    pub user_end: String,
    pub model_start: String,
    pub model_end: String,

    /// Appended to every role start marker unless the role is exempted.
    #[serde(default)]
    pub header_postfix: String,

    /// Prepended to every role end marker.
    #[serde(default)]
    pub end_prefix: String,

    /// Document preamble written once at the top of the prompt.
    #[serde(default)]
    pub beginning: String,

    /// Roles whose start marker does not get `header_postfix`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disable_postfix: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_end: Option<String>,

    /// Markers for named participants outside the canonical roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_end: Option<String>,
}

impl TemplateEntry {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn system(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.sys_start = start.into();
        self.sys_end = end.into();
        self
    }

    pub fn user(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.user_start = start.into();
        self.user_end = end.into();
        self
    }

    pub fn assistant(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.model_start = start.into();
        self.model_end = end.into();
        self
    }

    pub fn memory(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.mem_start = Some(start.into());
        self.mem_end = Some(end.into());
        self
    }

    pub fn other(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.other_start = Some(start.into());
        self.other_end = Some(end.into());
        self
    }

    pub fn header_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.header_postfix = postfix.into();
        self
    }

    pub fn end_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.end_prefix = prefix.into();
        self
    }

    pub fn beginning(mut self, beginning: impl Into<String>) -> Self {
        self.beginning = beginning.into();
        self
    }

    pub fn disable_postfix_for(mut self, role: impl Into<String>) -> Self {
        self.disable_postfix.push(role.into());
        self
    }

    /// Whether `role` is exempt from the header postfix.
    pub fn postfix_disabled(&self, role: &Role) -> bool {
        self.disable_postfix
            .iter()
            .any(|name| Role::from_config_name(name).as_ref() == Some(role))
    }

    /// Display form of the selector, e.g. `llama3@3.1`.
    pub fn selector(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{v}", self.model),
            None => self.model.clone(),
        }
    }

    /// Validate that the entry is well-formed.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.model.trim().is_empty() {
            return Err(CatalogError::InvalidEntry {
                model: "(empty)".into(),
                reason: "model family name cannot be empty".into(),
            });
        }
        for name in &self.disable_postfix {
            if Role::from_config_name(name).is_none() {
                return Err(CatalogError::InvalidEntry {
                    model: self.selector(),
                    reason: format!("unknown role '{name}' in disable_postfix"),
                });
            }
        }
        if self.other_start.is_some() != self.other_end.is_some() {
            return Err(CatalogError::InvalidEntry {
                model: self.selector(),
                reason: "other_start and other_end must be set together".into(),
            });
        }
        Ok(())
    }
}
