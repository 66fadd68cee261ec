//! Configuration loading, validation, and management for promptweave.
//!
//! Loads configuration from `~/.promptweave/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.promptweave/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model family to format for
    #[serde(default = "default_family")]
    pub family: String,

    /// Version within the family; `None` selects the family's first entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// External catalog file replacing the built-in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Formatting engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_family() -> String {
    "chatml".into()
}

/// Settings for the segmentation and block-formatting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Highest character index at which a `:` still marks an owner label.
    #[serde(default = "default_owner_colon_limit")]
    pub owner_colon_limit: usize,

    /// System text used when the memory note switches on story mode.
    #[serde(default = "default_story_preamble")]
    pub story_preamble: String,

    #[serde(default)]
    pub markers: MarkerConfig,

    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_owner_colon_limit() -> usize {
    50
}
fn default_story_preamble() -> String {
    "The following is a novella.\n".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner_colon_limit: default_owner_colon_limit(),
            story_preamble: default_story_preamble(),
            markers: MarkerConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Inline control tags recognized in transcript and memory text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    #[serde(default = "default_ignore_following")]
    pub ignore_following: String,

    #[serde(default = "default_continue_section")]
    pub continue_section: String,

    #[serde(default = "default_comment_open")]
    pub comment_open: String,

    #[serde(default = "default_comment_close")]
    pub comment_close: String,

    #[serde(default = "default_story_mode")]
    pub story_mode: String,

    /// Tag name of alias declarations: `<Alias:owner-role>`
    #[serde(default = "default_alias_tag")]
    pub alias_tag: String,

    /// Tag name of pseudonym declarations: `<Pseudo:owner1,owner2-role>`
    #[serde(default = "default_pseudonym_tag")]
    pub pseudonym_tag: String,
}

fn default_ignore_following() -> String {
    "<IgnoreFollowing>".into()
}
fn default_continue_section() -> String {
    "<ContinueSection>".into()
}
fn default_comment_open() -> String {
    "<Comment>".into()
}
fn default_comment_close() -> String {
    "</Comment>".into()
}
fn default_story_mode() -> String {
    "<StoryMode>".into()
}
fn default_alias_tag() -> String {
    "Alias".into()
}
fn default_pseudonym_tag() -> String {
    "Pseudo".into()
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            ignore_following: default_ignore_following(),
            continue_section: default_continue_section(),
            comment_open: default_comment_open(),
            comment_close: default_comment_close(),
            story_mode: default_story_mode(),
            alias_tag: default_alias_tag(),
            pseudonym_tag: default_pseudonym_tag(),
        }
    }
}

impl MarkerConfig {
    /// All literal markers with their config key, in declaration order.
    pub fn literals(&self) -> [(&'static str, &str); 5] {
        [
            ("ignore_following", self.ignore_following.as_str()),
            ("continue_section", self.continue_section.as_str()),
            ("comment_open", self.comment_open.as_str()),
            ("comment_close", self.comment_close.as_str()),
            ("story_mode", self.story_mode.as_str()),
        ]
    }
}

/// How the memory note carries an optional system text.
///
/// `System:<system text>|||<memory text>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_system_prefix")]
    pub system_prefix: String,

    #[serde(default = "default_splitter")]
    pub splitter: String,
}

fn default_system_prefix() -> String {
    "System:".into()
}
fn default_splitter() -> String {
    "|||".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            system_prefix: default_system_prefix(),
            splitter: default_splitter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.promptweave/config.toml).
    ///
    /// Environment variables override the file:
    /// - `PROMPTWEAVE_FAMILY`
    /// - `PROMPTWEAVE_VERSION`
    /// - `PROMPTWEAVE_CATALOG`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(family) = std::env::var("PROMPTWEAVE_FAMILY") {
            config.family = family;
        }

        if let Ok(version) = std::env::var("PROMPTWEAVE_VERSION") {
            config.version = Some(version).filter(|v| !v.is_empty());
        }

        if let Ok(path) = std::env::var("PROMPTWEAVE_CATALOG") {
            config.catalog_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".promptweave")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.family.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "family cannot be empty".into(),
            ));
        }
        self.engine.validate()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl EngineConfig {
    /// Validate engine settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner_colon_limit == 0 {
            return Err(ConfigError::ValidationError(
                "engine.owner_colon_limit must be > 0".into(),
            ));
        }

        let literals = self.markers.literals();
        for (key, value) in &literals {
            if value.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "engine.markers.{key} cannot be empty"
                )));
            }
        }
        for (i, (key, value)) in literals.iter().enumerate() {
            if let Some((other, _)) = literals[i + 1..].iter().find(|(_, v)| v == value) {
                return Err(ConfigError::ValidationError(format!(
                    "engine.markers.{key} and engine.markers.{other} must differ"
                )));
            }
        }

        for (key, tag) in [
            ("alias_tag", &self.markers.alias_tag),
            ("pseudonym_tag", &self.markers.pseudonym_tag),
        ] {
            if tag.is_empty() || tag.contains(['<', '>', ':']) {
                return Err(ConfigError::ValidationError(format!(
                    "engine.markers.{key} must be a non-empty name without '<', '>' or ':'"
                )));
            }
        }
        if self.markers.alias_tag == self.markers.pseudonym_tag {
            return Err(ConfigError::ValidationError(
                "engine.markers.alias_tag and engine.markers.pseudonym_tag must differ".into(),
            ));
        }

        if self.memory.system_prefix.is_empty() || self.memory.splitter.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine.memory.system_prefix and engine.memory.splitter cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            version: None,
            catalog_path: None,
            engine: EngineConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.family, "chatml");
        assert_eq!(config.engine.owner_colon_limit, 50);
        assert_eq!(config.engine.memory.splitter, "|||");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.family, config.family);
        assert_eq!(parsed.engine, config.engine);
    }

    #[test]
    fn partial_engine_section_keeps_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
family = "llama3"
version = "3.1"

[engine]
owner_colon_limit = 20

[engine.markers]
comment_open = "<!--"
comment_close = "-->"
"#,
        )
        .unwrap();
        assert_eq!(parsed.family, "llama3");
        assert_eq!(parsed.version.as_deref(), Some("3.1"));
        assert_eq!(parsed.engine.owner_colon_limit, 20);
        assert_eq!(parsed.engine.markers.comment_open, "<!--");
        assert_eq!(parsed.engine.markers.ignore_following, "<IgnoreFollowing>");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn zero_colon_limit_rejected() {
        let mut config = AppConfig::default();
        config.engine.owner_colon_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_markers_rejected() {
        let mut config = AppConfig::default();
        config.engine.markers.comment_close = config.engine.markers.comment_open.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("comment_open"));
    }

    #[test]
    fn empty_marker_rejected() {
        let mut config = AppConfig::default();
        config.engine.markers.ignore_following.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn tag_name_with_angle_bracket_rejected() {
        let mut config = AppConfig::default();
        config.engine.markers.alias_tag = "<Alias".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let path = std::path::Path::new("/nonexistent/path/config.toml");
        let config = AppConfig::load_from(path).unwrap();
        assert_eq!(config.family, "chatml");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "family = \"gemma\"\n[engine.memory]\nsplitter = \"###\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.family, "gemma");
        assert_eq!(config.engine.memory.splitter, "###");
        assert_eq!(config.engine.memory.system_prefix, "System:");
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "family = [").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("family"));
        assert!(toml_str.contains("owner_colon_limit"));
    }
}
