//! The catalog table and its selection rules.

use crate::builtin;
use promptweave_core::{CatalogError, TemplateEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// An ordered collection of template entries.
///
/// Order matters: selecting a family without a version returns the first
/// entry of that family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagCatalog {
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonCatalog {
    List(Vec<TemplateEntry>),
    Table(TagCatalog),
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in templates.
    pub fn with_defaults() -> Self {
        Self {
            templates: builtin::default_entries(),
        }
    }

    /// Build a catalog from entries, validating them.
    pub fn from_entries(templates: Vec<TemplateEntry>) -> Result<Self, CatalogError> {
        let catalog = Self { templates };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let parsed: JsonCatalog =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let templates = match parsed {
            JsonCatalog::List(entries) => entries,
            JsonCatalog::Table(catalog) => catalog.templates,
        };
        Self::from_entries(templates)
    }

    /// Load a catalog from a TOML string with `[[templates]]` tables.
    pub fn from_toml(toml_str: &str) -> Result<Self, CatalogError> {
        let catalog: TagCatalog =
            toml::from_str(toml_str).map_err(|e| CatalogError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file. `.toml` files are parsed as TOML, everything
    /// else as JSON.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let catalog = if is_toml {
            Self::from_toml(&content)?
        } else {
            Self::from_json(&content)?
        };
        info!(
            path = %path.display(),
            templates = catalog.len(),
            "Template catalog loaded"
        );
        Ok(catalog)
    }

    /// Append an entry after validating it.
    pub fn add(&mut self, entry: TemplateEntry) -> Result<(), CatalogError> {
        entry.validate()?;
        if self.contains(&entry.model, entry.version.as_deref()) {
            return Err(CatalogError::InvalidEntry {
                model: entry.selector(),
                reason: "duplicate family/version".into(),
            });
        }
        self.templates.push(entry);
        Ok(())
    }

    /// Validate all entries and reject duplicate (family, version) pairs.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (i, entry) in self.templates.iter().enumerate() {
            entry.validate()?;
            let duplicate = self.templates[..i]
                .iter()
                .any(|e| e.model == entry.model && e.version == entry.version);
            if duplicate {
                return Err(CatalogError::InvalidEntry {
                    model: entry.selector(),
                    reason: "duplicate family/version".into(),
                });
            }
        }
        Ok(())
    }

    /// Select the entry for a family and optional version.
    ///
    /// With a version, both must match exactly. Without one, the first
    /// entry of the family in catalog order wins.
    pub fn select(&self, family: &str, version: Option<&str>) -> Result<&TemplateEntry, CatalogError> {
        let found = self.templates.iter().find(|e| {
            e.model == family && version.is_none_or(|v| e.version.as_deref() == Some(v))
        });
        match found {
            Some(entry) => {
                debug!(template = %entry.selector(), "Template selected");
                Ok(entry)
            }
            None => Err(CatalogError::ConfigurationNotFound {
                family: family.to_string(),
                version: version.map(str::to_string),
            }),
        }
    }

    fn contains(&self, family: &str, version: Option<&str>) -> bool {
        self.templates
            .iter()
            .any(|e| e.model == family && e.version.as_deref() == version)
    }

    /// Family names in catalog order, without repeats.
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.templates {
            if !names.contains(&entry.model.as_str()) {
                names.push(&entry.model);
            }
        }
        names
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.templates
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
