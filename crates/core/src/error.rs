//! Error types for the promptweave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for all promptweave operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Catalog errors ---
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    // --- Formatting errors ---
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No template configuration for family '{family}'{}", version_suffix(.version))]
    ConfigurationNotFound {
        family: String,
        version: Option<String>,
    },

    #[error("Invalid template entry '{model}': {reason}")]
    InvalidEntry { model: String, reason: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

fn version_suffix(version: &Option<String>) -> String {
    match version {
        Some(v) => format!(" version '{v}'"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Memory starts with the system prefix but has no '{splitter}' splitter")]
    MalformedMemoryPrefix { splitter: String },

    #[error("Invalid control markers: {0}")]
    InvalidMarkers(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_not_found_displays_family_and_version() {
        let err = Error::Catalog(CatalogError::ConfigurationNotFound {
            family: "llama3".into(),
            version: Some("3.1".into()),
        });
        assert!(err.to_string().contains("llama3"));
        assert!(err.to_string().contains("3.1"));
    }

    #[test]
    fn configuration_not_found_without_version() {
        let err = CatalogError::ConfigurationNotFound {
            family: "chatml".into(),
            version: None,
        };
        assert_eq!(
            err.to_string(),
            "No template configuration for family 'chatml'"
        );
    }

    #[test]
    fn malformed_memory_prefix_names_splitter() {
        let err: Error = FormatError::MalformedMemoryPrefix {
            splitter: "|||".into(),
        }
        .into();
        assert!(err.to_string().contains("|||"));
    }
}
