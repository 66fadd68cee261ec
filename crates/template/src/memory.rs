//! Memory note handling.
//!
//! The memory note may carry a system text in front of the memory proper:
//! `System:<system text>|||<memory text>`.

use promptweave_config::MemoryConfig;
use promptweave_core::FormatError;

/// The memory note split into its system and memory parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNote<'a> {
    pub system: Option<&'a str>,
    pub memory: &'a str,
}

/// Split a raw memory note at the first splitter when it starts with the
/// system prefix.
pub fn split_memory<'a>(raw: &'a str, config: &MemoryConfig) -> Result<MemoryNote<'a>, FormatError> {
    let Some(rest) = raw.strip_prefix(config.system_prefix.as_str()) else {
        return Ok(MemoryNote {
            system: None,
            memory: raw,
        });
    };
    match rest.split_once(config.splitter.as_str()) {
        Some((system, memory)) => Ok(MemoryNote {
            system: Some(system),
            memory,
        }),
        None => Err(FormatError::MalformedMemoryPrefix {
            splitter: config.splitter.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_memory_passes_through() {
        let note = split_memory("Bob likes tea", &MemoryConfig::default()).unwrap();
        assert_eq!(note.system, None);
        assert_eq!(note.memory, "Bob likes tea");
    }

    #[test]
    fn system_prefix_splits_once() {
        let note = split_memory("System:Be kind|||Bob|||likes tea", &MemoryConfig::default()).unwrap();
        assert_eq!(note.system, Some("Be kind"));
        assert_eq!(note.memory, "Bob|||likes tea");
    }

    #[test]
    fn missing_splitter_is_malformed() {
        let err = split_memory("System:Be kind", &MemoryConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::MalformedMemoryPrefix { ref splitter } if splitter == "|||"));
    }

    #[test]
    fn empty_memory_is_fine() {
        let note = split_memory("", &MemoryConfig::default()).unwrap();
        assert_eq!(note.memory, "");
    }
}
