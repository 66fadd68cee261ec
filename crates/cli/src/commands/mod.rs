//! Subcommand implementations and the helpers they share.

pub mod catalog;
pub mod config_cmd;
pub mod format;
pub mod split;

use crate::TemplateArgs;
use promptweave_catalog::TagCatalog;
use promptweave_config::AppConfig;
use promptweave_template::PromptFormatter;
use std::io::Read;
use std::path::Path;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Read a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &Path) -> CmdResult<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()).into())
}

/// The built-in catalog, or the file named by `path` (falling back to the
/// configured catalog path).
pub(crate) fn load_catalog(config: &AppConfig, path: Option<&Path>) -> CmdResult<TagCatalog> {
    match path.or(config.catalog_path.as_deref()) {
        Some(path) => Ok(TagCatalog::load_from(path)?),
        None => Ok(TagCatalog::with_defaults()),
    }
}

/// Build a formatter from config plus command-line overrides.
pub(crate) fn build_formatter(args: &TemplateArgs) -> CmdResult<PromptFormatter> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config, args.catalog.as_deref())?;
    let family = args.family.as_deref().unwrap_or(&config.family);
    // A family given on the command line does not inherit the configured version
    let version = match (&args.family, &args.version) {
        (_, Some(v)) => Some(v.as_str()),
        (Some(_), None) => None,
        (None, None) => config.version.as_deref(),
    };
    Ok(PromptFormatter::from_catalog(
        &catalog,
        family,
        version,
        config.engine,
    )?)
}
