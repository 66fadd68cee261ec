//! `promptweave catalog` — inspect template entries.

use super::load_catalog;
use promptweave_config::AppConfig;
use promptweave_template::ResolvedTags;
use std::path::Path;

/// List every entry in the active catalog.
pub fn list(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config, path)?;

    if catalog.is_empty() {
        println!("No templates in catalog.");
        return Ok(());
    }

    println!("Templates ({}):\n", catalog.len());
    for entry in catalog.entries() {
        let other = if entry.other_start.is_some() { "yes" } else { "no" };
        println!(
            "  {:<16} sys: {:<40} other: {}",
            entry.selector(),
            format!("{:?}", entry.sys_start),
            other
        );
    }
    Ok(())
}

/// Show the resolved markers of one entry.
pub fn show(
    family: &str,
    version: Option<&str>,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config, path)?;
    let tags = ResolvedTags::resolve(catalog.select(family, version)?);

    println!("Template: {}", tags.selector);
    println!("  beginning: {:?}", tags.beginning);
    for (role, markers) in tags.canonical() {
        println!(
            "  {:<9} start: {:?}  end: {:?}",
            format!("{role}:"),
            markers.start,
            markers.end
        );
    }
    if tags.other_configured {
        println!(
            "  other:    start: {:?}  postfix: {:?}  end: {:?}",
            tags.other.start, tags.other.postfix, tags.other.end
        );
    } else {
        println!("  other:    inline \"<name>: \" label");
    }
    Ok(())
}
