//! `promptweave config` — Configuration management commands.

use promptweave_catalog::TagCatalog;
use promptweave_config::AppConfig;

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   Config parsed successfully");

            let catalog = match &config.catalog_path {
                Some(path) => TagCatalog::load_from(path)?,
                None => TagCatalog::with_defaults(),
            };

            let mut warnings = Vec::new();
            if catalog.select(&config.family, config.version.as_deref()).is_err() {
                warnings.push(format!(
                    "Family '{}' has no matching catalog entry",
                    config.family
                ));
            }
            if config.engine.owner_colon_limit > 200 {
                warnings.push("owner_colon_limit is unusually large; prose lines may be read as owners".into());
            }

            if warnings.is_empty() {
                println!("   All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   warning: {w}");
                }
            }

            println!();
            println!("   Family:     {}", config.family);
            println!(
                "   Version:    {}",
                config.version.as_deref().unwrap_or("(first in catalog)")
            );
            println!(
                "   Catalog:    {}",
                config
                    .catalog_path
                    .as_ref()
                    .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
            );
            println!("   Templates:  {}", catalog.len());
            println!("   Colon limit: {}", config.engine.owner_colon_limit);
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = promptweave_config::AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&promptweave_config::AppConfig::default()).unwrap();
        assert!(toml_str.contains("family = \"chatml\""));
    }
}
