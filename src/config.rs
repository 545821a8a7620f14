use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::models::Config;

/// Load the config file at `path`, or the built-in configuration when no path is given.
/// `base_url` overrides whatever the configuration says.
pub fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(url) = base_url {
        config.api.base_url = url.to_string();
    }
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();

    if config.users.is_empty() {
        bail!("No users configured");
    }
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}
