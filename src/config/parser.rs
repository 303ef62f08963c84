use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "crawl.yaml";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the YAML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - The file is missing, unreadable, malformed or invalid
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use asset_spider::config::load_config;
///
/// let config = load_config(Path::new("crawl.yaml")).unwrap();
/// println!("Seeds: {}", config.urls.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(not_found(path));
    }

    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from YAML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn not_found(path: &Path) -> ConfigError {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    ConfigError::NotFound { name, parent }
}
