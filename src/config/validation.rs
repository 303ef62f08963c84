use crate::config::types::{Config, CookieEntry, SeedEntry};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.urls)?;
    validate_target(&config.target)?;
    config.browser_kind()?;
    validate_limits(config)?;
    validate_cookies(&config.cookies)?;

    Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    Ok(())
}

/// Validates seed entries
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "urls must contain at least one seed".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed.url.trim()).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS scheme",
                seed.url
            )));
        }

        if seed.extensions.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must list at least one extension",
                seed.url
            )));
        }

        if let Some(bad) = seed
            .extensions
            .iter()
            .find(|ext| ext.trim().trim_start_matches('.').is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' has an empty extension '{}'",
                seed.url, bad
            )));
        }
    }

    Ok(())
}

fn validate_target(target: &str) -> Result<(), ConfigError> {
    if target.trim().is_empty() {
        return Err(ConfigError::Validation("target cannot be empty".to_string()));
    }
    Ok(())
}

/// Validates concurrency limits and timeout
fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    if config.download_concurrency < 1 || config.download_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "download-concurrency must be between 1 and 100, got {}",
            config.download_concurrency
        )));
    }

    if config.render_concurrency < 1 || config.render_concurrency > 20 {
        return Err(ConfigError::Validation(format!(
            "render-concurrency must be between 1 and 20, got {}",
            config.render_concurrency
        )));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_cookies(cookies: &[CookieEntry]) -> Result<(), ConfigError> {
    for entry in cookies {
        Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid cookie URL '{}': {}", entry.url, e))
        })?;

        if entry.cookie.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Cookie for '{}' cannot be empty",
                entry.url
            )));
        }
    }
    Ok(())
}
