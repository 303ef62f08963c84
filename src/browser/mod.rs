//! Headless-browser rendering for pages whose assets only appear at runtime
//!
//! The crawler talks to a [`PageRenderer`] and never to a concrete driver.
//! Which driver backs it is chosen from configuration by [`renderer_for`]:
//!
//! - `chromium`: [`ChromiumRenderer`], Chrome DevTools Protocol via `chromiumoxide`
//! - `firefox`: [`WebDriverRenderer`], W3C WebDriver against geckodriver
//! - `disabled`: [`DisabledRenderer`], never invoked

mod chromium;
mod webdriver;

use crate::config::{BrowserKind, Config};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use chromium::ChromiumRenderer;
pub use webdriver::WebDriverRenderer;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser protocol error: {0}")]
    Protocol(String),

    #[error("WebDriver request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A capability that turns a URL into fully evaluated HTML
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Driver name as written in configuration
    fn name(&self) -> &'static str;

    /// Whether the crawler should fall back to this renderer at all
    fn is_enabled(&self) -> bool {
        true
    }

    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Renderer used when no browser is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRenderer;

#[async_trait]
impl PageRenderer for DisabledRenderer {
    fn name(&self) -> &'static str {
        BrowserKind::Disabled.as_str()
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        Ok(String::new())
    }
}

/// Renders `url`, turning any failure into an empty document
pub async fn render_or_empty(renderer: &dyn PageRenderer, url: &str) -> String {
    match renderer.render(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("{} renderer failed for {}: {}", renderer.name(), url, e);
            String::new()
        }
    }
}

/// Builds the renderer selected by `config.browser`
pub fn renderer_for(config: &Config) -> crate::Result<Arc<dyn PageRenderer>> {
    let renderer: Arc<dyn PageRenderer> = match config.browser_kind()? {
        BrowserKind::Chromium => Arc::new(ChromiumRenderer::new()),
        BrowserKind::Firefox => Arc::new(WebDriverRenderer::new(
            &config.webdriver_url,
            Duration::from_secs(config.timeout),
        )?),
        BrowserKind::Disabled => Arc::new(DisabledRenderer),
    };

    tracing::debug!(
        "Browser fallback: {} (enabled: {})",
        renderer.name(),
        renderer.is_enabled()
    );
    Ok(renderer)
}
