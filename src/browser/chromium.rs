use super::{PageRenderer, RenderError};
use crate::config::BrowserKind;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Headless Chromium driven over the DevTools Protocol
///
/// Every render launches its own browser with a throwaway profile and closes
/// it afterwards. Concurrent renders never share a profile directory.
#[derive(Debug, Default)]
pub struct ChromiumRenderer {
    launches: AtomicU64,
}

impl ChromiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn profile_dir(&self) -> PathBuf {
        let n = self.launches.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("asset_spider_chrome_{}_{}", std::process::id(), n))
    }

    async fn render_in(&self, url: &str, profile: PathBuf) -> Result<String, RenderError> {
        let config = BrowserConfig::builder()
            .user_data_dir(profile)
            .arg("--ignore-certificate-errors")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--mute-audio")
            .build()
            .map_err(RenderError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {:?}", e);
                }
            }
        });

        let content = load(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to reap browser process: {}", e);
        }
        handler_task.abort();

        content
    }
}

async fn load(browser: &Browser, url: &str) -> Result<String, RenderError> {
    let navigation = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let page = browser.new_page(url).await.map_err(navigation)?;
    page.wait_for_navigation().await.map_err(navigation)?;
    let content = page
        .content()
        .await
        .map_err(|e| RenderError::Protocol(e.to_string()))?;

    if let Err(e) = page.close().await {
        tracing::trace!("Failed to close page: {}", e);
    }
    Ok(content)
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        BrowserKind::Chromium.as_str()
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        tracing::debug!("Rendering {} in Chromium", url);

        let profile = self.profile_dir();
        let result = self.render_in(url, profile.clone()).await;

        if profile.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&profile).await {
                tracing::warn!("Failed to remove profile {}: {}", profile.display(), e);
            }
        }

        result
    }
}
