//! HTTP client shared by the crawler and the download manager

use super::filename::{resolve_filename, resolve_mime};
use super::FetchError;
use crate::config::{Config, CookieEntry};
use crate::progress::ProgressEntry;
use futures::StreamExt;
use reqwest::cookie::Jar;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
    USER_AGENT,
};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User-Agent sent when the configuration does not override it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 8_9_2; like Mac OS X) AppleWebKit/602.17 (KHTML, like Gecko)  Chrome/50.0.3965.134 Mobile Safari/603.2";

/// Upper bound for the up-front body allocation taken from Content-Length
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// A fully read response body with derived metadata
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// Name to store the body under
    pub filename: String,
    pub content: Vec<u8>,
    /// Sniffed or declared MIME type, empty when unknown
    pub mime: String,
    /// Declared Content-Length, 0 when absent
    pub size: u64,
}

impl FetchedPage {
    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Options the client is built from
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            headers: config.headers.clone(),
            timeout: Duration::from_secs(config.timeout),
        }
    }
}

/// HTTP client with a persistent cookie jar and default headers
///
/// Cheap to clone; clones share the connection pool and the jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpClient {
    /// Builds a client with the default User-Agent and timeout
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::with_options(&ClientOptions::default())
    }

    /// Builds a client from configuration, including its cookies
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Self::with_options(&ClientOptions::from_config(config))?;
        let added = client.set_cookies(&config.cookies);
        tracing::debug!("Injected {} of {} configured cookies", added, config.cookies.len());
        Ok(client)
    }

    pub fn with_options(options: &ClientOptions) -> Result<Self, FetchError> {
        let headers = build_headers(&options.user_agent, &options.headers)?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(options.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| FetchError::Build { source })?;

        Ok(Self { client, jar })
    }

    /// Adds cookies to the jar, returning how many were accepted
    ///
    /// Entries whose URL does not parse are skipped with a warning.
    pub fn set_cookies(&self, cookies: &[CookieEntry]) -> usize {
        let mut added = 0;
        for entry in cookies {
            match Url::parse(&entry.url) {
                Ok(url) => {
                    self.jar.add_cookie_str(&entry.cookie, &url);
                    added += 1;
                }
                Err(e) => tracing::warn!("Skipping cookie for {}: {}", entry.url, e),
            }
        }
        added
    }

    /// Fetches `url` and reads the whole body
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetch(url, None, None).await
    }

    /// Fetches `url` with extra request headers layered over the defaults
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<FetchedPage, FetchError> {
        self.fetch(url, Some(headers), None).await
    }

    /// Fetches `url`, updating `entry` as body chunks arrive
    pub async fn get_tracked(
        &self,
        url: &str,
        entry: &ProgressEntry,
    ) -> Result<FetchedPage, FetchError> {
        self.fetch(url, None, Some(entry)).await
    }

    async fn fetch(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        entry: Option<&ProgressEntry>,
    ) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut request = self.client.get(parsed);
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|source| FetchError::from_reqwest(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = header_string(response.headers(), CONTENT_TYPE);
        let disposition = header_string(response.headers(), CONTENT_DISPOSITION);
        let size = header_string(response.headers(), CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let mut content = Vec::with_capacity(size.min(MAX_PREALLOC) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::from_reqwest(url, source))?;
            content.extend_from_slice(&chunk);
            if let Some(entry) = entry {
                entry.update(content.len() as u64, size);
            }
        }

        let filename = resolve_filename(disposition.as_deref(), &content, content_type.as_deref());
        let mime = resolve_mime(&content, content_type.as_deref());

        tracing::debug!("Fetched {} ({} bytes, {})", url, content.len(), mime);

        Ok(FetchedPage {
            url: url.to_string(),
            filename,
            content,
            mime,
            size,
        })
    }
}

fn build_headers(
    user_agent: &str,
    extra: &BTreeMap<String, String>,
) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, parse_value(USER_AGENT.as_str(), user_agent)?);

    for (name, value) in extra {
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;
        headers.insert(header, parse_value(name, value)?);
    }

    Ok(headers)
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
