use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default end-to-end request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default number of simultaneous downloads
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 10;

/// Default number of simultaneous browser renders
pub const DEFAULT_RENDER_CONCURRENCY: usize = 5;

/// Default WebDriver endpoint (geckodriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Main configuration structure for Asset-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URLs, each with its own extension filter
    pub urls: Vec<SeedEntry>,

    /// Root directory downloads are written under
    pub target: String,

    /// Browser driver used when static extraction finds nothing
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Overrides the default User-Agent header
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Cookies injected before the first request
    #[serde(default)]
    pub cookies: Vec<CookieEntry>,

    /// End-to-end request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum number of downloads in flight
    #[serde(rename = "download-concurrency", default = "default_download_concurrency")]
    pub download_concurrency: usize,

    /// Maximum number of browser renders in flight
    #[serde(rename = "render-concurrency", default = "default_render_concurrency")]
    pub render_concurrency: usize,

    /// WebDriver endpoint for the firefox driver
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Config {
    /// Creates a configuration with the given seeds and every optional field at its default
    pub fn new(urls: Vec<SeedEntry>, target: impl Into<String>) -> Self {
        Self {
            urls,
            target: target.into(),
            browser: default_browser(),
            user_agent: None,
            headers: BTreeMap::new(),
            cookies: Vec::new(),
            timeout: default_timeout(),
            download_concurrency: default_download_concurrency(),
            render_concurrency: default_render_concurrency(),
            webdriver_url: default_webdriver_url(),
        }
    }

    /// Parses the configured browser name
    pub fn browser_kind(&self) -> Result<BrowserKind, crate::ConfigError> {
        self.browser.parse()
    }
}

/// One crawl root with its own extension filter
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeedEntry {
    /// Starting URL
    pub url: String,

    /// File extensions to collect (without the leading dot)
    pub extensions: Vec<String>,
}

/// A cookie to inject into the client's jar
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CookieEntry {
    /// URL the cookie is scoped to
    pub url: String,

    /// Cookie in `Set-Cookie` syntax, e.g. `session=abc; Path=/`
    pub cookie: String,
}

/// Supported browser drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chromium,
    Firefox,
    Disabled,
}

impl BrowserKind {
    /// Every accepted driver name, in the order they are reported to the user
    pub const ALLOWED: [&'static str; 3] = ["chromium", "firefox", "disabled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "chromium" => Ok(Self::Chromium),
            "firefox" => Ok(Self::Firefox),
            "disabled" => Ok(Self::Disabled),
            other => Err(crate::ConfigError::UnsupportedBrowser {
                name: other.to_string(),
                allowed: Self::ALLOWED.join(", "),
            }),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_browser() -> String {
    BrowserKind::Disabled.as_str().to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_download_concurrency() -> usize {
    DEFAULT_DOWNLOAD_CONCURRENCY
}

fn default_render_concurrency() -> usize {
    DEFAULT_RENDER_CONCURRENCY
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}
