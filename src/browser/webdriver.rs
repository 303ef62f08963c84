use super::{PageRenderer, RenderError};
use crate::config::BrowserKind;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;

/// Headless Firefox driven through a W3C WebDriver endpoint (geckodriver)
///
/// Each render opens a fresh session and deletes it afterwards, also when
/// navigation fails.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    endpoint: String,
    client: Client,
}

impl WebDriverRenderer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one WebDriver command and returns its `value`
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, RenderError> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.endpoint, path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let mut payload: Value = response.json().await?;
        let value = payload
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null);

        if !status.is_success() {
            let error = value["error"].as_str().unwrap_or("unknown error");
            let message = value["message"].as_str().unwrap_or_default();
            return Err(RenderError::Protocol(format!(
                "{} ({}): {}",
                error, status, message
            )));
        }

        Ok(value)
    }

    async fn create_session(&self) -> Result<String, RenderError> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "acceptInsecureCerts": true,
                    "moz:firefoxOptions": { "args": ["-headless"] }
                }
            }
        });

        let value = self
            .command(Method::POST, "/session", Some(capabilities))
            .await?;

        value["sessionId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RenderError::Launch("WebDriver returned no session id".to_string()))
    }

    async fn load(&self, session: &str, url: &str) -> Result<String, RenderError> {
        self.command(
            Method::POST,
            &format!("/session/{}/url", session),
            Some(json!({ "url": url })),
        )
        .await
        .map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let source = self
            .command(Method::GET, &format!("/session/{}/source", session), None)
            .await?;

        Ok(source.as_str().unwrap_or_default().to_string())
    }

    async fn delete_session(&self, session: &str) {
        if let Err(e) = self
            .command(Method::DELETE, &format!("/session/{}", session), None)
            .await
        {
            tracing::debug!("Failed to delete WebDriver session {}: {}", session, e);
        }
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    fn name(&self) -> &'static str {
        BrowserKind::Firefox.as_str()
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        tracing::debug!("Rendering {} via WebDriver at {}", url, self.endpoint);

        let session = self.create_session().await?;
        let result = self.load(&session, url).await;
        self.delete_session(&session).await;
        result
    }
}
