// Backend HTTP source implementation
use crate::application::dashboard_source::{DashboardSource, SourceResponse, REDIRECT_HEADER};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use serde_json::Value;
use std::time::Duration;

/// Cookie name the backend keys its sessions on
const SESSION_COOKIE: &str = "mygrid_dash";

#[derive(Debug, Clone)]
pub struct HttpDashboardSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDashboardSource {
    pub fn new(base_url: &str, session: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(session) = session {
            let cookie = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, session))
                .context("Session cookie contains invalid characters")?;
            headers.insert(COOKIE, cookie);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardSource {
    async fn fetch(&self, endpoint: &str) -> Result<SourceResponse> {
        let url = self.build_url(endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let redirect = response
            .headers()
            .get(REDIRECT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(location) = redirect {
            // The body of a redirect is informational only
            return Ok(SourceResponse {
                redirect: Some(location),
                body: Value::Null,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with status {}: {}", endpoint, status, body);
        }

        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse {} response", endpoint))?;

        Ok(SourceResponse {
            redirect: None,
            body,
        })
    }
}
