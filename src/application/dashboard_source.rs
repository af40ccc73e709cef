// Source trait for backend dashboard data
use async_trait::async_trait;
use serde_json::Value;

/// Header the backend sets when the session must leave the dashboard
pub const REDIRECT_HEADER: &str = "X-Redirect-Location";

#[derive(Debug, Clone, PartialEq)]
pub struct SourceResponse {
    /// Value of the redirect header, if present
    pub redirect: Option<String>,
    pub body: Value,
}

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// GET one endpoint path (e.g. `/data/small`) and decode its JSON body
    async fn fetch(&self, endpoint: &str) -> anyhow::Result<SourceResponse>;
}
