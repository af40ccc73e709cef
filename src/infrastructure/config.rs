use crate::application::variant::Variant;
use crate::domain::quiet_hours::{QuietHours, QuietHoursError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub quiet_hours: QuietHoursSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// Value of the backend's session cookie
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl RefreshSettings {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuietHoursSettings {
    /// Unset means "whatever the variant does"
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default = "default_active_from")]
    pub active_from: String,
    #[serde(default = "default_active_until")]
    pub active_until: String,
}

impl Default for QuietHoursSettings {
    fn default() -> Self {
        Self {
            enabled: None,
            active_from: default_active_from(),
            active_until: default_active_until(),
        }
    }
}

impl QuietHoursSettings {
    pub fn window(&self, variant_default: bool) -> Result<Option<QuietHours>, QuietHoursError> {
        if self.enabled.unwrap_or(variant_default) {
            QuietHours::parse(&self.active_from, &self.active_until).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardSettings {
    #[serde(default)]
    pub variant: Variant,
    /// Fetch the small dashboard object from `/small_dash_data`
    #[serde(default)]
    pub legacy_small_path: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    60
}

fn default_active_from() -> String {
    "06:00".to_string()
}

fn default_active_until() -> String {
    "22:00".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8090".to_string()
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_dashboard_config_from("config/dashboard")
}

/// Reads `name` (extension optional) and applies `MYGRID__SECTION__KEY` overrides
pub fn load_dashboard_config_from(name: &str) -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name))
        .add_source(
            config::Environment::with_prefix("MYGRID")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
