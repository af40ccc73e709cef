// Data binders - apply one endpoint's response to its widgets and page elements
use crate::application::registry::WidgetRegistry;
use crate::application::widget_factory::WidgetError;
use crate::domain::annotation::{floor_to_quarter, skewed_millis};
use crate::domain::page::{Page, PageError};
use crate::domain::payload::{
    display, into_series_list, FullDashData, ScheduleRow, SeriesBody, SeriesPayload,
    SmallDashData, SymbolItem,
};
use chrono::{DateTime, Local, Timelike};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// Widget ids
pub const REALTIME: &str = "realtime";
pub const SOC: &str = "soc";
pub const TARIFFS_BUY: &str = "tariffs_buy";
pub const TARIFFS_TOMORROW: &str = "tariffs_tomorrow";
pub const PRODUCTION: &str = "production";
pub const LOAD: &str = "load";
pub const CLOUD: &str = "cloud";
pub const TEMP: &str = "temp";
pub const POLICY: &str = "policy";

// Page element ids
pub const POLICY_BAR: &str = "policy-bar";
pub const CURRENT_TEMP: &str = "current-temp";
pub const MINMAX_TODAY: &str = "minmax-today";
pub const MINMAX_YESTERDAY: &str = "minmax-yesterday";
pub const SYMBOLS: &str = "symbols";
pub const TARIFFS_TOMORROW_PANEL: &str = "tariffs-buy-tomorrow";
pub const SCHEDULE_SAVING: &str = "schedule-saving";
pub const SCHEDULE_BODY: &str = "schedule-body";
pub const VERSION: &str = "version";

#[derive(Debug, Error)]
pub enum BindError {
    #[error("unexpected payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("expected at least {expected} entries, got {actual}")]
    Shape { expected: usize, actual: usize },
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error(transparent)]
    Page(#[from] PageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    CombinedRealtime,
    TariffsBuy,
    CombinedProduction,
    CombinedLoad,
    ForecastCloud,
    ForecastTemp,
    Policy,
    SmallDash,
    /// Older path serving the same body as `SmallDash`
    SmallDashLegacy,
    FullDash,
}

impl Binding {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Binding::CombinedRealtime => "/combined_realtime",
            Binding::TariffsBuy => "/tariffs_buy",
            Binding::CombinedProduction => "/combined_production",
            Binding::CombinedLoad => "/combined_load",
            Binding::ForecastCloud => "/forecast_cloud",
            Binding::ForecastTemp => "/forecast_temp",
            Binding::Policy => "/policy",
            Binding::SmallDash => "/data/small",
            Binding::SmallDashLegacy => "/small_dash_data",
            Binding::FullDash => "/data/full",
        }
    }

    /// Decodes `body` and pushes it into the registry and page.
    ///
    /// Decoding happens before any mutation, so a malformed body leaves the
    /// previous data in place.
    pub fn apply(
        &self,
        body: Value,
        registry: &mut WidgetRegistry,
        page: &mut Page,
        now: DateTime<Local>,
    ) -> Result<(), BindError> {
        match self {
            Binding::CombinedRealtime => {
                let mut pairs: Vec<SeriesBody> = decode(body)?;
                if pairs.len() < 2 {
                    return Err(BindError::Shape {
                        expected: 2,
                        actual: pairs.len(),
                    });
                }
                let soc_policy = pairs.swap_remove(1);
                let prod_load = pairs.swap_remove(0);
                registry
                    .get_mut(REALTIME)?
                    .update_series(vec![prod_load.into_series("Production & Load")]);
                registry
                    .get_mut(SOC)?
                    .update_series(vec![soc_policy.into_series("SoC")]);
            }
            Binding::TariffsBuy => replace_single(registry, TARIFFS_BUY, body, "Tariffs")?,
            Binding::ForecastCloud => replace_single(registry, CLOUD, body, "Cloud factor")?,
            Binding::ForecastTemp => replace_single(registry, TEMP, body, "Temperature")?,
            Binding::Policy => replace_single(registry, POLICY, body, "Policy")?,
            Binding::CombinedProduction => replace_many(registry, PRODUCTION, body)?,
            Binding::CombinedLoad => replace_many(registry, LOAD, body)?,
            Binding::SmallDash | Binding::SmallDashLegacy => {
                let data: SmallDashData = decode(body)?;
                apply_small(data, registry, page, now)?;
            }
            Binding::FullDash => {
                let data: FullDashData = decode(body)?;
                apply_small(data.small, registry, page, now)?;
                if let Some(realtime) = data.realtime {
                    registry
                        .get_mut(REALTIME)?
                        .update_series(vec![realtime.into_series("Production & Load")]);
                }
                if let Some(soc) = data.soc {
                    registry
                        .get_mut(SOC)?
                        .update_series(vec![soc.into_series("SoC")]);
                }
                if let Some(production) = data.production {
                    registry
                        .get_mut(PRODUCTION)?
                        .update_series(into_series_list(production));
                }
                if let Some(load) = data.load {
                    registry
                        .get_mut(LOAD)?
                        .update_series(into_series_list(load));
                }
                if let Some(cloud) = data.cloud {
                    registry
                        .get_mut(CLOUD)?
                        .update_series(vec![cloud.into_series("Cloud factor")]);
                }
            }
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, BindError> {
    Ok(serde_json::from_value(body)?)
}

fn replace_single(
    registry: &mut WidgetRegistry,
    widget: &str,
    body: Value,
    name: &str,
) -> Result<(), BindError> {
    let series: SeriesBody = decode(body)?;
    registry
        .get_mut(widget)?
        .update_series(vec![series.into_series(name)]);
    Ok(())
}

fn replace_many(registry: &mut WidgetRegistry, widget: &str, body: Value) -> Result<(), BindError> {
    let series: Vec<SeriesPayload> = decode(body)?;
    registry
        .get_mut(widget)?
        .update_series(into_series_list(series));
    Ok(())
}

fn apply_small(
    data: SmallDashData,
    registry: &mut WidgetRegistry,
    page: &mut Page,
    now: DateTime<Local>,
) -> Result<(), BindError> {
    if let Some(policy) = &data.policy {
        let color = if policy == "Green" {
            "LimeGreen"
        } else {
            policy.as_str()
        };
        page.set_bar(POLICY_BAR, "100%", color)?;
    }
    if let (Some(current), Some(perceived)) = (data.temp_current, data.temp_perceived) {
        page.set_text(
            CURRENT_TEMP,
            format!(
                "{} ({}) ℃",
                round_one_decimal(current),
                round_one_decimal(perceived)
            ),
        )?;
    }
    if let (Some(max), Some(min)) = (data.today_max, data.today_min) {
        page.set_text(MINMAX_TODAY, format!("Today: {} / {} ℃", max, min))?;
    }
    if let (Some(max), Some(min)) = (data.yesterday_max, data.yesterday_min) {
        page.set_text(MINMAX_YESTERDAY, format!("Yesterday: {} / {} ℃", max, min))?;
    }
    if let Some(symbols) = &data.forecast_symbol {
        page.set_rows(SYMBOLS, symbol_rows(symbols, now))?;
    }

    if let Some(diagram) = data.temp_diagram {
        registry
            .get_mut(TEMP)?
            .update_series(into_series_list(diagram));
    }
    if let Some(tariffs) = data.tariffs_buy {
        registry
            .get_mut(TARIFFS_BUY)?
            .update_series(vec![tariffs.into_series("Tariffs")]);
    }
    match data.tariffs_buy_tomorrow {
        Some(tomorrow) => {
            page.set_visible(TARIFFS_TOMORROW_PANEL, true)?;
            registry
                .get_mut(TARIFFS_TOMORROW)?
                .update_series(vec![tomorrow.into_series("Tariffs tomorrow")]);
        }
        None => page.set_visible(TARIFFS_TOMORROW_PANEL, false)?,
    }

    if let (Some(base), Some(scheduled)) = (data.base_cost, data.schedule_cost) {
        page.set_text(
            SCHEDULE_SAVING,
            format!("Scheduling saves: {:.2}", base - scheduled),
        )?;
    }
    if let Some(schedule) = &data.schedule {
        page.set_rows(
            SCHEDULE_BODY,
            schedule.iter().map(ScheduleRow::cells).collect(),
        )?;
    }
    if let Some(version) = &data.version {
        page.set_text(VERSION, format!("Version: {}", version))?;
    }

    let marker = skewed_millis(now, data.time_delta);
    registry
        .get_mut(TARIFFS_BUY)?
        .set_annotation(floor_to_quarter(marker));
    registry.get_mut(TEMP)?.set_annotation(marker);
    if let Some(max_tariff) = data.max_tariff {
        for id in [TARIFFS_BUY, TARIFFS_TOMORROW] {
            registry
                .get_mut(id)?
                .set_y_range(Some(0.0), Some(max_tariff));
        }
    }

    Ok(())
}

/// Rounds half up like the viewer does, without producing "-0".
fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// One row per forecast hour: `[HH, symbol image, "past" | ""]`
fn symbol_rows(symbols: &[SymbolItem], now: DateTime<Local>) -> Vec<Vec<String>> {
    symbols
        .iter()
        .map(|symbol| {
            let hour = DateTime::from_timestamp_millis(symbol.x)
                .map(|t| t.hour())
                .unwrap_or(0);
            let past = if hour < now.hour() { "past" } else { "" };
            vec![
                format!("{:02}", hour),
                format!("/symbols/{}.webp", display(&symbol.y)),
                past.to_string(),
            ]
        })
        .collect()
}
