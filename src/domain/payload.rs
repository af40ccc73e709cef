// Backend response shapes, decoded by key or position without further validation
use super::widget::{Point, Series, XValue};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct DataItem {
    #[serde(default)]
    pub x: Option<XValue>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// A datapoint is either an `{x, y}` object or a bare (nullable) number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeriesValue {
    Item(DataItem),
    Value(Option<f64>),
}

impl SeriesValue {
    fn into_point(self) -> Point {
        match self {
            SeriesValue::Item(item) => Point::new(item.x, item.y),
            SeriesValue::Value(y) => Point::new(None, y),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<SeriesValue>,
}

impl SeriesPayload {
    pub fn into_series(self) -> Series {
        let points = self.data.into_iter().map(SeriesValue::into_point).collect();
        Series::new(self.name, points)
    }
}

/// Body of a single-series endpoint: a series object or just its values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeriesBody {
    Series(SeriesPayload),
    Values(Vec<SeriesValue>),
}

impl SeriesBody {
    pub fn into_series(self, default_name: &str) -> Series {
        match self {
            SeriesBody::Series(payload) => {
                let mut series = payload.into_series();
                if series.name.is_empty() {
                    series.name = default_name.to_string();
                }
                series
            }
            SeriesBody::Values(values) => Series::new(
                default_name.to_string(),
                values.into_iter().map(SeriesValue::into_point).collect(),
            ),
        }
    }
}

pub fn into_series_list(payloads: Vec<SeriesPayload>) -> Vec<Series> {
    payloads.into_iter().map(SeriesPayload::into_series).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolItem {
    pub x: i64,
    pub y: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRow {
    pub block_type: Value,
    pub start: Value,
    pub length: Value,
    pub soc_in: Value,
    pub soc_out: Value,
    #[serde(default)]
    pub true_soc_in: Option<Value>,
    pub cost: Value,
    pub status: Value,
}

impl ScheduleRow {
    pub fn cells(&self) -> Vec<String> {
        let true_soc_in = match &self.true_soc_in {
            Some(v) if !v.is_null() => display(v),
            _ => "--".to_string(),
        };
        vec![
            display(&self.block_type),
            display(&self.start),
            display(&self.length),
            display(&self.soc_in),
            display(&self.soc_out),
            true_soc_in,
            display(&self.cost),
            display(&self.status),
        ]
    }
}

/// Renders a JSON scalar the way it reads on screen (strings unquoted).
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fields missing from a body leave their element or widget as it was.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SmallDashData {
    pub policy: Option<String>,
    pub temp_current: Option<f64>,
    pub temp_perceived: Option<f64>,
    pub forecast_symbol: Option<Vec<SymbolItem>>,
    pub today_max: Option<f64>,
    pub today_min: Option<f64>,
    pub yesterday_max: Option<f64>,
    pub yesterday_min: Option<f64>,
    pub temp_diagram: Option<Vec<SeriesPayload>>,
    pub tariffs_buy: Option<SeriesBody>,
    /// Null or absent until the next day's prices are published
    pub tariffs_buy_tomorrow: Option<SeriesBody>,
    pub base_cost: Option<f64>,
    pub schedule_cost: Option<f64>,
    pub schedule: Option<Vec<ScheduleRow>>,
    pub version: Option<String>,
    /// Client/server clock skew in milliseconds
    pub time_delta: i64,
    pub max_tariff: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullDashData {
    #[serde(flatten)]
    pub small: SmallDashData,
    #[serde(default)]
    pub realtime: Option<SeriesBody>,
    #[serde(default)]
    pub soc: Option<SeriesBody>,
    /// An empty list clears the widget, an absent one leaves it alone
    #[serde(default)]
    pub production: Option<Vec<SeriesPayload>>,
    #[serde(default)]
    pub load: Option<Vec<SeriesPayload>>,
    #[serde(default)]
    pub cloud: Option<SeriesBody>,
}
