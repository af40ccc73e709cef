// Widget domain models
use super::color::{Color, ColorSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    RealtimeBars,
    StateOfCharge,
    TariffBars,
    ProductionSeries,
    LoadSeries,
    CloudFactor,
    Temperature,
    UsagePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Category,
    Datetime,
}

/// Static visual configuration of a widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetConfig {
    pub title: String,
    pub chart_type: ChartType,
    pub height: u32,
    pub x_axis: AxisKind,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub unit: Option<String>,
    pub palette: Vec<ColorSpec>,
    /// Colour per datapoint instead of per series
    pub distributed: bool,
    pub smooth: bool,
    pub fill_opacity: f64,
    pub data_labels: bool,
    pub group: Option<String>,
    pub no_data_text: String,
}

/// X position of a datapoint: epoch millis (local wall clock) or a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XValue {
    Time(i64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: Option<XValue>,
    pub y: Option<f64>,
    pub color: Option<Color>,
}

impl Point {
    pub fn new(x: Option<XValue>, y: Option<f64>) -> Self {
        Self { x, y, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: String, points: Vec<Point>) -> Self {
        Self { name, points }
    }
}

#[cfg(test)]
impl Series {
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn colors(&self) -> Vec<Option<Color>> {
        self.points.iter().map(|p| p.color).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    pub mount: String,
    pub config: WidgetConfig,
    pub series: Vec<Series>,
    /// X position of the "current time" marker
    pub annotation: Option<i64>,
}

impl Widget {
    pub fn new(id: String, kind: WidgetKind, mount: String, config: WidgetConfig) -> Self {
        Self {
            id,
            kind,
            mount,
            config,
            series: Vec::new(),
            annotation: None,
        }
    }

    /// Replaces all series and recolours every datapoint from the palette.
    pub fn update_series(&mut self, mut series: Vec<Series>) {
        let palette = &self.config.palette;
        if !palette.is_empty() {
            for (s_idx, s) in series.iter_mut().enumerate() {
                for (p_idx, point) in s.points.iter_mut().enumerate() {
                    let slot = if self.config.distributed { p_idx } else { s_idx };
                    let spec = palette[slot % palette.len()];
                    point.color = point.y.map(|y| spec.resolve(y));
                }
            }
        }
        self.series = series;
    }

    pub fn set_annotation(&mut self, x: i64) {
        self.annotation = Some(x);
    }

    pub fn set_y_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.config.y_min = min;
        self.config.y_max = max;
    }
}

#[cfg(test)]
impl Widget {
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::ColorRule;

    fn config(palette: Vec<ColorSpec>, distributed: bool) -> WidgetConfig {
        WidgetConfig {
            title: "Test".to_string(),
            chart_type: ChartType::Bar,
            height: 200,
            x_axis: AxisKind::Category,
            y_min: None,
            y_max: None,
            unit: None,
            palette,
            distributed,
            smooth: false,
            fill_opacity: 1.0,
            data_labels: false,
            group: None,
            no_data_text: "Loading...".to_string(),
        }
    }

    fn bars(values: &[f64]) -> Series {
        let points = values.iter().map(|v| Point::new(None, Some(*v))).collect();
        Series::new("bars".to_string(), points)
    }

    #[test]
    fn test_update_series_colours_each_point_by_rule() {
        let mut widget = Widget::new(
            "tariffs".to_string(),
            WidgetKind::TariffBars,
            "tariffs-buy".to_string(),
            config(vec![ColorSpec::rule(ColorRule::TARIFF)], false),
        );
        widget.update_series(vec![bars(&[1.0, 3.0, 5.0])]);

        assert_eq!(
            widget.series[0].colors(),
            vec![Some(Color::Green), Some(Color::Amber), Some(Color::Red)]
        );
    }

    #[test]
    fn test_distributed_palette_indexes_by_point() {
        let mut widget = Widget::new(
            "soc".to_string(),
            WidgetKind::StateOfCharge,
            "soc".to_string(),
            config(
                vec![ColorSpec::fixed(Color::Amber), ColorSpec::rule(ColorRule::PERCENT)],
                true,
            ),
        );
        widget.update_series(vec![bars(&[10.0, 15.0])]);

        assert_eq!(
            widget.series[0].colors(),
            vec![Some(Color::Amber), Some(Color::Red)]
        );
    }

    #[test]
    fn test_update_series_replaces_previous_data() {
        let mut widget = Widget::new(
            "load".to_string(),
            WidgetKind::LoadSeries,
            "load".to_string(),
            config(vec![ColorSpec::fixed(Color::Blue), ColorSpec::fixed(Color::Red)], false),
        );
        widget.update_series(vec![bars(&[1.0, 2.0]), bars(&[3.0])]);
        widget.update_series(vec![bars(&[4.0])]);

        assert_eq!(widget.series.len(), 1);
        assert_eq!(widget.series[0].values(), vec![Some(4.0)]);
        assert_eq!(widget.series[0].colors(), vec![Some(Color::Blue)]);
    }

    #[test]
    fn test_null_values_stay_uncoloured() {
        let mut widget = Widget::new(
            "tariffs".to_string(),
            WidgetKind::TariffBars,
            "tariffs-buy".to_string(),
            config(vec![ColorSpec::rule(ColorRule::TARIFF)], false),
        );
        let series = Series::new("gap".to_string(), vec![Point::new(None, None)]);
        widget.update_series(vec![series]);

        assert_eq!(widget.series[0].colors(), vec![None]);
        assert!(widget.has_data());
    }
}
