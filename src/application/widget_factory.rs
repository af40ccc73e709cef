// Widget factory - static chart configuration per widget kind
use crate::domain::color::{Color, ColorRule, ColorSpec};
use crate::domain::page::Page;
use crate::domain::widget::{AxisKind, ChartType, Widget, WidgetConfig, WidgetKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WidgetError {
    #[error("mount point '{mount}' for widget '{widget}' does not exist")]
    MountPointMissing { widget: String, mount: String },
    #[error("widget '{0}' is declared twice")]
    DuplicateWidget(String),
    #[error("no widget with id '{0}'")]
    UnknownWidget(String),
}

/// Per-variant tweaks on top of the kind's defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetOverrides {
    pub title: Option<&'static str>,
    pub height: Option<u32>,
    pub y_max: Option<f64>,
    /// Replaces every rule slot of the palette
    pub rule: Option<ColorRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub id: &'static str,
    pub kind: WidgetKind,
    pub mount: &'static str,
    pub overrides: WidgetOverrides,
}

impl WidgetSpec {
    pub fn new(id: &'static str, kind: WidgetKind, mount: &'static str) -> Self {
        Self {
            id,
            kind,
            mount,
            overrides: WidgetOverrides::default(),
        }
    }

    pub fn with(mut self, overrides: WidgetOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Builds an empty widget, refusing mount points the page does not have.
pub fn build_widget(spec: &WidgetSpec, page: &Page) -> Result<Widget, WidgetError> {
    if !page.contains(spec.mount) {
        return Err(WidgetError::MountPointMissing {
            widget: spec.id.to_string(),
            mount: spec.mount.to_string(),
        });
    }

    let mut config = config_for(spec.kind);
    let overrides = &spec.overrides;
    if let Some(title) = overrides.title {
        config.title = title.to_string();
    }
    if let Some(height) = overrides.height {
        config.height = height;
    }
    if overrides.y_max.is_some() {
        config.y_max = overrides.y_max;
    }
    if let Some(rule) = overrides.rule {
        for slot in config.palette.iter_mut() {
            if matches!(slot, ColorSpec::Rule { .. }) {
                *slot = ColorSpec::rule(rule);
            }
        }
    }

    Ok(Widget::new(
        spec.id.to_string(),
        spec.kind,
        spec.mount.to_string(),
        config,
    ))
}

pub fn config_for(kind: WidgetKind) -> WidgetConfig {
    match kind {
        WidgetKind::RealtimeBars => bar_config(
            "Current Production & Load",
            350,
            None,
            Some("kW"),
            vec![ColorSpec::fixed(Color::Green), ColorSpec::fixed(Color::Red)],
            true,
        ),
        WidgetKind::StateOfCharge => bar_config(
            "Current SoC & SoH",
            350,
            Some(100.0),
            Some("%"),
            vec![
                ColorSpec::fixed(Color::Amber),
                ColorSpec::rule(ColorRule::PERCENT),
            ],
            true,
        ),
        WidgetKind::UsagePolicy => bar_config(
            "Policy",
            200,
            Some(100.0),
            Some("%"),
            vec![ColorSpec::rule(ColorRule::PERCENT)],
            false,
        ),
        WidgetKind::TariffBars => WidgetConfig {
            x_axis: AxisKind::Datetime,
            fill_opacity: 0.8,
            data_labels: false,
            ..bar_config(
                "Tariffs",
                200,
                Some(8.0),
                Some("kr"),
                vec![ColorSpec::rule(ColorRule::TARIFF)],
                false,
            )
        },
        WidgetKind::ProductionSeries => series_config(
            "Power Production",
            ChartType::Line,
            None,
            Some("kW"),
            vec![ColorSpec::fixed(Color::Blue), ColorSpec::fixed(Color::Green)],
            0.35,
            "mygrid",
        ),
        WidgetKind::LoadSeries => series_config(
            "Power Load",
            ChartType::Line,
            None,
            Some("kW"),
            vec![ColorSpec::fixed(Color::Blue), ColorSpec::fixed(Color::Red)],
            0.35,
            "mygrid",
        ),
        WidgetKind::CloudFactor => series_config(
            "Cloud Factor",
            ChartType::Area,
            Some(1.0),
            None,
            vec![ColorSpec::fixed(Color::Red)],
            0.35,
            "forecast",
        ),
        WidgetKind::Temperature => WidgetConfig {
            data_labels: true,
            ..series_config(
                "Temperature",
                ChartType::Line,
                None,
                Some("℃"),
                vec![
                    ColorSpec::fixed(Color::Amber),
                    ColorSpec::fixed(Color::Green),
                    ColorSpec::fixed(Color::Red),
                ],
                1.0,
                "forecast",
            )
        },
    }
}

fn bar_config(
    title: &str,
    height: u32,
    y_max: Option<f64>,
    unit: Option<&str>,
    palette: Vec<ColorSpec>,
    distributed: bool,
) -> WidgetConfig {
    WidgetConfig {
        title: title.to_string(),
        chart_type: ChartType::Bar,
        height,
        x_axis: AxisKind::Category,
        y_min: y_max.map(|_| 0.0),
        y_max,
        unit: unit.map(str::to_string),
        palette,
        distributed,
        smooth: false,
        fill_opacity: 0.7,
        data_labels: true,
        group: None,
        no_data_text: "Loading...".to_string(),
    }
}

fn series_config(
    title: &str,
    chart_type: ChartType,
    y_max: Option<f64>,
    unit: Option<&str>,
    palette: Vec<ColorSpec>,
    fill_opacity: f64,
    group: &str,
) -> WidgetConfig {
    WidgetConfig {
        title: title.to_string(),
        chart_type,
        height: 200,
        x_axis: AxisKind::Datetime,
        y_min: y_max.map(|_| 0.0),
        y_max,
        unit: unit.map(str::to_string),
        palette,
        distributed: false,
        smooth: true,
        fill_opacity,
        data_labels: false,
        group: Some(group.to_string()),
        no_data_text: "Loading...".to_string(),
    }
}
