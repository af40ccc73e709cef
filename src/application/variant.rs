// Dashboard variants - the fixed set of elements, widgets and bindings each page uses
use crate::application::binder::*;
use crate::application::widget_factory::{WidgetOverrides, WidgetSpec};
use crate::domain::annotation::{current_hour_millis, wall_clock_millis};
use crate::domain::color::ColorRule;
use crate::domain::page::DIM_OVERLAY;
use crate::domain::widget::WidgetKind;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Wall display fed by `/data/small`
    #[default]
    Essential,
    /// Every widget, fed by `/data/full`
    Full,
    /// Per-widget `/combined_*` and `/forecast_*` endpoints
    Combined,
    /// Realtime, SoC and tariffs only
    Short,
}

/// Where a marker goes at the start of each refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    CurrentHour,
    WallClock,
}

impl Anchor {
    pub fn position(&self, now: DateTime<Local>) -> i64 {
        match self {
            Anchor::CurrentHour => current_hour_millis(now),
            Anchor::WallClock => wall_clock_millis(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationRule {
    pub widget: &'static str,
    pub anchor: Anchor,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub elements: Vec<&'static str>,
    pub widgets: Vec<WidgetSpec>,
    pub bindings: Vec<Binding>,
    pub annotations: Vec<AnnotationRule>,
    pub quiet_hours: bool,
}

const SMALL_ELEMENTS: [&str; 11] = [
    DIM_OVERLAY,
    SYMBOLS,
    POLICY_BAR,
    CURRENT_TEMP,
    MINMAX_TODAY,
    MINMAX_YESTERDAY,
    TARIFFS_TOMORROW_PANEL,
    SCHEDULE_SAVING,
    SCHEDULE_BODY,
    VERSION,
    "temperature",
];

impl Variant {
    pub fn layout(&self) -> Layout {
        match self {
            Variant::Essential => Layout {
                elements: [&SMALL_ELEMENTS[..], &["tariffs-buy"][..]].concat(),
                widgets: vec![
                    WidgetSpec::new(TEMP, WidgetKind::Temperature, "temperature"),
                    WidgetSpec::new(TARIFFS_BUY, WidgetKind::TariffBars, "tariffs-buy"),
                    tomorrow_tariffs(),
                ],
                bindings: vec![Binding::SmallDash],
                annotations: Vec::new(),
                quiet_hours: true,
            },
            Variant::Full => Layout {
                elements: [
                    &SMALL_ELEMENTS[..],
                    &[
                        "tariffs-buy",
                        "realtime",
                        "soc",
                        "production",
                        "load",
                        "cloud-factor",
                    ][..],
                ]
                .concat(),
                widgets: vec![
                    WidgetSpec::new(REALTIME, WidgetKind::RealtimeBars, "realtime"),
                    WidgetSpec::new(SOC, WidgetKind::StateOfCharge, "soc"),
                    WidgetSpec::new(TARIFFS_BUY, WidgetKind::TariffBars, "tariffs-buy"),
                    tomorrow_tariffs(),
                    WidgetSpec::new(PRODUCTION, WidgetKind::ProductionSeries, "production"),
                    WidgetSpec::new(LOAD, WidgetKind::LoadSeries, "load"),
                    WidgetSpec::new(CLOUD, WidgetKind::CloudFactor, "cloud-factor"),
                    WidgetSpec::new(TEMP, WidgetKind::Temperature, "temperature"),
                ],
                bindings: vec![Binding::FullDash],
                annotations: Vec::new(),
                quiet_hours: false,
            },
            Variant::Combined => Layout {
                elements: vec![
                    DIM_OVERLAY,
                    "realtime",
                    "soc",
                    "tariffs-buy",
                    "production",
                    "load",
                    "cloud-factor",
                    "temperature",
                    "policy",
                ],
                widgets: vec![
                    WidgetSpec::new(REALTIME, WidgetKind::RealtimeBars, "realtime"),
                    WidgetSpec::new(SOC, WidgetKind::StateOfCharge, "soc"),
                    WidgetSpec::new(TARIFFS_BUY, WidgetKind::TariffBars, "tariffs-buy"),
                    WidgetSpec::new(PRODUCTION, WidgetKind::ProductionSeries, "production"),
                    WidgetSpec::new(LOAD, WidgetKind::LoadSeries, "load"),
                    WidgetSpec::new(CLOUD, WidgetKind::CloudFactor, "cloud-factor"),
                    WidgetSpec::new(TEMP, WidgetKind::Temperature, "temperature"),
                    WidgetSpec::new(POLICY, WidgetKind::UsagePolicy, "policy"),
                ],
                bindings: vec![
                    Binding::CombinedRealtime,
                    Binding::TariffsBuy,
                    Binding::CombinedProduction,
                    Binding::CombinedLoad,
                    Binding::ForecastCloud,
                    Binding::ForecastTemp,
                    Binding::Policy,
                ],
                annotations: vec![
                    AnnotationRule {
                        widget: TARIFFS_BUY,
                        anchor: Anchor::CurrentHour,
                    },
                    AnnotationRule {
                        widget: TEMP,
                        anchor: Anchor::WallClock,
                    },
                ],
                quiet_hours: false,
            },
            Variant::Short => Layout {
                elements: vec![DIM_OVERLAY, "realtime", "soc", "tariffs-buy"],
                widgets: vec![
                    WidgetSpec::new(REALTIME, WidgetKind::RealtimeBars, "realtime"),
                    WidgetSpec::new(SOC, WidgetKind::StateOfCharge, "soc").with(
                        WidgetOverrides {
                            title: Some("Current SoC & Policy"),
                            rule: Some(ColorRule::POLICY_SCORE),
                            ..Default::default()
                        },
                    ),
                    WidgetSpec::new(TARIFFS_BUY, WidgetKind::TariffBars, "tariffs-buy").with(
                        WidgetOverrides {
                            title: Some("Tariffs Buy"),
                            height: Some(350),
                            y_max: Some(10.0),
                            ..Default::default()
                        },
                    ),
                ],
                bindings: vec![Binding::CombinedRealtime, Binding::TariffsBuy],
                annotations: vec![AnnotationRule {
                    widget: TARIFFS_BUY,
                    anchor: Anchor::CurrentHour,
                }],
                quiet_hours: false,
            },
        }
    }
}

impl Layout {
    /// Reads the small dashboard object from `/small_dash_data`, for
    /// backends that predate `/data/small`.
    pub fn with_legacy_small_path(mut self) -> Self {
        for binding in &mut self.bindings {
            if *binding == Binding::SmallDash {
                *binding = Binding::SmallDashLegacy;
            }
        }
        self
    }
}

fn tomorrow_tariffs() -> WidgetSpec {
    WidgetSpec::new(TARIFFS_TOMORROW, WidgetKind::TariffBars, TARIFFS_TOMORROW_PANEL).with(
        WidgetOverrides {
            title: Some("Tariffs Tomorrow"),
            ..Default::default()
        },
    )
}
