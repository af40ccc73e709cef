// Chart colours and threshold colouring rules
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Amber,
    Red,
    Blue,
}

impl Color {
    pub fn hex(&self) -> &'static str {
        match self {
            Color::Green => "#00E396",
            Color::Amber => "#FEB019",
            Color::Red => "#FF4560",
            Color::Blue => "#008FFB",
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

/// Piecewise three-band rule evaluated per datapoint.
///
/// `value <= low` picks `below`, values up to `high` pick `middle` (with `high`
/// itself included when `high_inclusive`), everything else picks `above`.
/// NaN compares false everywhere and therefore lands in `above`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorRule {
    pub low: f64,
    pub high: f64,
    pub high_inclusive: bool,
    pub below: Color,
    pub middle: Color,
    pub above: Color,
}

impl ColorRule {
    /// Buy tariffs in kr/kWh
    pub const TARIFF: ColorRule = ColorRule {
        low: 2.0,
        high: 4.0,
        high_inclusive: true,
        below: Color::Green,
        middle: Color::Amber,
        above: Color::Red,
    };

    /// State of health and policy percentages
    pub const PERCENT: ColorRule = ColorRule {
        low: 20.0,
        high: 70.0,
        high_inclusive: false,
        below: Color::Red,
        middle: Color::Amber,
        above: Color::Green,
    };

    /// Policy score on a 0-10 scale
    pub const POLICY_SCORE: ColorRule = ColorRule {
        low: 2.0,
        high: 7.0,
        high_inclusive: true,
        below: Color::Red,
        middle: Color::Amber,
        above: Color::Green,
    };

    pub fn color_for(&self, value: f64) -> Color {
        if value <= self.low {
            self.below
        } else if value < self.high || (self.high_inclusive && value == self.high) {
            self.middle
        } else {
            self.above
        }
    }
}

/// One palette slot: either a fixed colour or a value-dependent rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorSpec {
    Fixed { color: Color },
    Rule { rule: ColorRule },
}

impl ColorSpec {
    pub const fn fixed(color: Color) -> Self {
        ColorSpec::Fixed { color }
    }

    pub const fn rule(rule: ColorRule) -> Self {
        ColorSpec::Rule { rule }
    }

    pub fn resolve(&self, value: f64) -> Color {
        match self {
            ColorSpec::Fixed { color } => *color,
            ColorSpec::Rule { rule } => rule.color_for(value),
        }
    }
}
