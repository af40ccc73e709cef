// Quiet hours window and the screen dimming state machine
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QuietHoursError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Local time range during which polling runs. Outside it the screen is dimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    active_from: u32,
    active_until: u32,
}

impl QuietHours {
    pub fn new(active_from: NaiveTime, active_until: NaiveTime) -> Self {
        Self {
            active_from: minute_of_day(active_from),
            active_until: minute_of_day(active_until),
        }
    }

    pub fn parse(active_from: &str, active_until: &str) -> Result<Self, QuietHoursError> {
        Ok(Self::new(parse_hhmm(active_from)?, parse_hhmm(active_until)?))
    }

    /// Minute resolution; a window wrapping midnight is allowed.
    pub fn is_active(&self, time: NaiveTime) -> bool {
        let now = minute_of_day(time);
        if self.active_from <= self.active_until {
            self.active_from == self.active_until
                || (now >= self.active_from && now < self.active_until)
        } else {
            now >= self.active_from || now < self.active_until
        }
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, QuietHoursError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| QuietHoursError::InvalidTime(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimState {
    Active,
    Dimmed,
}

#[derive(Debug, Clone)]
pub struct ScreenDimmer {
    window: Option<QuietHours>,
    state: DimState,
}

impl ScreenDimmer {
    pub fn new(window: Option<QuietHours>) -> Self {
        Self {
            window,
            state: DimState::Active,
        }
    }

    pub fn state(&self) -> DimState {
        self.state
    }

    /// Decides whether a tick at `now` may fetch. Forced ticks always may.
    pub fn admit(&mut self, now: NaiveTime, force: bool) -> bool {
        let inside = self.window.map(|w| w.is_active(now)).unwrap_or(true);
        if inside || force {
            self.state = DimState::Active;
            true
        } else {
            self.state = DimState::Dimmed;
            false
        }
    }

    /// Ends a manual undim period. Without a window there is nothing to dim.
    pub fn dim(&mut self) {
        if self.window.is_some() {
            self.state = DimState::Dimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_daytime_window() {
        let window = QuietHours::parse("06:00", "22:00").unwrap();
        assert!(!window.is_active(at(5, 59)));
        assert!(window.is_active(at(6, 0)));
        assert!(window.is_active(at(21, 59)));
        assert!(!window.is_active(at(22, 0)));
        assert!(!window.is_active(at(23, 0)));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let window = QuietHours::parse("20:00", "02:00").unwrap();
        assert!(window.is_active(at(23, 30)));
        assert!(window.is_active(at(1, 0)));
        assert!(!window.is_active(at(12, 0)));
    }

    #[test]
    fn test_rejects_bad_time() {
        assert_eq!(
            QuietHours::parse("6am", "22:00"),
            Err(QuietHoursError::InvalidTime("6am".to_string()))
        );
    }

    #[test]
    fn test_dimmer_transitions() {
        let mut dimmer = ScreenDimmer::new(Some(QuietHours::parse("06:00", "22:00").unwrap()));

        assert!(!dimmer.admit(at(23, 0), false));
        assert_eq!(dimmer.state(), DimState::Dimmed);

        assert!(dimmer.admit(at(23, 1), true));
        assert_eq!(dimmer.state(), DimState::Active);

        dimmer.dim();
        assert_eq!(dimmer.state(), DimState::Dimmed);

        assert!(dimmer.admit(at(7, 0), false));
        assert_eq!(dimmer.state(), DimState::Active);
    }

    #[test]
    fn test_dimmer_without_window_stays_active() {
        let mut dimmer = ScreenDimmer::new(None);
        assert!(dimmer.admit(at(3, 0), false));
        dimmer.dim();
        assert_eq!(dimmer.state(), DimState::Active);
    }
}
