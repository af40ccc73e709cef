// Page model - the named elements a dashboard viewer renders
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Element id of the full-screen dimming overlay
pub const DIM_OVERLAY: &str = "dim_screen";

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("page element '{0}' does not exist")]
    MissingElement(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub text: Option<String>,
    pub width: Option<String>,
    pub background: Option<String>,
    pub visible: bool,
    pub rows: Vec<Vec<String>>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            text: None,
            width: None,
            background: None,
            visible: true,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BindingOutcome {
    Ok,
    Failed { reason: String },
    Redirected { location: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingStatus {
    pub outcome: BindingOutcome,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    elements: BTreeMap<String, Element>,
    /// Pending navigation requested by the backend
    location: Option<String>,
    /// Last outcome per endpoint
    status: BTreeMap<String, BindingStatus>,
}

impl Page {
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = ids
            .into_iter()
            .map(|id| (id.into(), Element::default()))
            .collect();
        Self {
            elements,
            location: None,
            status: BTreeMap::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Element, PageError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| PageError::MissingElement(id.to_string()))
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<(), PageError> {
        self.element_mut(id)?.text = Some(text.into());
        Ok(())
    }

    pub fn set_bar(&mut self, id: &str, width: &str, background: &str) -> Result<(), PageError> {
        let element = self.element_mut(id)?;
        element.width = Some(width.to_string());
        element.background = Some(background.to_string());
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), PageError> {
        self.element_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_rows(&mut self, id: &str, rows: Vec<Vec<String>>) -> Result<(), PageError> {
        self.element_mut(id)?.rows = rows;
        Ok(())
    }

    /// Shows or hides the dimming overlay. Layouts without one ignore this.
    pub fn set_dimmed(&mut self, dimmed: bool) {
        if let Some(overlay) = self.elements.get_mut(DIM_OVERLAY) {
            overlay.visible = dimmed;
        }
    }

    pub fn is_dimmed(&self) -> bool {
        self.element(DIM_OVERLAY)
            .is_some_and(|overlay| overlay.visible)
    }

    pub fn navigate(&mut self, location: &str) {
        self.location = Some(location.to_string());
    }

    pub fn clear_navigation(&mut self) {
        self.location = None;
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn record(&mut self, endpoint: &str, outcome: BindingOutcome, at: DateTime<Local>) {
        self.status
            .insert(endpoint.to_string(), BindingStatus { outcome, at });
    }

    #[cfg(test)]
    pub fn status(&self, endpoint: &str) -> Option<&BindingStatus> {
        self.status.get(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_is_reported() {
        let mut page = Page::with_elements(["current-temp"]);
        assert!(page.set_text("current-temp", "21 (19) ℃").is_ok());
        assert_eq!(
            page.set_text("version", "Version: 1"),
            Err(PageError::MissingElement("version".to_string()))
        );
    }

    #[test]
    fn test_dim_overlay_toggles() {
        let mut page = Page::with_elements([DIM_OVERLAY]);
        page.set_dimmed(false);
        assert!(!page.is_dimmed());
        page.set_dimmed(true);
        assert!(page.is_dimmed());
    }

    #[test]
    fn test_layout_without_overlay_never_dims() {
        let mut page = Page::with_elements(["realtime"]);
        page.set_dimmed(true);
        assert!(!page.is_dimmed());
    }

    #[test]
    fn test_navigation_round_trip() {
        let mut page = Page::with_elements(Vec::<String>::new());
        page.navigate("/login?context=/");
        assert_eq!(page.location(), Some("/login?context=/"));
        page.clear_navigation();
        assert_eq!(page.location(), None);
    }
}
