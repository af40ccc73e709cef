// Widget registry - owns every widget of the running dashboard
use crate::application::widget_factory::{build_widget, WidgetError, WidgetSpec};
use crate::domain::page::Page;
use crate::domain::widget::Widget;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WidgetRegistry {
    widgets: BTreeMap<String, Widget>,
}

impl WidgetRegistry {
    /// Builds all widgets in one pass; the first failure aborts.
    pub fn build(specs: &[WidgetSpec], page: &Page) -> Result<Self, WidgetError> {
        let mut registry = Self::default();
        for spec in specs {
            registry.insert(build_widget(spec, page)?)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, widget: Widget) -> Result<(), WidgetError> {
        if self.widgets.contains_key(&widget.id) {
            return Err(WidgetError::DuplicateWidget(widget.id));
        }
        self.widgets.insert(widget.id.clone(), widget);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Widget, WidgetError> {
        self.widgets
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }
}
