// Application layer - widget construction, data binding and refresh scheduling
pub mod binder;
pub mod clock;
pub mod controller;
pub mod dashboard_source;
pub mod registry;
pub mod scheduler;
pub mod variant;
pub mod widget_factory;
