// Domain layer - widgets, page model and backend payloads
pub mod annotation;
pub mod color;
pub mod page;
pub mod payload;
pub mod quiet_hours;
pub mod widget;
