// Application state for HTTP handlers
use crate::application::controller::DashboardController;
use crate::application::scheduler::Command;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    pub controller: DashboardController,
    /// Feeds the refresh scheduler
    pub commands: mpsc::Sender<Command>,
}
