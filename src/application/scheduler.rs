// Refresh scheduler - fixed-period ticks plus the manual undim override
use crate::application::controller::DashboardController;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Refresh now and stay active for one period
    Undim,
}

/// Runs until the command channel closes.
///
/// The startup refresh is forced so the page shows data even when started
/// during quiet hours. Ticks never wait for the previous tick's requests.
pub async fn run(
    controller: DashboardController,
    period: Duration,
    mut commands: mpsc::Receiver<Command>,
) {
    controller.tick(true).await;

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut undim_until: Option<Instant> = None;

    loop {
        let resume_at = undim_until.unwrap_or_else(Instant::now);
        tokio::select! {
            _ = ticker.tick(), if undim_until.is_none() => {
                controller.tick(false).await;
            }
            _ = sleep_until(resume_at), if undim_until.is_some() => {
                tracing::debug!("undim period over");
                undim_until = None;
                controller.end_undim().await;
                ticker.reset();
            }
            command = commands.recv() => match command {
                Some(Command::Undim) => {
                    tracing::info!("manual undim requested");
                    controller.tick(true).await;
                    undim_until = Some(Instant::now() + period);
                }
                None => {
                    tracing::info!("command channel closed, stopping scheduler");
                    return;
                }
            },
        }
    }
}
