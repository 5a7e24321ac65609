use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic roster refresh. The UI loop decides whether a tick actually
/// issues a request, so ticks landing during an outstanding refresh are
/// dropped there.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    every: Duration,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>, every: Duration) -> Self {
        Self { ui_events, every }
    }

    pub async fn run(self) {
        let mut roster_interval = interval(self.every);
        roster_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        roster_interval.tick().await;

        loop {
            roster_interval.tick().await;
            if self.ui_events.send(UiEvent::RefreshDue).await.is_err() {
                break;
            }
        }
    }
}
