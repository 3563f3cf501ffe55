use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tracing::info;

use crate::events::{Command, ConnectionStatus};
use crate::notify::Severity;

/// A short bidding session against the demo pages.
pub fn demo_script() -> Vec<Command> {
    vec![
        Command::SimulateEventPhaseChange {
            event_id: 1,
            phase: "BiddingStarted".to_string(),
        },
        Command::UpdateStatus {
            listing_id: 104,
            status: "Active".to_string(),
        },
        Command::HandleListingStart { listing_id: 104 },
        Command::SimulateBid {
            listing_id: 101,
            price: Some(dec!(1300)),
            bid_count: 8,
        },
        Command::SimulateBid {
            listing_id: 103,
            price: Some(dec!(3600)),
            bid_count: 5,
        },
        Command::UpdateReserveMet {
            listing_id: 103,
            reserve_met: true,
        },
        Command::UpdateQuantity {
            listing_id: 201,
            quantity: 1,
        },
        Command::SimulateBid {
            listing_id: 102,
            price: Some(dec!(525)),
            bid_count: 13,
        },
        Command::UpdateConnectionStatus {
            status: ConnectionStatus::Reconnect,
        },
        Command::UpdateConnectionStatus {
            status: ConnectionStatus::Connected,
        },
        Command::SimulateEventPhaseChange {
            event_id: 1,
            phase: "ClosingStarted".to_string(),
        },
        Command::UpdateEventTimeLabel {
            event_id: 1,
            label: "Next Lot Closes:".to_string(),
        },
        Command::SimulateAuctionEnd {
            listing_id: 102,
            successful: true,
        },
        Command::UpdateStatus {
            listing_id: 201,
            status: "Successful".to_string(),
        },
        Command::SimulateAuctionEnd {
            listing_id: 101,
            successful: true,
        },
        Command::SimulateAuctionEnd {
            listing_id: 103,
            successful: false,
        },
        Command::SimulateEventPhaseChange {
            event_id: 1,
            phase: "BiddingEnded".to_string(),
        },
        Command::ShowSystemMessage {
            message: "Thanks for bidding!".to_string(),
            severity: Severity::Info,
        },
        Command::ShowRefreshAlert {
            message: "Results have been posted.".to_string(),
        },
    ]
}

pub struct ScriptFeed {
    steps: Vec<Command>,
    step_interval: std::time::Duration,
    shutdown_when_done: bool,
}

impl ScriptFeed {
    pub fn new(steps: Vec<Command>, step_interval: std::time::Duration) -> Self {
        Self {
            steps,
            step_interval,
            shutdown_when_done: false,
        }
    }

    /// Send `Shutdown` after the last step.
    pub fn shutdown_when_done(mut self, yes: bool) -> Self {
        self.shutdown_when_done = yes;
        self
    }

    /// Spawns a task that replays the steps, one per interval
    pub fn spawn(self, tx: mpsc::Sender<Command>) {
        tokio::spawn(async move {
            let total = self.steps.len();
            for (i, step) in self.steps.into_iter().enumerate() {
                tokio::time::sleep(self.step_interval).await;
                info!("[script] Step {}/{}: {:?}", i + 1, total, step);
                if tx.send(step).await.is_err() {
                    return;
                }
            }

            info!("[script] Finished");
            if self.shutdown_when_done {
                // Let the last notifications run their course first
                tokio::time::sleep(self.step_interval * 2).await;
                let _ = tx.send(Command::Shutdown).await;
            }
        });
    }
}
