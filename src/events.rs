use rust_decimal::Decimal;
use serde::Deserialize;

use crate::notify::Severity;

/// One externally triggered action against the page.
///
/// Feeds turn their input into these and send them down the channel; the
/// main loop hands them to [`crate::MockRealtime::dispatch`]. On the wire a
/// command is a JSON object tagged by `action`:
///
/// ```json
/// {"action": "simulate_bid", "listing_id": 102, "price": 1300, "bid_count": 8}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    // ===== Listing values =====
    UpdatePrice {
        listing_id: u64,
        price: Option<Decimal>,
    },
    UpdateMinimumBid {
        listing_id: u64,
        amount: Option<Decimal>,
    },
    UpdateBidCount {
        listing_id: u64,
        count: u32,
    },
    UpdateBuyNowPrice {
        listing_id: u64,
        price: Option<Decimal>,
    },
    UpdateQuantity {
        listing_id: u64,
        quantity: u32,
    },
    UpdateReserveMet {
        listing_id: u64,
        reserve_met: bool,
    },

    // ===== State machines =====
    // Status and phase stay strings here: unknown values are passed through
    // to the page rather than rejected
    UpdateStatus {
        listing_id: u64,
        status: String,
    },
    HandleListingStart {
        listing_id: u64,
    },
    HandleListingEnd {
        listing_id: u64,
    },
    UpdateEventPhase {
        event_id: u64,
        phase: String,
    },
    UpdateEventTimeLabel {
        event_id: u64,
        label: String,
    },
    UpdateConnectionStatus {
        status: ConnectionStatus,
    },

    // ===== Simulations =====
    SimulateBid {
        listing_id: u64,
        price: Option<Decimal>,
        bid_count: u32,
    },
    SimulateAuctionEnd {
        listing_id: u64,
        successful: bool,
    },
    SimulateEventPhaseChange {
        event_id: u64,
        phase: String,
    },

    // ===== Messages =====
    ShowSystemMessage {
        message: String,
        #[serde(default)]
        severity: Severity,
    },
    ShowListingActionMessage {
        listing_id: u64,
        message: String,
    },
    ShowListingClosedMessage {
        listing_id: u64,
        message: Option<String>,
    },
    ShowRefreshAlert {
        message: String,
    },

    // ===== Runtime =====
    StartCountdowns,
    StopCountdowns,
    Shutdown,
}

/// Real-time connection state shown in the page chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Reconnect,
    Stopped,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 3] = [Self::Connected, Self::Reconnect, Self::Stopped];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Reconnect => "reconnect",
            Self::Stopped => "stopped",
        }
    }

    /// Class put on `<body>` while in this state.
    pub fn body_class(&self) -> String {
        format!("SignalRStatus-{}", self.as_str())
    }
}
