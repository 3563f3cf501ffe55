//! The engine as seen from outside: one method per real-time update.
//!
//! Every method is a self-contained, best-effort page write. Targeting a
//! listing or event that is not on the page is normal (gallery pages only
//! render a subset) and leaves the document untouched.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::applier::listing::STATUS_ATTRIBUTE;
use crate::applier::{
    apply_event_phase, apply_listing_status, apply_reserve_met, initialize_status_display,
    set_event_time_label, write_mirrors,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::dom::{find_container, Document, EntityKind, NodeId};
use crate::events::{Command, ConnectionStatus};
use crate::format::format_price;
use crate::markers::Mirror;
use crate::notify::{Notifier, Severity};
use crate::scheduler::{refresh_countdowns, TickReport};
use crate::status::{EventPhase, PhaseValue, StatusValue};

/// Id of the connection indicator element.
pub const CONNECTION_STATUS_ID: &str = "SignalRStatus";

/// Engine handle shared between the scheduler task and the dispatch loop.
pub type SharedRealtime<C = SystemClock> = Rc<RefCell<MockRealtime<C>>>;

pub struct MockRealtime<C: Clock = SystemClock> {
    doc: Document,
    clock: C,
    notifier: Notifier,
    listing_message_ttl: Duration,
    system_message_ttl: Duration,
    urgent_threshold: Duration,
    connected: bool,
    ticks: u64,
}

impl<C: Clock> MockRealtime<C> {
    pub fn new(doc: Document, clock: C, cfg: &Config) -> Self {
        Self {
            doc,
            clock,
            notifier: Notifier::new(),
            listing_message_ttl: cfg.notifications.listing_message_ttl(),
            system_message_ttl: cfg.notifications.system_message_ttl(),
            urgent_threshold: cfg.scheduler.urgent_threshold(),
            connected: false,
            ticks: 0,
        }
    }

    pub fn into_shared(self) -> SharedRealtime<C> {
        Rc::new(RefCell::new(self))
    }

    /// Bring a freshly rendered page live: mark the connection up and reveal
    /// each listing's render-time status. Returns the listings initialized.
    ///
    /// The countdown scheduler is started separately.
    pub fn init(&mut self) -> usize {
        self.update_connection_status(ConnectionStatus::Connected);
        let listings = initialize_status_display(&mut self.doc);
        info!("real-time engine initialized ({} listings)", listings);
        listings
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Scheduler ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Transient messages still waiting to be dismissed.
    pub fn pending_notifications(&self) -> usize {
        self.notifier.pending()
    }

    // ===== Timers =====

    /// One countdown tick: rewrite every countdown and the clock.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let report = refresh_countdowns(&mut self.doc, now, self.urgent_threshold);
        self.ticks += 1;
        report
    }

    /// Take down every transient message whose lifetime has passed.
    /// Returns how many were removed.
    pub fn sweep_notifications(&mut self) -> usize {
        let now = self.clock.now();
        self.notifier.sweep(&mut self.doc, now)
    }

    // ===== Connection =====

    pub fn update_connection_status(&mut self, status: ConnectionStatus) {
        if let Some(indicator) = self.doc.get_element_by_id(CONNECTION_STATUS_ID) {
            if let Err(e) = self.doc.set_class_name(indicator, status.as_str()) {
                debug!("skipping connection indicator: {}", e);
            }
        }

        let body = self.doc.body();
        for other in ConnectionStatus::ALL {
            let result = self.doc.toggle_class(body, &other.body_class(), other == status);
            if let Err(e) = result {
                debug!("skipping body connection class: {}", e);
            }
        }

        self.connected = status == ConnectionStatus::Connected;
        info!("connection status: {}", status.as_str());
    }

    // ===== Listing values =====

    fn listing_scope(&self, listing_id: u64, what: &str) -> Option<NodeId> {
        let scope = find_container(&self.doc, EntityKind::Listing, listing_id);
        if scope.is_none() {
            debug!("listing {} not rendered, skipping {}", listing_id, what);
        }
        scope
    }

    /// Current price. Also rewrites the minimum-bid mirrors, which show the
    /// same figure on cards.
    pub fn update_price(&mut self, listing_id: u64, price: Option<Decimal>) {
        let Some(scope) = self.listing_scope(listing_id, "price") else {
            return;
        };
        let text = format_price(price);
        write_mirrors(&mut self.doc, scope, Mirror::CurrentPrice, &text, true);
        write_mirrors(&mut self.doc, scope, Mirror::MinimumBid, &text, true);
    }

    pub fn update_minimum_bid(&mut self, listing_id: u64, amount: Option<Decimal>) {
        let Some(scope) = self.listing_scope(listing_id, "minimum bid") else {
            return;
        };
        write_mirrors(&mut self.doc, scope, Mirror::MinimumBid, &format_price(amount), true);
    }

    pub fn update_bid_count(&mut self, listing_id: u64, count: u32) {
        let Some(scope) = self.listing_scope(listing_id, "bid count") else {
            return;
        };
        let text = count.to_string();
        write_mirrors(&mut self.doc, scope, Mirror::AcceptedListingActionCount, &text, true);
    }

    pub fn update_buy_now_price(&mut self, listing_id: u64, price: Option<Decimal>) {
        let Some(scope) = self.listing_scope(listing_id, "buy now price") else {
            return;
        };
        write_mirrors(&mut self.doc, scope, Mirror::BuyNowPrice, &format_price(price), true);
    }

    pub fn update_quantity(&mut self, listing_id: u64, quantity: u32) {
        let Some(scope) = self.listing_scope(listing_id, "quantity") else {
            return;
        };
        write_mirrors(&mut self.doc, scope, Mirror::Quantity, &quantity.to_string(), false);
    }

    pub fn update_reserve_met(&mut self, listing_id: u64, reserve_met: bool) {
        apply_reserve_met(&mut self.doc, listing_id, reserve_met);
    }

    // ===== Listing status =====

    /// Apply a status. Returns `None` when the listing is not rendered,
    /// otherwise whether this call moved it into a terminal status.
    fn apply_status(&mut self, listing_id: u64, status: &StatusValue) -> Option<bool> {
        let container = find_container(&self.doc, EntityKind::Listing, listing_id)?;
        let was_terminal = self
            .doc
            .attr(container, STATUS_ATTRIBUTE)
            .is_some_and(|raw| StatusValue::from(raw).is_terminal());

        if !apply_listing_status(&mut self.doc, listing_id, status) {
            return None;
        }
        info!("listing {} status -> {}", listing_id, status);
        Some(status.is_terminal() && !was_terminal)
    }

    /// Switch a listing's status. Entering Successful/Unsuccessful also posts
    /// the default closing notice; repeating a terminal status does not.
    pub fn update_status(&mut self, listing_id: u64, status: impl Into<StatusValue>) {
        let status = status.into();
        match self.apply_status(listing_id, &status) {
            Some(true) => {
                self.show_listing_closed_message(listing_id, None);
            }
            Some(false) => {}
            None => debug!("listing {} not rendered, skipping status {}", listing_id, status),
        }
    }

    pub fn handle_listing_start(&mut self, listing_id: u64) {
        if !crate::applier::handle_listing_start(&mut self.doc, listing_id) {
            debug!("listing {} not rendered, skipping start", listing_id);
        }
    }

    pub fn handle_listing_end(&mut self, listing_id: u64) {
        if !crate::applier::handle_listing_end(&mut self.doc, listing_id) {
            debug!("listing {} not rendered, skipping end", listing_id);
        }
    }

    // ===== Events =====

    pub fn update_event_phase(&mut self, event_id: u64, phase: impl Into<PhaseValue>) {
        let phase = phase.into();
        apply_event_phase(&mut self.doc, event_id, &phase);
        info!("event {} phase -> {}", event_id, phase.as_str());
    }

    pub fn update_event_time_label(&mut self, event_id: u64, label: &str) {
        set_event_time_label(&mut self.doc, event_id, label);
    }

    // ===== Messages =====

    pub fn show_system_message(&mut self, message: &str, severity: Severity) -> Option<NodeId> {
        let now = self.clock.now();
        self.notifier
            .show_system_message(&mut self.doc, message, severity, now, self.system_message_ttl)
    }

    pub fn show_listing_action_message(
        &mut self,
        listing_id: u64,
        message: &str,
    ) -> Option<NodeId> {
        let now = self.clock.now();
        self.notifier.show_listing_action_message(
            &mut self.doc,
            listing_id,
            message,
            now,
            self.listing_message_ttl,
        )
    }

    pub fn show_listing_closed_message(
        &mut self,
        listing_id: u64,
        message: Option<&str>,
    ) -> Option<NodeId> {
        let now = self.clock.now();
        self.notifier.show_listing_closed_message(
            &mut self.doc,
            listing_id,
            message,
            now,
            self.listing_message_ttl,
        )
    }

    pub fn show_refresh_alert(&mut self, message: &str) -> Option<NodeId> {
        self.notifier.show_refresh_alert(&mut self.doc, message)
    }

    // ===== Simulations =====

    /// A bid came in: new price and count, plus a short notice on the listing.
    pub fn simulate_bid(&mut self, listing_id: u64, price: Option<Decimal>, bid_count: u32) {
        self.update_price(listing_id, price);
        self.update_bid_count(listing_id, bid_count);
        let message = format!("New bid: {}", format_price(price));
        self.show_listing_action_message(listing_id, &message);
    }

    /// Close a listing as sold or unsold with a matching notice.
    pub fn simulate_auction_end(&mut self, listing_id: u64, successful: bool) {
        let status = if successful {
            crate::status::ListingStatus::Successful
        } else {
            crate::status::ListingStatus::Unsuccessful
        };
        if self.apply_status(listing_id, &status.into()).is_none() {
            debug!("listing {} not rendered, skipping auction end", listing_id);
            return;
        }
        let message = if successful {
            "Sold!"
        } else {
            "No sale - reserve not met"
        };
        self.show_listing_closed_message(listing_id, Some(message));
    }

    /// Move an event to a new phase and announce it page-wide.
    ///
    /// | phase          | message               | severity |
    /// |----------------|-----------------------|----------|
    /// | BiddingStarted | Bidding has begun!    | success  |
    /// | ClosingStarted | Lots are now closing! | success  |
    /// | BiddingEnded   | Auction has ended     | warning  |
    ///
    /// Preview and unknown phases are applied silently.
    pub fn simulate_event_phase_change(&mut self, event_id: u64, phase: impl Into<PhaseValue>) {
        let phase = phase.into();
        self.update_event_phase(event_id, phase.clone());

        let announcement = match phase.known() {
            Some(EventPhase::BiddingStarted) => Some(("Bidding has begun!", Severity::Success)),
            Some(EventPhase::ClosingStarted) => Some(("Lots are now closing!", Severity::Success)),
            Some(EventPhase::BiddingEnded) => Some(("Auction has ended", Severity::Warning)),
            Some(EventPhase::Preview) | None => None,
        };
        if let Some((message, severity)) = announcement {
            self.show_system_message(message, severity);
        }
    }

    // ===== Dispatch =====

    /// Route a command to its method. Runtime commands (countdown start/stop,
    /// shutdown) belong to the caller and are ignored here.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::UpdatePrice { listing_id, price } => self.update_price(listing_id, price),
            Command::UpdateMinimumBid { listing_id, amount } => {
                self.update_minimum_bid(listing_id, amount)
            }
            Command::UpdateBidCount { listing_id, count } => {
                self.update_bid_count(listing_id, count)
            }
            Command::UpdateBuyNowPrice { listing_id, price } => {
                self.update_buy_now_price(listing_id, price)
            }
            Command::UpdateQuantity {
                listing_id,
                quantity,
            } => self.update_quantity(listing_id, quantity),
            Command::UpdateReserveMet {
                listing_id,
                reserve_met,
            } => self.update_reserve_met(listing_id, reserve_met),
            Command::UpdateStatus { listing_id, status } => self.update_status(listing_id, status),
            Command::HandleListingStart { listing_id } => self.handle_listing_start(listing_id),
            Command::HandleListingEnd { listing_id } => self.handle_listing_end(listing_id),
            Command::UpdateEventPhase { event_id, phase } => {
                self.update_event_phase(event_id, phase)
            }
            Command::UpdateEventTimeLabel { event_id, label } => {
                self.update_event_time_label(event_id, &label)
            }
            Command::UpdateConnectionStatus { status } => self.update_connection_status(status),
            Command::SimulateBid {
                listing_id,
                price,
                bid_count,
            } => self.simulate_bid(listing_id, price, bid_count),
            Command::SimulateAuctionEnd {
                listing_id,
                successful,
            } => self.simulate_auction_end(listing_id, successful),
            Command::SimulateEventPhaseChange { event_id, phase } => {
                self.simulate_event_phase_change(event_id, phase)
            }
            Command::ShowSystemMessage { message, severity } => {
                self.show_system_message(&message, severity);
            }
            Command::ShowListingActionMessage {
                listing_id,
                message,
            } => {
                self.show_listing_action_message(listing_id, &message);
            }
            Command::ShowListingClosedMessage {
                listing_id,
                message,
            } => {
                self.show_listing_closed_message(listing_id, message.as_deref());
            }
            Command::ShowRefreshAlert { message } => {
                self.show_refresh_alert(&message);
            }
            Command::StartCountdowns | Command::StopCountdowns | Command::Shutdown => {
                debug!("{:?} is handled by the runtime", command);
            }
        }
    }
}
