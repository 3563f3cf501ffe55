//! Transient on-page messages.
//!
//! Messages are inserted immediately and removed by [`Notifier::sweep`] once
//! their lifetime has passed. The sweep runs on its own [`DismissalTimer`],
//! so messages still go away while countdowns are stopped.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::dom::{find_container, Document, DomError, EntityKind, NodeId};
use crate::realtime::SharedRealtime;
use crate::scheduler::spawn_ticker;

pub const SYSTEM_MESSAGE_CLASS: &str = "awe-rt-SystemMessage";
pub const LISTING_ACTION_MESSAGE_CLASS: &str = "awe-rt-ListingActionMessage";
pub const LISTING_CLOSED_MESSAGE_CLASS: &str = "awe-rt-ListingClosedMessage";
pub const REFRESH_ALERT_CLASS: &str = "awe-rt-RefreshAlert";

const DEFAULT_CLOSED_MESSAGE: &str = "This listing has ended";

/// Bootstrap alert flavour of a page-wide message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Dismissal {
    node: NodeId,
    due: DateTime<Utc>,
}

/// Tracks which inserted messages still have to be taken down.
#[derive(Debug, Default)]
pub struct Notifier {
    pending: Vec<Dismissal>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages waiting for removal.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Page-wide message. Replaces any message already showing.
    pub fn show_system_message(
        &mut self,
        doc: &mut Document,
        message: &str,
        severity: Severity,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<NodeId> {
        for existing in doc.find_by_class(doc.root(), SYSTEM_MESSAGE_CLASS) {
            self.pending.retain(|d| d.node != existing);
            if let Err(e) = doc.remove(existing) {
                debug!("could not remove previous system message: {}", e);
            }
        }

        let parent = doc
            .find_first(doc.root(), |el| el.has_class("container"))
            .unwrap_or_else(|| doc.body());
        let class = format!("{} alert alert-{}", SYSTEM_MESSAGE_CLASS, severity.as_str());

        let node = log_failure(insert_message(doc, parent, &class, message))?;
        self.schedule(node, now + ttl);
        Some(node)
    }

    /// Message shown at the top of one listing's container.
    pub fn show_listing_action_message(
        &mut self,
        doc: &mut Document,
        listing_id: u64,
        message: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<NodeId> {
        self.show_listing_message(doc, listing_id, LISTING_ACTION_MESSAGE_CLASS, message, now, ttl)
    }

    /// Closing notice for a listing; defaults to "This listing has ended".
    pub fn show_listing_closed_message(
        &mut self,
        doc: &mut Document,
        listing_id: u64,
        message: Option<&str>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<NodeId> {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_CLOSED_MESSAGE);
        self.show_listing_message(doc, listing_id, LISTING_CLOSED_MESSAGE_CLASS, message, now, ttl)
    }

    fn show_listing_message(
        &mut self,
        doc: &mut Document,
        listing_id: u64,
        class: &str,
        message: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<NodeId> {
        let Some(container) = find_container(doc, EntityKind::Listing, listing_id) else {
            debug!("listing {} not rendered, dropping message {:?}", listing_id, message);
            return None;
        };
        let node = log_failure(insert_message(doc, container, class, message))?;
        self.schedule(node, now + ttl);
        Some(node)
    }

    /// Persistent banner asking the user to reload. Replaces any existing one.
    pub fn show_refresh_alert(&mut self, doc: &mut Document, message: &str) -> Option<NodeId> {
        for existing in doc.find_by_class(doc.root(), REFRESH_ALERT_CLASS) {
            if let Err(e) = doc.remove(existing) {
                debug!("could not remove previous refresh alert: {}", e);
            }
        }

        let body = doc.body();
        let class = format!("{} awe-refresh-alert", REFRESH_ALERT_CLASS);
        let result = insert_message(doc, body, &class, &format!("{} ", message)).and_then(|node| {
            let link = doc.append_element(node, "a", "")?;
            doc.set_attr(link, "href", "#")?;
            doc.set_text(link, "Refresh Now")?;
            Ok(node)
        });
        log_failure(result)
    }

    fn schedule(&mut self, node: NodeId, due: DateTime<Utc>) {
        self.pending.push(Dismissal { node, due });
    }

    /// Remove every message whose lifetime has ended. Returns how many were removed.
    pub fn sweep(&mut self, doc: &mut Document, now: DateTime<Utc>) -> usize {
        let (due, keep): (Vec<Dismissal>, Vec<Dismissal>) =
            self.pending.iter().partition(|d| d.due <= now);
        self.pending = keep;

        for d in &due {
            if let Err(e) = doc.remove(d.node) {
                debug!("could not dismiss message {:?}: {}", d.node, e);
            }
        }
        due.len()
    }
}

fn insert_message(
    doc: &mut Document,
    parent: NodeId,
    class: &str,
    text: &str,
) -> Result<NodeId, DomError> {
    let node = doc.create_element("div");
    doc.set_class_name(node, class)?;
    doc.set_text(node, text)?;
    doc.prepend_child(parent, node)?;
    Ok(node)
}

fn log_failure(result: Result<NodeId, DomError>) -> Option<NodeId> {
    result
        .map_err(|e| debug!("could not insert message: {}", e))
        .ok()
}

// ===== Dismissal timer =====

/// Repeating sweep of expired messages, independent of the countdown scheduler.
pub struct DismissalTimer {
    period: std::time::Duration,
    handle: Option<JoinHandle<()>>,
}

impl DismissalTimer {
    pub fn new(period: std::time::Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Returns false if it was already running.
    pub fn start<C>(&mut self, engine: SharedRealtime<C>) -> bool
    where
        C: Clock + 'static,
    {
        if self.is_running() {
            return false;
        }

        self.handle = Some(spawn_ticker(self.period, move || {
            let removed = engine.borrow_mut().sweep_notifications();
            if removed > 0 {
                debug!("dismissed {} messages", removed);
            }
        }));
        info!("dismissal timer started ({:?} interval)", self.period);
        true
    }

    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for DismissalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn listing_page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let container = doc.append_element(doc.body(), "div", "container").unwrap();
        let card = doc.append_element(container, "div", "galleryUnit").unwrap();
        doc.set_attr(card, "data-listingid", "102").unwrap();
        doc.append_element(card, "div", "panel").unwrap();
        (doc, card)
    }

    #[test]
    fn test_listing_message_inserted_first_and_dismissed() {
        let (mut doc, card) = listing_page();
        let mut notifier = Notifier::new();

        let ttl = Duration::seconds(3);
        let msg = notifier
            .show_listing_action_message(&mut doc, 102, "New bid: $1,300", t0(), ttl)
            .unwrap();
        assert_eq!(doc.children(card)[0], msg);
        assert_eq!(doc.text(msg), "New bid: $1,300");
        assert!(doc.has_class(msg, LISTING_ACTION_MESSAGE_CLASS));

        assert_eq!(notifier.sweep(&mut doc, t0() + Duration::seconds(2)), 0);
        assert!(doc.is_connected(msg));

        assert_eq!(notifier.sweep(&mut doc, t0() + Duration::seconds(3)), 1);
        assert!(!doc.is_connected(msg));
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn test_closed_message_default_text() {
        let (mut doc, _) = listing_page();
        let mut notifier = Notifier::new();

        let msg = notifier
            .show_listing_closed_message(&mut doc, 102, None, t0(), Duration::seconds(3))
            .unwrap();
        assert_eq!(doc.text(msg), "This listing has ended");
    }

    #[test]
    fn test_listing_message_for_missing_listing() {
        let (mut doc, _) = listing_page();
        let mut notifier = Notifier::new();
        let before = doc.mutation_count();

        assert!(notifier
            .show_listing_action_message(&mut doc, 999, "hi", t0(), Duration::seconds(3))
            .is_none());
        assert_eq!(doc.mutation_count(), before);
        assert_eq!(notifier.pending(), 0);
    }

    #[test]
    fn test_system_message_replaces_previous() {
        let (mut doc, _) = listing_page();
        let mut notifier = Notifier::new();
        let ttl = Duration::seconds(5);

        let first = notifier
            .show_system_message(&mut doc, "Bidding has begun!", Severity::Success, t0(), ttl)
            .unwrap();
        let second = notifier
            .show_system_message(&mut doc, "Auction has ended", Severity::Warning, t0(), ttl)
            .unwrap();

        assert!(!doc.is_connected(first));
        assert_eq!(doc.find_by_class(doc.root(), SYSTEM_MESSAGE_CLASS), vec![second]);
        assert_eq!(
            doc.class_name(second).unwrap(),
            "awe-rt-SystemMessage alert alert-warning"
        );
        assert_eq!(notifier.pending(), 1);

        // Goes into the .container, not the body
        let container = doc.find_by_class(doc.root(), "container")[0];
        assert_eq!(doc.children(container)[0], second);
    }

    #[test]
    fn test_system_message_falls_back_to_body() {
        let mut doc = Document::new();
        let mut notifier = Notifier::new();
        let msg = notifier
            .show_system_message(&mut doc, "hello", Severity::Info, t0(), Duration::seconds(5))
            .unwrap();
        assert_eq!(doc.parent(msg), Some(doc.body()));
    }

    #[test]
    fn test_refresh_alert_is_persistent() {
        let mut doc = Document::new();
        let mut notifier = Notifier::new();

        let alert = notifier.show_refresh_alert(&mut doc, "Listing updated.").unwrap();
        assert_eq!(doc.text(alert), "Listing updated. Refresh Now");
        assert_eq!(notifier.pending(), 0);

        notifier.sweep(&mut doc, t0() + Duration::days(1));
        assert!(doc.is_connected(alert));
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_dismissed_while_countdowns_stopped() {
        use crate::clock::ManualClock;
        use crate::config::Config;
        use crate::scheduler::CountdownScheduler;
        use crate::MockRealtime;

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (doc, card) = listing_page();
                let clock = ManualClock::new(t0());
                let engine =
                    MockRealtime::new(doc, clock.clone(), &Config::default()).into_shared();

                let mut countdowns = CountdownScheduler::new(std::time::Duration::from_secs(1));
                let mut dismissal = DismissalTimer::new(std::time::Duration::from_millis(250));
                assert!(countdowns.start(engine.clone()));
                assert!(dismissal.start(engine.clone()));
                assert!(!dismissal.start(engine.clone()));
                assert!(countdowns.stop());

                engine.borrow_mut().simulate_bid(102, None, 1);
                let msg = engine.borrow().document().children(card)[0];
                assert!(engine.borrow().document().has_class(msg, LISTING_ACTION_MESSAGE_CLASS));

                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                assert!(engine.borrow().document().is_connected(msg));

                clock.advance(Duration::seconds(3));
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                assert!(!engine.borrow().document().is_connected(msg));
                assert_eq!(engine.borrow().pending_notifications(), 0);
                assert_eq!(engine.borrow().ticks(), 0);

                assert!(dismissal.stop());
                assert!(!dismissal.is_running());
            })
            .await;
    }
}
