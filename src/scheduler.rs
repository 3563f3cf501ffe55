//! Countdown scheduler.
//!
//! One repeating timer per page. Every tick re-queries the document for
//! countdown elements (cards come and go between ticks), recomputes each
//! element's text from its fixed target instant, and refreshes the clock.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::dom::{find_mirrors, Document, NodeId};
use crate::format::{format_clock, format_time_remaining};
use crate::markers::{Mirror, URGENT_CLASS};
use crate::realtime::SharedRealtime;

pub const ENDING_ATTRIBUTE: &str = "data-ending";
pub const STARTING_ATTRIBUTE: &str = "data-starting";

/// Id of the element showing the current time.
pub const TIME_ELEMENT_ID: &str = "Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownKind {
    Ending,
    Starting,
    Event,
}

impl CountdownKind {
    const ALL: [CountdownKind; 3] = [Self::Ending, Self::Starting, Self::Event];

    fn mirror(&self) -> Mirror {
        match self {
            Self::Ending => Mirror::EndingCountdown,
            Self::Starting => Mirror::StartingCountdown,
            Self::Event => Mirror::EventCountdown,
        }
    }

    fn target_attribute(&self) -> &'static str {
        match self {
            Self::Ending | Self::Event => ENDING_ATTRIBUTE,
            Self::Starting => STARTING_ATTRIBUTE,
        }
    }

    /// Only listing end times get the urgent flag.
    fn flags_urgent(&self) -> bool {
        matches!(self, Self::Ending)
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Countdown elements rewritten
    pub updated: usize,
    /// Of those, how many read "Ended"
    pub expired: usize,
    /// Elements whose target could not be parsed
    pub malformed: usize,
    /// End-time countdowns flagged urgent this tick
    pub urgent: usize,
}

/// Parse a countdown target. Accepts RFC 3339 / ISO-8601 with offset;
/// date-times without an offset are read as local time. A bare date is
/// midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Rewrite every countdown on the page for `now`.
///
/// A malformed target renders "Ended" and never stops the remaining elements
/// from updating.
pub fn refresh_countdowns(
    doc: &mut Document,
    now: DateTime<Utc>,
    urgent_threshold: Duration,
) -> TickReport {
    let mut report = TickReport::default();

    for kind in CountdownKind::ALL {
        let attr = kind.target_attribute();
        let nodes: Vec<NodeId> = find_mirrors(doc, doc.root(), kind.mirror())
            .into_iter()
            .filter(|n| doc.attr(*n, attr).is_some())
            .collect();

        for node in nodes {
            let raw = doc.attr(node, attr).unwrap_or_default();
            let remaining_ms = match parse_instant(raw) {
                Some(target) => (target - now).num_milliseconds(),
                None => {
                    warn!("countdown {:?} has unparseable {}={:?}", node, attr, raw);
                    report.malformed += 1;
                    0
                }
            };

            let text = format_time_remaining(remaining_ms);
            if let Err(e) = doc.set_text(node, &text) {
                debug!("skipping countdown {:?}: {}", node, e);
                continue;
            }
            report.updated += 1;
            if remaining_ms <= 0 {
                report.expired += 1;
            }

            // Additive only; the flag goes away with the element itself
            if kind.flags_urgent()
                && remaining_ms > 0
                && remaining_ms < urgent_threshold.num_milliseconds()
            {
                if let Err(e) = doc.add_class(node, URGENT_CLASS) {
                    debug!("skipping urgent flag on {:?}: {}", node, e);
                } else {
                    report.urgent += 1;
                }
            }
        }
    }

    if let Some(time_el) = doc.get_element_by_id(TIME_ELEMENT_ID) {
        let text = format_clock(now.with_timezone(&Local));
        if let Err(e) = doc.set_text(time_el, &text) {
            debug!("skipping clock refresh: {}", e);
        }
    }

    report
}

/// Run `on_tick` every `period` on the current `LocalSet` until aborted.
///
/// The first tick waits a full period, like `setInterval`: the page already
/// shows render-time values.
pub(crate) fn spawn_ticker<F>(period: std::time::Duration, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() + 'static,
{
    tokio::task::spawn_local(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            on_tick();
        }
    })
}

/// Owns the single repeating countdown timer of a page.
///
/// The timer runs as a local task, so [`CountdownScheduler::start`] must be
/// called from inside a `tokio::task::LocalSet`.
#[derive(Debug)]
pub struct CountdownScheduler {
    period: std::time::Duration,
    handle: Option<JoinHandle<()>>,
}

impl CountdownScheduler {
    pub fn new(period: std::time::Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Arm the timer. Returns false if it was already running.
    pub fn start<C>(&mut self, engine: SharedRealtime<C>) -> bool
    where
        C: Clock + 'static,
    {
        if self.is_running() {
            debug!("countdown scheduler already running");
            return false;
        }

        self.handle = Some(spawn_ticker(self.period, move || {
            let report = engine.borrow_mut().tick();
            if report.malformed > 0 {
                debug!("tick finished with {} malformed countdowns", report.malformed);
            }
        }));
        info!("countdown scheduler started ({:?} interval)", self.period);
        true
    }

    /// Disarm the timer. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                info!("countdown scheduler stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for CountdownScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
