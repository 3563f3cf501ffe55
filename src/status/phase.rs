use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::StyleClass;

/// Event bidding phase. Ordered: a later phase implies every earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPhase {
    Preview,
    BiddingStarted,
    ClosingStarted,
    BiddingEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event phase: {0}")]
pub struct ParsePhaseError(pub String);

/// Where a phase label is being rendered.
///
/// The real-time layer and the gallery templates disagree on the style of
/// `BiddingStarted` and on the time-label wording; both are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelContext {
    /// Live updates pushed by the engine.
    #[default]
    Realtime,
    /// Markup produced by the event gallery/detail templates.
    Gallery,
}

impl EventPhase {
    pub const ALL: [EventPhase; 4] = [
        Self::Preview,
        Self::BiddingStarted,
        Self::ClosingStarted,
        Self::BiddingEnded,
    ];

    /// Phases that carry `ShowOn*`/`HideOn*` markers, in order.
    /// Preview is the rendered baseline and has none.
    pub const REVEAL_ORDER: [EventPhase; 3] = [
        Self::BiddingStarted,
        Self::ClosingStarted,
        Self::BiddingEnded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::BiddingStarted => "BiddingStarted",
            Self::ClosingStarted => "ClosingStarted",
            Self::BiddingEnded => "BiddingEnded",
        }
    }

    /// Position in [`Self::REVEAL_ORDER`], `None` for Preview.
    pub fn reveal_index(&self) -> Option<usize> {
        Self::REVEAL_ORDER.iter().position(|p| p == self)
    }

    /// Phases whose reveal markers are visible once this phase is reached.
    pub fn revealed_phases(&self) -> &'static [EventPhase] {
        match self.reveal_index() {
            Some(k) => &Self::REVEAL_ORDER[..=k],
            None => &[],
        }
    }

    /// Bid-status badge text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preview => "PREVIEW",
            Self::BiddingStarted => "LIVE",
            Self::ClosingStarted => "CLOSING",
            Self::BiddingEnded => "ENDED",
        }
    }

    pub fn style_class(&self, ctx: LabelContext) -> StyleClass {
        match (self, ctx) {
            (Self::Preview, _) => StyleClass::Info,
            (Self::BiddingStarted, LabelContext::Realtime) => StyleClass::Danger,
            (Self::BiddingStarted, LabelContext::Gallery) => StyleClass::Success,
            (Self::ClosingStarted, _) => StyleClass::Warning,
            (Self::BiddingEnded, _) => StyleClass::Default,
        }
    }

    /// Text shown before the event countdown.
    pub fn time_label(&self, ctx: LabelContext) -> &'static str {
        match (self, ctx) {
            (Self::Preview, _) => "Starts In:",
            (Self::BiddingStarted, LabelContext::Realtime) => "Bidding Ends In:",
            (Self::BiddingStarted, LabelContext::Gallery) => "First Lot Closes:",
            (Self::ClosingStarted, LabelContext::Realtime) => "Lot Closes In:",
            (Self::ClosingStarted, LabelContext::Gallery) => "Current Lot Closes:",
            (Self::BiddingEnded, _) => "Ended",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventPhase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ParsePhaseError(s.to_string()))
    }
}

/// A phase as received from outside the engine. Unknown values are kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseValue {
    Known(EventPhase),
    Other(String),
}

impl PhaseValue {
    pub fn known(&self) -> Option<EventPhase> {
        match self {
            Self::Known(phase) => Some(*phase),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(phase) => phase.as_str(),
            Self::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Known(phase) => phase.label(),
            Self::Other(raw) => raw,
        }
    }

    pub fn style_class(&self, ctx: LabelContext) -> StyleClass {
        self.known()
            .map(|p| p.style_class(ctx))
            .unwrap_or(StyleClass::Default)
    }

    /// Empty for unknown phases.
    pub fn time_label(&self, ctx: LabelContext) -> &'static str {
        self.known().map(|p| p.time_label(ctx)).unwrap_or("")
    }

    pub fn revealed_phases(&self) -> &'static [EventPhase] {
        self.known().map(|p| p.revealed_phases()).unwrap_or(&[])
    }
}

impl From<EventPhase> for PhaseValue {
    fn from(phase: EventPhase) -> Self {
        Self::Known(phase)
    }
}

impl From<&str> for PhaseValue {
    fn from(raw: &str) -> Self {
        raw.parse::<EventPhase>()
            .map(Self::Known)
            .unwrap_or_else(|_| Self::Other(raw.to_string()))
    }
}

impl From<String> for PhaseValue {
    fn from(raw: String) -> Self {
        match raw.parse::<EventPhase>() {
            Ok(phase) => Self::Known(phase),
            Err(_) => Self::Other(raw),
        }
    }
}

impl fmt::Display for PhaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(EventPhase::Preview < EventPhase::BiddingStarted);
        assert!(EventPhase::BiddingStarted < EventPhase::ClosingStarted);
        assert!(EventPhase::ClosingStarted < EventPhase::BiddingEnded);
    }

    #[test]
    fn test_revealed_phases_are_cumulative() {
        assert!(EventPhase::Preview.revealed_phases().is_empty());
        assert_eq!(
            EventPhase::BiddingStarted.revealed_phases(),
            &[EventPhase::BiddingStarted]
        );
        assert_eq!(
            EventPhase::ClosingStarted.revealed_phases(),
            &[EventPhase::BiddingStarted, EventPhase::ClosingStarted]
        );
        assert_eq!(EventPhase::BiddingEnded.revealed_phases().len(), 3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EventPhase::Preview.label(), "PREVIEW");
        assert_eq!(EventPhase::BiddingStarted.label(), "LIVE");
        assert_eq!(EventPhase::ClosingStarted.label(), "CLOSING");
        assert_eq!(EventPhase::BiddingEnded.label(), "ENDED");
    }

    #[test]
    fn test_bidding_started_class_per_context() {
        let p = EventPhase::BiddingStarted;
        assert_eq!(p.style_class(LabelContext::Realtime), StyleClass::Danger);
        assert_eq!(p.style_class(LabelContext::Gallery), StyleClass::Success);
        assert_eq!(
            EventPhase::ClosingStarted.style_class(LabelContext::Gallery),
            StyleClass::Warning
        );
    }

    #[test]
    fn test_time_labels() {
        use LabelContext::*;

        assert_eq!(EventPhase::Preview.time_label(Realtime), "Starts In:");
        assert_eq!(EventPhase::BiddingStarted.time_label(Realtime), "Bidding Ends In:");
        assert_eq!(EventPhase::BiddingStarted.time_label(Gallery), "First Lot Closes:");
        assert_eq!(EventPhase::ClosingStarted.time_label(Realtime), "Lot Closes In:");
        assert_eq!(EventPhase::ClosingStarted.time_label(Gallery), "Current Lot Closes:");
        assert_eq!(EventPhase::BiddingEnded.time_label(Gallery), "Ended");
    }

    #[test]
    fn test_unknown_phase_passthrough() {
        let v = PhaseValue::from("Intermission");
        assert_eq!(v.label(), "Intermission");
        assert_eq!(v.style_class(LabelContext::Realtime), StyleClass::Default);
        assert_eq!(v.time_label(LabelContext::Realtime), "");
        assert!(v.revealed_phases().is_empty());
    }
}
