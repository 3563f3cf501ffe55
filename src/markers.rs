//! Marker class vocabulary.
//!
//! Hand-authored CMS snippets reference these class names directly, so the
//! rendered strings must stay exactly as they are (`awe-rt-ShowStatusActive`,
//! `awe-rt-HideOnBiddingStarted`, ...). The engine only ever works with the
//! typed [`Marker`] and [`Mirror`] roles and converts at the edge.

use std::fmt;

use crate::status::{EventPhase, ListingStatus};

/// Prefix shared by every real-time element class.
pub const RT_PREFIX: &str = "awe-rt-";

/// The single class toggled by all show/hide logic.
pub const HIDDEN_CLASS: &str = "awe-hidden";

/// Re-applied on every price/count write to retrigger the highlight animation.
pub const PULSE_CLASS: &str = "signalr-pulse";

/// Added to end-time countdowns in their final hour.
pub const URGENT_CLASS: &str = "text-danger";

/// Whether a marker is shown or hidden while its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Show,
    Hide,
}

impl Toggle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "Show",
            Self::Hide => "Hide",
        }
    }

    /// Visibility of a marker with this toggle given whether its condition holds.
    pub fn visible_when(&self, active: bool) -> bool {
        match self {
            Self::Show => active,
            Self::Hide => !active,
        }
    }
}

/// What a show/hide marker is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Status(ListingStatus),
    Phase(EventPhase),
    Start,
    End,
    ReserveMet,
    ReserveNotMet,
}

impl Condition {
    pub fn field(&self) -> Field {
        match self {
            Self::Status(_) => Field::Status,
            Self::Phase(_) => Field::Phase,
            Self::Start | Self::End => Field::Lifecycle,
            Self::ReserveMet | Self::ReserveNotMet => Field::Reserve,
        }
    }

    fn qualifier(&self) -> String {
        match self {
            Self::Status(s) => format!("Status{}", s.as_str()),
            Self::Phase(p) => format!("On{}", p.as_str()),
            Self::Start => "OnStart".to_string(),
            Self::End => "OnEnd".to_string(),
            Self::ReserveMet => "ReserveMet".to_string(),
            Self::ReserveNotMet => "ReserveNotMet".to_string(),
        }
    }

    fn parse_qualifier(rest: &str) -> Option<Self> {
        match rest {
            "OnStart" => return Some(Self::Start),
            "OnEnd" => return Some(Self::End),
            "ReserveMet" => return Some(Self::ReserveMet),
            "ReserveNotMet" => return Some(Self::ReserveNotMet),
            _ => {}
        }
        if let Some(status) = rest.strip_prefix("Status") {
            return status.parse().ok().map(Self::Status);
        }
        if let Some(phase) = rest.strip_prefix("On") {
            return phase.parse().ok().map(Self::Phase);
        }
        None
    }
}

/// Logical field a group of markers belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Status,
    Phase,
    Lifecycle,
    Reserve,
}

/// A show/hide marker role, e.g. `ShowStatusActive` or `HideOnEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    pub toggle: Toggle,
    pub condition: Condition,
}

impl Marker {
    pub fn show(condition: Condition) -> Self {
        Self {
            toggle: Toggle::Show,
            condition,
        }
    }

    pub fn hide(condition: Condition) -> Self {
        Self {
            toggle: Toggle::Hide,
            condition,
        }
    }

    pub fn class_name(&self) -> String {
        format!(
            "{}{}{}",
            RT_PREFIX,
            self.toggle.as_str(),
            self.condition.qualifier()
        )
    }

    /// Inverse of [`Self::class_name`]. Unknown classes yield `None`.
    pub fn parse(class: &str) -> Option<Self> {
        let rest = class.strip_prefix(RT_PREFIX)?;
        let (toggle, rest) = if let Some(r) = rest.strip_prefix("Show") {
            (Toggle::Show, r)
        } else if let Some(r) = rest.strip_prefix("Hide") {
            (Toggle::Hide, r)
        } else {
            return None;
        };
        Condition::parse_qualifier(rest).map(|condition| Self { toggle, condition })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

/// Elements whose text (and sometimes class) mirrors a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirror {
    CurrentPrice,
    MinimumBid,
    BuyNowPrice,
    Quantity,
    AcceptedListingActionCount,
    Status,
    ColoredStatus,
    EndingCountdown,
    StartingCountdown,
    EventCountdown,
    EventTimeLabel,
    EventBidStatusLabel,
}

impl Mirror {
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::CurrentPrice => "awe-rt-CurrentPrice",
            Self::MinimumBid => "awe-rt-MinimumBid",
            Self::BuyNowPrice => "awe-rt-BuyNowPrice",
            Self::Quantity => "awe-rt-Quantity",
            Self::AcceptedListingActionCount => "awe-rt-AcceptedListingActionCount",
            Self::Status => "awe-rt-Status",
            Self::ColoredStatus => "awe-rt-ColoredStatus",
            Self::EndingCountdown => "awe-rt-endingDTTM",
            Self::StartingCountdown => "awe-rt-startingDTTM",
            Self::EventCountdown => "awe-rt-eventtimecountdown",
            Self::EventTimeLabel => "awe-rt-eventtimelabel",
            Self::EventBidStatusLabel => "awe-rt-eventbidstatuslabel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_are_exact() {
        assert_eq!(
            Marker::show(Condition::Status(ListingStatus::AwaitingPayment)).class_name(),
            "awe-rt-ShowStatusAwaitingPayment"
        );
        assert_eq!(
            Marker::hide(Condition::Phase(EventPhase::ClosingStarted)).class_name(),
            "awe-rt-HideOnClosingStarted"
        );
        assert_eq!(Marker::show(Condition::Start).class_name(), "awe-rt-ShowOnStart");
        assert_eq!(Marker::hide(Condition::End).class_name(), "awe-rt-HideOnEnd");
        assert_eq!(
            Marker::hide(Condition::ReserveNotMet).class_name(),
            "awe-rt-HideReserveNotMet"
        );
        assert_eq!(Mirror::EndingCountdown.class_name(), "awe-rt-endingDTTM");
    }

    #[test]
    fn test_parse_known_markers() {
        assert_eq!(
            Marker::parse("awe-rt-ShowStatusClosing"),
            Some(Marker::show(Condition::Status(ListingStatus::Closing)))
        );
        assert_eq!(
            Marker::parse("awe-rt-ShowOnBiddingEnded"),
            Some(Marker::show(Condition::Phase(EventPhase::BiddingEnded)))
        );
        assert_eq!(Marker::parse("awe-rt-HideOnEnd"), Some(Marker::hide(Condition::End)));
        assert_eq!(
            Marker::parse("awe-rt-ShowReserveMet"),
            Some(Marker::show(Condition::ReserveMet))
        );
    }

    #[test]
    fn test_parse_rejects_non_markers() {
        assert_eq!(Marker::parse("awe-rt-CurrentPrice"), None);
        assert_eq!(Marker::parse("awe-rt-ShowStatusBogus"), None);
        assert_eq!(Marker::parse("ShowStatusActive"), None);
        assert_eq!(Marker::parse("awe-hidden"), None);
    }

    #[test]
    fn test_toggle_visibility() {
        assert!(Toggle::Show.visible_when(true));
        assert!(!Toggle::Show.visible_when(false));
        assert!(!Toggle::Hide.visible_when(true));
        assert!(Toggle::Hide.visible_when(false));
    }

    #[test]
    fn test_condition_fields() {
        assert_eq!(Condition::Status(ListingStatus::Draft).field(), Field::Status);
        assert_eq!(Condition::Phase(EventPhase::Preview).field(), Field::Phase);
        assert_eq!(Condition::End.field(), Field::Lifecycle);
        assert_eq!(Condition::ReserveNotMet.field(), Field::Reserve);
    }
}
