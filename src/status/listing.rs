use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::StyleClass;

/// Listing status. Closed set rendered by the storefront templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Active,
    Preview,
    Closing,
    Scheduled,
    Archived,
    Successful,
    Unsuccessful,
    Draft,
    Pending,
    AwaitingPayment,
    FailedValidation,
    Validated,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown listing status: {0}")]
pub struct ParseStatusError(pub String);

impl ListingStatus {
    pub const ALL: [ListingStatus; 13] = [
        Self::Active,
        Self::Preview,
        Self::Closing,
        Self::Scheduled,
        Self::Archived,
        Self::Successful,
        Self::Unsuccessful,
        Self::Draft,
        Self::Pending,
        Self::AwaitingPayment,
        Self::FailedValidation,
        Self::Validated,
        Self::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Preview => "Preview",
            Self::Closing => "Closing",
            Self::Scheduled => "Scheduled",
            Self::Archived => "Archived",
            Self::Successful => "Successful",
            Self::Unsuccessful => "Unsuccessful",
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::AwaitingPayment => "AwaitingPayment",
            Self::FailedValidation => "FailedValidation",
            Self::Validated => "Validated",
            Self::Paused => "Paused",
        }
    }

    /// Label style for this status.
    ///
    /// | Status                                    | Class   |
    /// |-------------------------------------------|---------|
    /// | Active, Successful, Validated             | success |
    /// | Preview, Scheduled                        | info    |
    /// | Closing, Pending, Paused, AwaitingPayment | warning |
    /// | Unsuccessful, Draft, Archived             | default |
    /// | FailedValidation                          | danger  |
    pub fn style_class(&self) -> StyleClass {
        match self {
            Self::Active | Self::Successful | Self::Validated => StyleClass::Success,
            Self::Preview | Self::Scheduled => StyleClass::Info,
            Self::Closing | Self::Pending | Self::Paused | Self::AwaitingPayment => {
                StyleClass::Warning
            }
            Self::Unsuccessful | Self::Draft | Self::Archived => StyleClass::Default,
            Self::FailedValidation => StyleClass::Danger,
        }
    }

    /// Bidding has concluded; end-only markers become relevant.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Unsuccessful)
    }

    /// Listing is open for bidding; start-only markers become relevant.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Active | Self::Closing)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A status as received from outside the engine.
///
/// Callers are trusted to send known statuses, but anything else is kept
/// verbatim so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    Known(ListingStatus),
    Other(String),
}

impl StatusValue {
    pub fn known(&self) -> Option<ListingStatus> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(status) => status.as_str(),
            Self::Other(raw) => raw,
        }
    }

    pub fn style_class(&self) -> StyleClass {
        self.known()
            .map(|s| s.style_class())
            .unwrap_or(StyleClass::Default)
    }

    pub fn is_terminal(&self) -> bool {
        self.known().is_some_and(|s| s.is_terminal())
    }
}

impl From<ListingStatus> for StatusValue {
    fn from(status: ListingStatus) -> Self {
        Self::Known(status)
    }
}

impl From<&str> for StatusValue {
    fn from(raw: &str) -> Self {
        raw.parse::<ListingStatus>()
            .map(Self::Known)
            .unwrap_or_else(|_| Self::Other(raw.to_string()))
    }
}

impl From<String> for StatusValue {
    fn from(raw: String) -> Self {
        match raw.parse::<ListingStatus>() {
            Ok(status) => Self::Known(status),
            Err(_) => Self::Other(raw),
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
