//! Status and phase registry.
//!
//! Pure lookup tables from listing statuses and event phases to the
//! style classes and labels shown on the page. Every lookup is total:
//! unknown values fall back to [`StyleClass::Default`] and echo the raw text.

mod listing;
mod phase;

pub use listing::{ListingStatus, ParseStatusError, StatusValue};
pub use phase::{EventPhase, LabelContext, ParsePhaseError, PhaseValue};

/// Bootstrap 3 contextual class used for status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    Success,
    Info,
    Warning,
    Danger,
    Default,
}

impl StyleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Default => "default",
        }
    }

    /// Full label class, e.g. `label-success`.
    pub fn label_class(&self) -> String {
        format!("label-{}", self.as_str())
    }
}
