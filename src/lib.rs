//! Mock real-time page engine.
//!
//! Simulates live auction updates against an in-memory page: listing status
//! and event phase changes toggle marker elements, a single scheduler keeps
//! every countdown ticking, and transient notices come and go.

pub mod applier;
pub mod clock;
pub mod config;
pub mod demo;
pub mod dom;
pub mod events;
pub mod feeds;
pub mod format;
pub mod markers;
pub mod notify;
pub mod realtime;
pub mod scheduler;
pub mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use dom::{Document, DomError, NodeId};
pub use events::{Command, ConnectionStatus};
pub use notify::DismissalTimer;
pub use realtime::{MockRealtime, SharedRealtime};
pub use scheduler::CountdownScheduler;
