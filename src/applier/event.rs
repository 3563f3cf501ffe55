use tracing::debug;

use super::{set_condition, write_labelled_mirrors, write_mirrors};
use crate::dom::{find_container, Document, EntityKind, NodeId};
use crate::markers::{Condition, Mirror};
use crate::status::{EventPhase, LabelContext, PhaseValue};

/// Events may render their markers without a wrapping container; fall back
/// to the whole body in that case.
fn event_scope(doc: &Document, event_id: u64) -> NodeId {
    find_container(doc, EntityKind::Event, event_id).unwrap_or_else(|| {
        debug!("event {} has no container, using page scope", event_id);
        doc.body()
    })
}

/// Move an event to `phase`.
///
/// Cumulative: `ShowOn<P>` markers for `phase` and every earlier phase are
/// revealed (and their `HideOn<P>` counterparts hidden), later phases are
/// reset to the baseline.
pub fn apply_event_phase(doc: &mut Document, event_id: u64, phase: &PhaseValue) {
    let scope = event_scope(doc, event_id);

    for p in EventPhase::REVEAL_ORDER {
        set_condition(doc, scope, Condition::Phase(p), false);
    }
    for p in phase.revealed_phases() {
        set_condition(doc, scope, Condition::Phase(*p), true);
    }

    let ctx = LabelContext::Realtime;
    write_mirrors(doc, scope, Mirror::EventTimeLabel, phase.time_label(ctx), false);

    let badge = format!(
        "{} label {}",
        Mirror::EventBidStatusLabel.class_name(),
        phase.style_class(ctx).label_class()
    );
    write_labelled_mirrors(doc, scope, Mirror::EventBidStatusLabel, phase.label(), &badge);
}

/// Override the countdown caption of an event.
pub fn set_event_time_label(doc: &mut Document, event_id: u64, label: &str) {
    let scope = event_scope(doc, event_id);
    write_mirrors(doc, scope, Mirror::EventTimeLabel, label, false);
}
