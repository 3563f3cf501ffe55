//! State applier: turns a status/phase/value change into class and text
//! writes on the affected marker elements.
//!
//! Every write is best-effort and independent. A failure on one element is
//! logged and skipped so its siblings still update.

pub mod event;
pub mod listing;

pub use event::{apply_event_phase, set_event_time_label};
pub use listing::{
    apply_listing_status, apply_reserve_met, handle_listing_end, handle_listing_start,
    initialize_status_display,
};

use tracing::debug;

use crate::dom::{find_markers, find_mirrors, Document, NodeId};
use crate::markers::{Condition, Marker, Mirror, HIDDEN_CLASS, PULSE_CLASS};

/// Show or hide one element via the shared hidden class.
pub(crate) fn set_visible(doc: &mut Document, node: NodeId, visible: bool) {
    if let Err(e) = doc.toggle_class(node, HIDDEN_CLASS, !visible) {
        debug!("skipping visibility write on {:?}: {}", node, e);
    }
}

/// Apply a condition to every marker keyed on it under `scope`:
/// `Show*` markers become visible iff `active`, `Hide*` markers the reverse.
/// Returns the number of elements touched.
pub fn set_condition(
    doc: &mut Document,
    scope: NodeId,
    condition: Condition,
    active: bool,
) -> usize {
    let mut touched = 0;
    for marker in [Marker::show(condition), Marker::hide(condition)] {
        let visible = marker.toggle.visible_when(active);
        for node in find_markers(doc, scope, marker) {
            set_visible(doc, node, visible);
            touched += 1;
        }
    }
    touched
}

/// Overwrite the text of every `mirror` element under `scope`.
pub fn write_mirrors(
    doc: &mut Document,
    scope: NodeId,
    mirror: Mirror,
    text: &str,
    pulse: bool,
) -> usize {
    let nodes = find_mirrors(doc, scope, mirror);
    for node in &nodes {
        if let Err(e) = doc.set_text(*node, text) {
            debug!("skipping {} write on {:?}: {}", mirror.class_name(), node, e);
            continue;
        }
        if pulse {
            pulse_element(doc, *node);
        }
    }
    nodes.len()
}

/// Restart the highlight animation on an element.
fn pulse_element(doc: &mut Document, node: NodeId) {
    let result = doc
        .remove_class(node, PULSE_CLASS)
        .and_then(|_| doc.add_class(node, PULSE_CLASS));
    if let Err(e) = result {
        debug!("skipping pulse on {:?}: {}", node, e);
    }
}

/// Overwrite text and replace the class list of every `mirror` element.
pub(crate) fn write_labelled_mirrors(
    doc: &mut Document,
    scope: NodeId,
    mirror: Mirror,
    text: &str,
    class_name: &str,
) -> usize {
    let nodes = find_mirrors(doc, scope, mirror);
    for node in &nodes {
        let result = doc
            .set_text(*node, text)
            .and_then(|_| doc.set_class_name(*node, class_name));
        if let Err(e) = result {
            debug!("skipping {} write on {:?}: {}", mirror.class_name(), node, e);
        }
    }
    nodes.len()
}
