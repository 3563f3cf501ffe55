use super::{Document, NodeId};
use crate::markers::{Field, Marker, Mirror};

/// Kind of entity a container element stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Listing,
    Event,
}

impl EntityKind {
    /// Attribute carrying the entity id on its container.
    pub fn id_attribute(&self) -> &'static str {
        match self {
            Self::Listing => "data-listingid",
            Self::Event => "data-eventid",
        }
    }
}

/// Locate the container rendered for `id`. `None` when the entity is not on
/// the page, which is a normal condition.
pub fn find_container(doc: &Document, kind: EntityKind, id: u64) -> Option<NodeId> {
    let attr = kind.id_attribute();
    let wanted = id.to_string();
    doc.find_first(doc.root(), |el| {
        el.attr(attr).is_some_and(|v| v.trim() == wanted)
    })
}

/// Every element under `scope` tagged with `marker`, duplicates included.
pub fn find_markers(doc: &Document, scope: NodeId, marker: Marker) -> Vec<NodeId> {
    let class = marker.class_name();
    doc.find_by_class(scope, &class)
}

/// Every show/hide marker under `scope` belonging to `field`, whatever its value.
pub fn find_all_markers_for_field(
    doc: &Document,
    scope: NodeId,
    field: Field,
) -> Vec<(NodeId, Marker)> {
    let mut out = Vec::new();
    for id in doc.descendants(scope) {
        let Some(el) = doc.element(id) else { continue };
        for marker in el.classes().filter_map(Marker::parse) {
            if marker.condition.field() == field {
                out.push((id, marker));
            }
        }
    }
    out
}

pub fn find_mirrors(doc: &Document, scope: NodeId, mirror: Mirror) -> Vec<NodeId> {
    doc.find_by_class(scope, mirror.class_name())
}
