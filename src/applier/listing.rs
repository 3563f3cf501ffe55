use tracing::debug;

use super::{set_condition, set_visible, write_labelled_mirrors, write_mirrors};
use crate::dom::{
    find_all_markers_for_field, find_container, find_markers, Document, EntityKind, NodeId,
};
use crate::markers::{Condition, Field, Marker, Mirror};
use crate::status::{ListingStatus, StatusValue};

/// Attribute on a listing container holding its current status.
pub const STATUS_ATTRIBUTE: &str = "data-listingstatus";

/// Switch a listing to `status`.
///
/// Exclusive: afterwards only the markers for `status` are in their active
/// state. Terminal statuses also reveal the end-only markers. Calling twice
/// with the same status leaves the same visible state as calling once.
///
/// Returns false (and writes nothing) when the listing is not on the page.
pub fn apply_listing_status(doc: &mut Document, listing_id: u64, status: &StatusValue) -> bool {
    let Some(container) = find_container(doc, EntityKind::Listing, listing_id) else {
        debug!("listing {} not rendered, skipping status {}", listing_id, status);
        return false;
    };

    // Back to the baseline for every status
    for (node, marker) in find_all_markers_for_field(doc, container, Field::Status) {
        set_visible(doc, node, marker.toggle.visible_when(false));
    }

    if let Some(new) = status.known() {
        set_condition(doc, container, Condition::Status(new), true);
    }

    if status.is_terminal() {
        end_container(doc, container);
    }

    write_mirrors(doc, container, Mirror::Status, status.as_str(), false);

    let colored = format!(
        "{} label {}",
        Mirror::ColoredStatus.class_name(),
        status.style_class().label_class()
    );
    write_labelled_mirrors(doc, container, Mirror::ColoredStatus, status.as_str(), &colored);

    if let Err(e) = doc.set_attr(container, STATUS_ATTRIBUTE, status.as_str()) {
        debug!("could not record status on listing {}: {}", listing_id, e);
    }
    true
}

/// Toggle the reserve indicators of a listing.
pub fn apply_reserve_met(doc: &mut Document, listing_id: u64, reserve_met: bool) -> bool {
    let Some(container) = find_container(doc, EntityKind::Listing, listing_id) else {
        debug!("listing {} not rendered, skipping reserve update", listing_id);
        return false;
    };

    set_condition(doc, container, Condition::ReserveMet, reserve_met);
    set_condition(doc, container, Condition::ReserveNotMet, !reserve_met);
    true
}

/// Reveal the elements that only apply once a listing is open.
pub fn handle_listing_start(doc: &mut Document, listing_id: u64) -> bool {
    match find_container(doc, EntityKind::Listing, listing_id) {
        Some(container) => {
            start_container(doc, container);
            true
        }
        None => false,
    }
}

/// Reveal the elements that only apply once bidding has concluded.
pub fn handle_listing_end(doc: &mut Document, listing_id: u64) -> bool {
    match find_container(doc, EntityKind::Listing, listing_id) {
        Some(container) => {
            end_container(doc, container);
            true
        }
        None => false,
    }
}

fn start_container(doc: &mut Document, container: NodeId) {
    set_condition(doc, container, Condition::Start, true);
}

fn end_container(doc: &mut Document, container: NodeId) {
    set_condition(doc, container, Condition::End, true);
}

/// First pass over a freshly rendered page.
///
/// Every listing container carrying a status attribute gets that status's
/// show markers revealed; open listings (Active, Closing) also get their
/// start-only markers. Returns the number of listings initialized.
pub fn initialize_status_display(doc: &mut Document) -> usize {
    let containers = doc.find_all(doc.root(), |el| {
        el.attr(EntityKind::Listing.id_attribute()).is_some() && el.attr(STATUS_ATTRIBUTE).is_some()
    });

    let mut initialized = 0;
    for container in containers {
        let Some(raw) = doc.attr(container, STATUS_ATTRIBUTE) else {
            continue;
        };
        let Ok(status) = raw.parse::<ListingStatus>() else {
            debug!("container {:?} has unknown status {:?}", container, raw);
            continue;
        };

        for node in find_markers(doc, container, Marker::show(Condition::Status(status))) {
            set_visible(doc, node, true);
        }
        if status.is_started() {
            start_container(doc, container);
        }
        initialized += 1;
    }
    initialized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::test_support::{visibility_snapshot, visible};

    struct Card {
        container: NodeId,
        show_active: NodeId,
        show_closing: NodeId,
        hide_closing: NodeId,
        show_successful: NodeId,
        show_successful_dup: NodeId,
        show_on_end: NodeId,
        hide_on_end: NodeId,
        show_on_start: NodeId,
        status_text: NodeId,
        colored: NodeId,
    }

    fn render(doc: &mut Document, id: u64, status: ListingStatus) -> Card {
        let body = doc.body();
        let container = doc.append_element(body, "div", "galleryUnit").unwrap();
        doc.set_attr(container, "data-listingid", &id.to_string()).unwrap();
        doc.set_attr(container, STATUS_ATTRIBUTE, status.as_str()).unwrap();

        let mut el = |class: &str| doc.append_element(container, "div", class).unwrap();
        Card {
            container,
            show_active: el("awe-hidden awe-rt-ShowStatusActive"),
            show_closing: el("awe-hidden awe-rt-ShowStatusClosing"),
            hide_closing: el("awe-rt-HideStatusClosing"),
            show_successful: el("awe-hidden awe-rt-ShowStatusSuccessful"),
            show_successful_dup: el("awe-hidden awe-rt-ShowStatusSuccessful"),
            show_on_end: el("awe-hidden awe-rt-ShowOnEnd"),
            hide_on_end: el("awe-rt-HideOnEnd"),
            show_on_start: el("awe-hidden awe-rt-ShowOnStart"),
            status_text: el("awe-rt-Status"),
            colored: el("label label-success awe-rt-ColoredStatus"),
        }
    }

    #[test]
    fn test_apply_status_is_exclusive() {
        let mut doc = Document::new();
        let card = render(&mut doc, 101, ListingStatus::Active);

        apply_listing_status(&mut doc, 101, &ListingStatus::Active.into());
        assert!(visible(&doc, card.show_active));

        apply_listing_status(&mut doc, 101, &ListingStatus::Closing.into());
        assert!(!visible(&doc, card.show_active));
        assert!(visible(&doc, card.show_closing));
        assert!(!visible(&doc, card.hide_closing));
        assert!(!visible(&doc, card.show_successful));
    }

    #[test]
    fn test_exclusive_for_every_pair() {
        for a in ListingStatus::ALL {
            for b in ListingStatus::ALL {
                if a == b {
                    continue;
                }
                let mut doc = Document::new();
                let container = doc.append_element(doc.body(), "div", "").unwrap();
                doc.set_attr(container, "data-listingid", "7").unwrap();
                let class_a = format!("awe-hidden awe-rt-ShowStatus{}", a);
                let show_a = doc.append_element(container, "span", &class_a).unwrap();
                let class_b = format!("awe-hidden awe-rt-ShowStatus{}", b);
                let show_b = doc.append_element(container, "span", &class_b).unwrap();

                apply_listing_status(&mut doc, 7, &a.into());
                apply_listing_status(&mut doc, 7, &b.into());

                assert!(!visible(&doc, show_a), "{} still visible after {}", a, b);
                assert!(visible(&doc, show_b), "{} hidden after applying it", b);
            }
        }
    }

    #[test]
    fn test_apply_status_idempotent() {
        let mut doc = Document::new();
        render(&mut doc, 101, ListingStatus::Active);

        apply_listing_status(&mut doc, 101, &ListingStatus::Successful.into());
        let once = visibility_snapshot(&doc);
        let once_html = doc.to_html(doc.root());

        apply_listing_status(&mut doc, 101, &ListingStatus::Successful.into());
        assert_eq!(visibility_snapshot(&doc), once);
        assert_eq!(doc.to_html(doc.root()), once_html);
    }

    #[test]
    fn test_duplicate_markers_all_updated() {
        let mut doc = Document::new();
        let card = render(&mut doc, 101, ListingStatus::Active);

        apply_listing_status(&mut doc, 101, &ListingStatus::Successful.into());
        assert!(visible(&doc, card.show_successful));
        assert!(visible(&doc, card.show_successful_dup));
    }

    #[test]
    fn test_terminal_status_reveals_end_markers() {
        for terminal in [ListingStatus::Successful, ListingStatus::Unsuccessful] {
            let mut doc = Document::new();
            let card = render(&mut doc, 102, ListingStatus::Closing);

            apply_listing_status(&mut doc, 102, &terminal.into());
            assert!(visible(&doc, card.show_on_end));
            assert!(!visible(&doc, card.hide_on_end));
        }
    }

    #[test]
    fn test_non_terminal_leaves_end_markers() {
        let mut doc = Document::new();
        let card = render(&mut doc, 102, ListingStatus::Active);

        apply_listing_status(&mut doc, 102, &ListingStatus::Paused.into());
        assert!(!visible(&doc, card.show_on_end));
        assert!(visible(&doc, card.hide_on_end));
    }

    #[test]
    fn test_mirrors_and_attribute_updated() {
        let mut doc = Document::new();
        let card = render(&mut doc, 101, ListingStatus::Active);

        apply_listing_status(&mut doc, 101, &ListingStatus::Closing.into());
        assert_eq!(doc.text(card.status_text), "Closing");
        assert_eq!(doc.text(card.colored), "Closing");
        assert_eq!(
            doc.class_name(card.colored).unwrap(),
            "awe-rt-ColoredStatus label label-warning"
        );
        assert_eq!(doc.attr(card.container, STATUS_ATTRIBUTE), Some("Closing"));
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let mut doc = Document::new();
        let card = render(&mut doc, 101, ListingStatus::Active);
        apply_listing_status(&mut doc, 101, &ListingStatus::Active.into());

        apply_listing_status(&mut doc, 101, &StatusValue::from("AwaitingValidation"));
        assert!(!visible(&doc, card.show_active));
        assert_eq!(doc.text(card.status_text), "AwaitingValidation");
        assert_eq!(
            doc.class_name(card.colored).unwrap(),
            "awe-rt-ColoredStatus label label-default"
        );
        assert_eq!(
            doc.attr(card.container, STATUS_ATTRIBUTE),
            Some("AwaitingValidation")
        );
    }

    #[test]
    fn test_missing_listing_writes_nothing() {
        let mut doc = Document::new();
        render(&mut doc, 101, ListingStatus::Active);
        let before = doc.mutation_count();

        assert!(!apply_listing_status(&mut doc, 555, &ListingStatus::Successful.into()));
        assert!(!apply_reserve_met(&mut doc, 555, true));
        assert!(!handle_listing_end(&mut doc, 555));
        assert_eq!(doc.mutation_count(), before);
    }

    #[test]
    fn test_reserve_met_toggles() {
        let mut doc = Document::new();
        let container = doc.append_element(doc.body(), "div", "").unwrap();
        doc.set_attr(container, "data-listingid", "103").unwrap();
        let mut span = |class: &str| doc.append_element(container, "span", class).unwrap();
        let show_met = span("awe-hidden awe-rt-ShowReserveMet");
        let hide_met = span("awe-rt-HideReserveMet");
        let show_not = span("awe-rt-ShowReserveNotMet");
        let hide_not = span("awe-hidden awe-rt-HideReserveNotMet");

        apply_reserve_met(&mut doc, 103, true);
        assert!(visible(&doc, show_met));
        assert!(!visible(&doc, hide_met));
        assert!(!visible(&doc, show_not));
        assert!(visible(&doc, hide_not));

        apply_reserve_met(&mut doc, 103, false);
        assert!(!visible(&doc, show_met));
        assert!(visible(&doc, hide_met));
        assert!(visible(&doc, show_not));
        assert!(!visible(&doc, hide_not));
    }

    #[test]
    fn test_initialize_status_display() {
        let mut doc = Document::new();
        let active = render(&mut doc, 101, ListingStatus::Active);
        let preview = render(&mut doc, 104, ListingStatus::Preview);

        assert_eq!(initialize_status_display(&mut doc), 2);
        assert!(visible(&doc, active.show_active));
        assert!(visible(&doc, active.show_on_start));
        // Preview listings have not started
        assert!(!visible(&doc, preview.show_on_start));
    }

    #[test]
    fn test_handle_listing_start_and_end() {
        let mut doc = Document::new();
        let card = render(&mut doc, 101, ListingStatus::Preview);

        assert!(handle_listing_start(&mut doc, 101));
        assert!(visible(&doc, card.show_on_start));

        assert!(handle_listing_end(&mut doc, 101));
        assert!(visible(&doc, card.show_on_end));
        assert!(!visible(&doc, card.hide_on_end));
    }
}
