//! Preview pages for the demo binary.
//!
//! Builds the same markup the storefront templates emit: listing cards for a
//! gallery, a listing detail panel and an event header, each wired with the
//! real-time marker classes. Render-time visibility is baked in the way the
//! templates do it; [`crate::MockRealtime::init`] takes it from there.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::applier::listing::STATUS_ATTRIBUTE;
use crate::dom::{Document, DomError, EntityKind, NodeId};
use crate::format::{format_price, format_time_remaining};
use crate::markers::{Condition, Marker, Mirror, HIDDEN_CLASS};
use crate::realtime::CONNECTION_STATUS_ID;
use crate::scheduler::{ENDING_ATTRIBUTE, STARTING_ATTRIBUTE, TIME_ELEMENT_ID};
use crate::status::{EventPhase, LabelContext, ListingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Auction,
    FixedPrice,
    Classified,
}

/// Everything a template needs to render one listing.
#[derive(Debug, Clone)]
pub struct ListingFixture {
    pub id: u64,
    pub title: String,
    pub kind: ListingKind,
    pub status: ListingStatus,
    pub price: Decimal,
    pub bid_count: u32,
    pub quantity: u32,
    pub buy_now: Option<Decimal>,
    /// `None` when the listing has no reserve
    pub reserve_met: Option<bool>,
    pub ends_at: DateTime<Utc>,
    pub starts_at: Option<DateTime<Utc>>,
}

impl ListingFixture {
    pub fn auction(id: u64, title: &str, status: ListingStatus, ends_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind: ListingKind::Auction,
            status,
            price: Decimal::ZERO,
            bid_count: 0,
            quantity: 1,
            buy_now: None,
            reserve_met: None,
            ends_at,
            starts_at: None,
        }
    }
}

/// Which preview template to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoPage {
    #[default]
    Gallery,
    Detail,
}

// =============================================================================
// MARKUP HELPERS
// =============================================================================

fn text_el(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    class: &str,
    text: &str,
) -> Result<NodeId, DomError> {
    let el = doc.append_element(parent, tag, class)?;
    doc.set_text(el, text)?;
    Ok(el)
}

/// A marker element with its render-time visibility.
fn marker(
    doc: &mut Document,
    parent: NodeId,
    role: Marker,
    visible: bool,
    text: &str,
) -> Result<NodeId, DomError> {
    let class = if visible {
        role.class_name()
    } else {
        format!("{} {}", HIDDEN_CLASS, role.class_name())
    };
    text_el(doc, parent, "div", &class, text)
}

fn mirror(
    doc: &mut Document,
    parent: NodeId,
    role: Mirror,
    extra: &str,
    text: &str,
) -> Result<NodeId, DomError> {
    let class = if extra.is_empty() {
        role.class_name().to_string()
    } else {
        format!("{} {}", extra, role.class_name())
    };
    text_el(doc, parent, "span", &class, text)
}

fn countdown(
    doc: &mut Document,
    parent: NodeId,
    kind: Mirror,
    attr: &str,
    target: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<NodeId, DomError> {
    let remaining = (target - now).num_milliseconds();
    let el = mirror(doc, parent, kind, "", &format_time_remaining(remaining))?;
    doc.set_attr(el, attr, &target.to_rfc3339())?;
    Ok(el)
}

/// Status-keyed blocks. Templates start them all hidden; init reveals the
/// listing's current one.
fn status_blocks(doc: &mut Document, parent: NodeId) -> Result<(), DomError> {
    let blocks = [
        (ListingStatus::Preview, "Opens for bidding soon"),
        (ListingStatus::Active, "Bidding is open"),
        (ListingStatus::Closing, "Closing soon"),
        (ListingStatus::Successful, "Sold"),
        (ListingStatus::Unsuccessful, "Not sold"),
        (ListingStatus::Paused, "Bidding paused"),
    ];
    for (status, text) in blocks {
        marker(doc, parent, Marker::show(Condition::Status(status)), false, text)?;
    }
    // Watch button disappears once the listing is archived
    let archived = Marker::hide(Condition::Status(ListingStatus::Archived));
    marker(doc, parent, archived, true, "Watch")?;
    Ok(())
}

fn reserve_blocks(
    doc: &mut Document,
    parent: NodeId,
    reserve_met: Option<bool>,
) -> Result<(), DomError> {
    let Some(met) = reserve_met else {
        return Ok(());
    };
    marker(doc, parent, Marker::show(Condition::ReserveMet), met, "Reserve met")?;
    marker(doc, parent, Marker::show(Condition::ReserveNotMet), !met, "Reserve not met")?;
    Ok(())
}

fn lifecycle_blocks(
    doc: &mut Document,
    parent: NodeId,
    listing: &ListingFixture,
) -> Result<(), DomError> {
    let started = listing.status.is_started();
    let ended = listing.status.is_terminal();
    marker(doc, parent, Marker::show(Condition::Start), started, "Bid now")?;
    marker(doc, parent, Marker::hide(Condition::Start), !started, "Not yet open")?;
    marker(doc, parent, Marker::show(Condition::End), ended, "Bidding closed")?;

    let bid_box = marker(doc, parent, Marker::hide(Condition::End), !ended, "")?;
    let input = doc.append_element(bid_box, "input", "form-control")?;
    doc.set_attr(input, "placeholder", "Your max bid")?;
    Ok(())
}

fn colored_status(
    doc: &mut Document,
    parent: NodeId,
    status: ListingStatus,
) -> Result<NodeId, DomError> {
    let class = format!("label {}", status.style_class().label_class());
    mirror(doc, parent, Mirror::ColoredStatus, &class, status.as_str())
}

fn listing_container(
    doc: &mut Document,
    parent: NodeId,
    class: &str,
    listing: &ListingFixture,
) -> Result<NodeId, DomError> {
    let container = doc.append_element(parent, "div", class)?;
    doc.set_attr(container, EntityKind::Listing.id_attribute(), &listing.id.to_string())?;
    doc.set_attr(container, STATUS_ATTRIBUTE, listing.status.as_str())?;
    Ok(container)
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// Gallery card for one listing.
pub fn render_listing_card(
    doc: &mut Document,
    parent: NodeId,
    listing: &ListingFixture,
    now: DateTime<Utc>,
) -> Result<NodeId, DomError> {
    let card = listing_container(doc, parent, "galleryUnit panel panel-default", listing)?;
    text_el(doc, card, "h4", "galleryTitle", &listing.title)?;
    colored_status(doc, card, listing.status)?;

    let price_row = doc.append_element(card, "div", "galleryPrice")?;
    let price = format_price(Some(listing.price));
    match listing.kind {
        ListingKind::Auction => {
            mirror(doc, price_row, Mirror::CurrentPrice, "NumberPart", &price)?;
            let bids = doc.append_element(price_row, "span", "bidCount")?;
            let count = listing.bid_count.to_string();
            mirror(doc, bids, Mirror::AcceptedListingActionCount, "", &count)?;
            reserve_blocks(doc, card, listing.reserve_met)?;
        }
        ListingKind::FixedPrice => {
            let buy_now = format_price(listing.buy_now.or(Some(listing.price)));
            mirror(doc, price_row, Mirror::BuyNowPrice, "NumberPart", &buy_now)?;
            let quantity = listing.quantity.to_string();
            mirror(doc, price_row, Mirror::Quantity, "quantity", &quantity)?;
        }
        ListingKind::Classified => {
            mirror(doc, price_row, Mirror::CurrentPrice, "NumberPart", &price)?;
        }
    }

    let timing = doc.append_element(card, "div", "galleryTime")?;
    match listing.starts_at {
        Some(start) if listing.status == ListingStatus::Preview => {
            countdown(doc, timing, Mirror::StartingCountdown, STARTING_ATTRIBUTE, start, now)?;
        }
        _ => {
            let end = listing.ends_at;
            countdown(doc, timing, Mirror::EndingCountdown, ENDING_ATTRIBUTE, end, now)?;
        }
    }

    status_blocks(doc, card)?;
    lifecycle_blocks(doc, card, listing)?;
    Ok(card)
}

/// Detail panel for one listing. Carries the status twice (panel heading
/// and breadcrumb), so every update has to reach both.
pub fn render_listing_detail(
    doc: &mut Document,
    parent: NodeId,
    listing: &ListingFixture,
    now: DateTime<Utc>,
) -> Result<NodeId, DomError> {
    let panel = listing_container(doc, parent, "detail__panel", listing)?;

    let crumb = doc.append_element(panel, "ol", "breadcrumb")?;
    text_el(doc, crumb, "li", "", &listing.title)?;
    let crumb_status = doc.append_element(crumb, "li", "")?;
    mirror(doc, crumb_status, Mirror::Status, "", listing.status.as_str())?;

    text_el(doc, panel, "h1", "detail__title", &listing.title)?;
    colored_status(doc, panel, listing.status)?;

    let price = format_price(Some(listing.price));
    let pricing = doc.append_element(panel, "dl", "detail__pricing")?;
    text_el(doc, pricing, "dt", "", "Current Price")?;
    let dd = doc.append_element(pricing, "dd", "")?;
    mirror(doc, dd, Mirror::CurrentPrice, "NumberPart", &price)?;
    text_el(doc, pricing, "dt", "", "Minimum Bid")?;
    let dd = doc.append_element(pricing, "dd", "")?;
    mirror(doc, dd, Mirror::MinimumBid, "NumberPart", &price)?;
    text_el(doc, pricing, "dt", "", "Bids")?;
    let dd = doc.append_element(pricing, "dd", "")?;
    let count = listing.bid_count.to_string();
    mirror(doc, dd, Mirror::AcceptedListingActionCount, "", &count)?;
    if let Some(buy_now) = listing.buy_now {
        text_el(doc, pricing, "dt", "", "Buy Now")?;
        let dd = doc.append_element(pricing, "dd", "")?;
        mirror(doc, dd, Mirror::BuyNowPrice, "NumberPart", &format_price(Some(buy_now)))?;
    }

    let timing = doc.append_element(panel, "div", "detail__time")?;
    text_el(doc, timing, "span", "", "Time Remaining: ")?;
    let end = listing.ends_at;
    countdown(doc, timing, Mirror::EndingCountdown, ENDING_ATTRIBUTE, end, now)?;
    if let Some(start) = listing.starts_at {
        text_el(doc, timing, "span", "", " Starts: ")?;
        countdown(doc, timing, Mirror::StartingCountdown, STARTING_ATTRIBUTE, start, now)?;
    }

    reserve_blocks(doc, panel, listing.reserve_met)?;
    status_blocks(doc, panel)?;
    lifecycle_blocks(doc, panel, listing)?;
    Ok(panel)
}

/// Event header with phase badge, countdown and phase-gated blocks.
pub fn render_event_header(
    doc: &mut Document,
    parent: NodeId,
    event_id: u64,
    title: &str,
    phase: EventPhase,
    next_change: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<NodeId, DomError> {
    let ctx = LabelContext::Gallery;
    let header = doc.append_element(parent, "div", "event-header")?;
    doc.set_attr(header, EntityKind::Event.id_attribute(), &event_id.to_string())?;

    text_el(doc, header, "h2", "event-title", title)?;
    let badge = format!("label {}", phase.style_class(ctx).label_class());
    mirror(doc, header, Mirror::EventBidStatusLabel, &badge, phase.label())?;
    mirror(doc, header, Mirror::EventTimeLabel, "", phase.time_label(ctx))?;
    countdown(doc, header, Mirror::EventCountdown, ENDING_ATTRIBUTE, next_change, now)?;

    let revealed = phase.revealed_phases();
    let blocks = [
        (EventPhase::BiddingStarted, "Bidding is open on all lots", "Bidding opens soon"),
        (EventPhase::ClosingStarted, "Lots are closing one by one", "Lots close in order"),
        (EventPhase::BiddingEnded, "This event has ended", "Register to bid"),
    ];
    for (p, shown, hidden) in blocks {
        let reached = revealed.contains(&p);
        marker(doc, header, Marker::show(Condition::Phase(p)), reached, shown)?;
        marker(doc, header, Marker::hide(Condition::Phase(p)), !reached, hidden)?;
    }
    Ok(header)
}

/// Page chrome shared by every template: connection indicator, clock and
/// the main `.container`. Returns the container.
fn page_shell(doc: &mut Document, now: DateTime<Utc>) -> Result<NodeId, DomError> {
    let body = doc.body();
    let nav = doc.append_element(body, "nav", "navbar navbar-default")?;
    let indicator = doc.append_element(nav, "span", "stopped")?;
    doc.set_attr(indicator, "id", CONNECTION_STATUS_ID)?;
    let clock = text_el(doc, nav, "span", "navbar-text", &now.to_rfc3339())?;
    doc.set_attr(clock, "id", TIME_ELEMENT_ID)?;

    doc.append_element(body, "div", "container")
}

/// Listings shown on the gallery page.
pub fn gallery_fixtures(now: DateTime<Utc>) -> Vec<ListingFixture> {
    use ListingStatus::*;

    let ends = now + Duration::days(2);
    let mut vase = ListingFixture::auction(101, "Ming Dynasty Vase", Active, ends);
    vase.price = dec!(1250);
    vase.bid_count = 7;
    vase.reserve_met = Some(true);

    let ends = now + Duration::hours(1);
    let mut clock = ListingFixture::auction(102, "Victorian Mantel Clock", Closing, ends);
    clock.price = dec!(480);
    clock.bid_count = 12;

    let ends = now + Duration::hours(5);
    let mut painting = ListingFixture::auction(103, "Hudson River Landscape", Active, ends);
    painting.price = dec!(3100);
    painting.bid_count = 4;
    painting.reserve_met = Some(false);

    let ends = now + Duration::days(4);
    let mut rug = ListingFixture::auction(104, "Persian Silk Rug", Preview, ends);
    rug.starts_at = Some(now + Duration::minutes(90));

    let ends = now + Duration::days(10);
    let mut chairs = ListingFixture::auction(201, "Set of Four Windsor Chairs", Active, ends);
    chairs.kind = ListingKind::FixedPrice;
    chairs.price = dec!(950);
    chairs.buy_now = Some(dec!(950));
    chairs.quantity = 2;

    let ends = now + Duration::days(30);
    let mut piano = ListingFixture::auction(301, "Steinway Upright Piano", Active, ends);
    piano.kind = ListingKind::Classified;
    piano.price = dec!(4200);

    vec![vase, clock, painting, rug, chairs, piano]
}

/// Gallery page: event 1 in preview and the six gallery listings.
pub fn gallery_page(now: DateTime<Utc>) -> Result<Document, DomError> {
    let mut doc = Document::new();
    let container = page_shell(&mut doc, now)?;
    render_event_header(
        &mut doc,
        container,
        1,
        "Fall Estate Auction",
        EventPhase::Preview,
        now + Duration::minutes(30),
        now,
    )?;

    let gallery = doc.append_element(container, "div", "gallery row")?;
    for listing in gallery_fixtures(now) {
        render_listing_card(&mut doc, gallery, &listing, now)?;
    }
    Ok(doc)
}

/// Detail page for listing 102 inside event 1.
pub fn detail_page(now: DateTime<Utc>) -> Result<Document, DomError> {
    let mut doc = Document::new();
    let container = page_shell(&mut doc, now)?;
    render_event_header(
        &mut doc,
        container,
        1,
        "Fall Estate Auction",
        EventPhase::Preview,
        now + Duration::minutes(30),
        now,
    )?;

    let fixtures = gallery_fixtures(now);
    if let Some(listing) = fixtures.iter().find(|l| l.id == 102) {
        render_listing_detail(&mut doc, container, listing, now)?;
    }
    Ok(doc)
}

pub fn build_page(page: DemoPage, now: DateTime<Utc>) -> Result<Document, DomError> {
    match page {
        DemoPage::Gallery => gallery_page(now),
        DemoPage::Detail => detail_page(now),
    }
}
