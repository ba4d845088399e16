//! Timeline of upcoming benefit expiries, resets and card anniversaries.
//!
//! Recurring benefits contribute an expiry event and a reset event on the day
//! after it. Cards with a renewal date contribute their next anniversary. Only
//! dates from the reference date through the end of the window are listed.

use std::path::PathBuf;

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, warn};

use crate::catalog::{BenefitEntry, CardEntry, Catalog, load_catalog};
use crate::commands::common::{evaluate_benefit, skip_benefit};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CalendarData, CalendarEvent};
use crate::cycle::CardAnniversary;
use crate::cycle::date::format_iso_date;
use crate::{ClientError, ClientResult};

pub const DEFAULT_CALENDAR_MONTHS: u32 = 3;

#[derive(Debug, Clone)]
pub struct CalendarRunOptions {
    pub catalog_path: PathBuf,
    pub reference_date: NaiveDate,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Expiring,
    Reset,
    Anniversary,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expiring => "expiring",
            Self::Reset => "reset",
            Self::Anniversary => "anniversary",
        }
    }
}

pub fn run(options: &CalendarRunOptions) -> ClientResult<SuccessEnvelope> {
    let catalog = load_catalog(&options.catalog_path)?;
    let data = build_calendar(
        &catalog,
        &options.catalog_path.display().to_string(),
        options.reference_date,
        options.months,
    )?;
    success("calendar", data)
}

pub fn build_calendar(
    catalog: &Catalog,
    catalog_path: &str,
    reference: NaiveDate,
    months: u32,
) -> ClientResult<CalendarData> {
    let through = reference
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            ClientError::invalid_argument(&format!(
                "cannot build a calendar {months} months past {}",
                format_iso_date(&reference)
            ))
        })?;
    let in_window = |date: NaiveDate| reference <= date && date <= through;

    let mut timeline = Vec::new();
    let mut skipped = Vec::new();
    for card in &catalog.cards {
        for slot in &card.benefits {
            if slot.entry().is_ok_and(|benefit| !benefit.active) {
                continue;
            }
            let evaluated = slot.entry().and_then(|benefit| {
                evaluate_benefit(card, benefit, reference).map(|evaluated| (benefit, evaluated))
            });
            let (benefit, evaluated) = match evaluated {
                Ok(pair) => pair,
                Err(error) => {
                    skipped.push(skip_benefit(&card.id, slot.id(), &error));
                    continue;
                }
            };
            if !evaluated.cycle_type.recurs() {
                continue;
            }

            let expiry = evaluated.result.next_expiry_date;
            if in_window(expiry) {
                timeline.push(benefit_event(card, benefit, EventKind::Expiring, expiry));
            }
            if let Some(reset) = expiry.succ_opt()
                && in_window(reset)
            {
                timeline.push(benefit_event(card, benefit, EventKind::Reset, reset));
            }
        }

        if let Some(anniversary) = next_anniversary(card, reference)
            && in_window(anniversary)
        {
            timeline.push(anniversary_event(card, anniversary));
        }
    }

    timeline.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.kind.cmp(&right.kind))
            .then_with(|| left.event.card_id.cmp(&right.event.card_id))
            .then_with(|| left.event.benefit_id.cmp(&right.event.benefit_id))
    });
    debug!(
        events = timeline.len(),
        skipped = skipped.len(),
        "calendar built"
    );

    Ok(CalendarData {
        reference_date: format_iso_date(&reference),
        through_date: format_iso_date(&through),
        months,
        catalog_path: catalog_path.to_string(),
        events: timeline.into_iter().map(|entry| entry.event).collect(),
        skipped,
    })
}

struct TimelineEntry {
    date: NaiveDate,
    kind: EventKind,
    event: CalendarEvent,
}

fn benefit_event(
    card: &CardEntry,
    benefit: &BenefitEntry,
    kind: EventKind,
    date: NaiveDate,
) -> TimelineEntry {
    let name = if benefit.name.trim().is_empty() {
        benefit.id.as_str()
    } else {
        benefit.name.as_str()
    };
    let verb = if kind == EventKind::Reset {
        "resets"
    } else {
        "expires"
    };
    TimelineEntry {
        date,
        kind,
        event: CalendarEvent {
            date: format_iso_date(&date),
            kind: kind.as_str().to_string(),
            title: format!("{name} {verb}"),
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            benefit_id: Some(benefit.id.clone()),
            value: benefit.cycle_value_limit(),
        },
    }
}

fn anniversary_event(card: &CardEntry, date: NaiveDate) -> TimelineEntry {
    TimelineEntry {
        date,
        kind: EventKind::Anniversary,
        event: CalendarEvent {
            date: format_iso_date(&date),
            kind: EventKind::Anniversary.as_str().to_string(),
            title: "Card anniversary".to_string(),
            card_id: card.id.clone(),
            card_name: card.name.clone(),
            benefit_id: None,
            value: None,
        },
    }
}

/// The card's anniversary on or after `reference`. A renewal date that does
/// not parse is logged and left off the calendar.
fn next_anniversary(card: &CardEntry, reference: NaiveDate) -> Option<NaiveDate> {
    let text = card.renewal_month_day.as_deref()?;
    let placed = text.parse::<CardAnniversary>().and_then(|anniversary| {
        let this_year = anniversary.in_year(reference.year())?;
        if this_year >= reference {
            Ok(this_year)
        } else {
            anniversary.in_year(reference.year() + 1)
        }
    });
    match placed {
        Ok(date) => Some(date),
        Err(error) => {
            warn!(
                card_id = %card.id,
                renewal = %text,
                "leaving anniversary off the calendar: {error}"
            );
            None
        }
    }
}
