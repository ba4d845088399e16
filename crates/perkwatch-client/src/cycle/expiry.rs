use chrono::{NaiveDate, NaiveDateTime};

use crate::CycleResult;
use crate::cycle::date::{days_between, end_of_day};
use crate::cycle::definition::{CardAnniversary, CycleDefinition, CycleType};
use crate::cycle::resolve::{CycleBounds, resolve_cycle};

/// Default window used by [`is_expiring_soon`] callers.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

/// Fixed threshold of [`classify_expiry`]; independent of the caller's
/// `is_expiring_soon` threshold.
pub const EXPIRING_SOON_CLASS_DAYS: i64 = 30;

/// Expiry facts for one benefit at one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryResult {
    pub next_reset_date: NaiveDate,
    pub next_expiry_date: NaiveDate,
    /// Negative once the expiry date has passed.
    pub days_until_expiry: i64,
    pub current_cycle_end: NaiveDate,
}

impl ExpiryResult {
    pub fn current_cycle_end_at(&self) -> NaiveDateTime {
        end_of_day(self.current_cycle_end)
    }

    pub fn next_expiry_at(&self) -> NaiveDateTime {
        end_of_day(self.next_expiry_date)
    }

    pub fn is_expired(&self) -> bool {
        self.days_until_expiry < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Upcoming,
}

impl ExpiryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring-soon",
            Self::Upcoming => "upcoming",
        }
    }
}

pub fn calculate_next_expiry(
    cycle_type: CycleType,
    definition: &CycleDefinition,
    reference: NaiveDate,
    anniversary: Option<&CardAnniversary>,
) -> CycleResult<ExpiryResult> {
    let bounds = resolve_cycle(cycle_type, definition, reference, anniversary)?;
    Ok(expiry_from_bounds(&bounds, definition, reference))
}

/// Expiry facts for a cycle already resolved at `reference`. An explicit
/// `expiryDate` replaces only the expiry; the cycle end and reset stay.
pub fn expiry_from_bounds(
    bounds: &CycleBounds,
    definition: &CycleDefinition,
    reference: NaiveDate,
) -> ExpiryResult {
    let next_expiry_date = definition.explicit_expiry().unwrap_or(bounds.end);
    ExpiryResult {
        next_reset_date: bounds.next_reset,
        next_expiry_date,
        days_until_expiry: days_between(reference, next_expiry_date),
        current_cycle_end: bounds.end,
    }
}

/// Entry point for stored benefits: parses the cycle type name, the
/// definition JSON and, for cardmember-year cycles only, the `MM-DD`
/// anniversary before resolving.
pub fn calculate_next_expiry_from_raw(
    cycle_type: &str,
    definition_json: &str,
    reference: NaiveDate,
    anniversary: Option<&str>,
) -> CycleResult<ExpiryResult> {
    let parsed = ParsedCycle::parse(cycle_type, definition_json, anniversary)?;
    calculate_next_expiry(
        parsed.cycle_type,
        &parsed.definition,
        reference,
        parsed.anniversary.as_ref(),
    )
}

/// Stringly-typed benefit inputs after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCycle {
    pub cycle_type: CycleType,
    pub definition: CycleDefinition,
    pub anniversary: Option<CardAnniversary>,
}

impl ParsedCycle {
    pub fn parse(
        cycle_type: &str,
        definition_json: &str,
        anniversary: Option<&str>,
    ) -> CycleResult<Self> {
        let cycle_type = cycle_type.parse::<CycleType>()?;
        let definition = CycleDefinition::parse(definition_json)?;
        // Other cycle types ignore the card's renewal string, even a bad one.
        let anniversary = match (cycle_type, anniversary) {
            (CycleType::CardmemberYear, Some(text)) => Some(text.parse::<CardAnniversary>()?),
            _ => None,
        };
        Ok(Self {
            cycle_type,
            definition,
            anniversary,
        })
    }
}

/// `0 <= days_until_expiry <= threshold_days`. Already expired is not soon.
pub fn is_expiring_soon(result: &ExpiryResult, threshold_days: i64) -> bool {
    (0..=threshold_days).contains(&result.days_until_expiry)
}

pub fn classify_expiry(result: &ExpiryResult) -> ExpiryStatus {
    if result.days_until_expiry < 0 {
        ExpiryStatus::Expired
    } else if result.days_until_expiry <= EXPIRING_SOON_CLASS_DAYS {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Upcoming
    }
}
