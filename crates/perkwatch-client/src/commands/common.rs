use chrono::NaiveDate;
use tracing::warn;

use crate::catalog::{BenefitEntry, CardEntry};
use crate::contracts::types::SkippedBenefit;
use crate::cycle::date::format_iso_date;
use crate::cycle::{
    CycleBounds, CycleType, ExpiryResult, ParsedCycle, classify_expiry, expiry_from_bounds,
    is_expiring_soon, resolve_cycle,
};
use crate::{CycleError, CycleResult};

/// One benefit resolved at a reference date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EvaluatedCycle {
    pub(crate) cycle_type: CycleType,
    pub(crate) bounds: CycleBounds,
    pub(crate) result: ExpiryResult,
    /// The definition carries its own `expiryDate`.
    pub(crate) override_applied: bool,
}

/// Parses the stored cycle fields and resolves the cycle once.
pub(crate) fn evaluate_cycle(
    cycle_type: &str,
    definition_json: &str,
    anniversary: Option<&str>,
    reference: NaiveDate,
) -> CycleResult<EvaluatedCycle> {
    let parsed = ParsedCycle::parse(cycle_type.trim(), definition_json, anniversary)?;
    let bounds = resolve_cycle(
        parsed.cycle_type,
        &parsed.definition,
        reference,
        parsed.anniversary.as_ref(),
    )?;
    Ok(EvaluatedCycle {
        cycle_type: parsed.cycle_type,
        bounds,
        result: expiry_from_bounds(&bounds, &parsed.definition, reference),
        override_applied: parsed.definition.explicit_expiry().is_some(),
    })
}

/// Resolves a catalog benefit against its card's anniversary.
pub(crate) fn evaluate_benefit(
    card: &CardEntry,
    benefit: &BenefitEntry,
    reference: NaiveDate,
) -> CycleResult<EvaluatedCycle> {
    evaluate_cycle(
        &benefit.cycle_type,
        &benefit.definition_json(),
        card.renewal_month_day.as_deref(),
        reference,
    )
}

/// Logs a benefit that cannot be evaluated and records it for the report.
pub(crate) fn skip_benefit(card_id: &str, benefit_id: &str, error: &CycleError) -> SkippedBenefit {
    warn!(
        card_id = %card_id,
        benefit_id = %benefit_id,
        code = error.code(),
        "skipping benefit: {error}"
    );
    SkippedBenefit {
        card_id: card_id.to_string(),
        benefit_id: benefit_id.to_string(),
        code: error.code().to_string(),
        message: error.to_string(),
    }
}

/// Display-ready strings shared by the single lookup and the report rows.
#[derive(Debug, Clone)]
pub(crate) struct ExpiryView {
    pub(crate) current_cycle_start: Option<String>,
    pub(crate) current_cycle_end: String,
    pub(crate) next_reset_date: String,
    pub(crate) next_expiry_date: String,
    pub(crate) status: String,
    pub(crate) expiring_soon: bool,
}

pub(crate) fn build_expiry_view(
    result: &ExpiryResult,
    bounds: &CycleBounds,
    soon_days: i64,
) -> ExpiryView {
    ExpiryView {
        current_cycle_start: bounds.start.as_ref().map(format_iso_date),
        current_cycle_end: format_iso_date(&result.current_cycle_end),
        next_reset_date: format_iso_date(&result.next_reset_date),
        next_expiry_date: format_iso_date(&result.next_expiry_date),
        status: classify_expiry(result).as_str().to_string(),
        expiring_soon: is_expiring_soon(result, soon_days),
    }
}

/// Rounds money to cents so report totals do not drift.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
