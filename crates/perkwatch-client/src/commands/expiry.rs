use chrono::NaiveDate;

use crate::ClientResult;
use crate::commands::common::{build_expiry_view, evaluate_cycle};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ExpiryData;
use crate::cycle::date::format_iso_date;
use crate::cycle::definition::SINGLE_DEFINITION_JSON;

#[derive(Debug, Clone)]
pub struct ExpiryRunOptions {
    pub cycle_type: String,
    /// Definition JSON; a plain single cycle when absent.
    pub definition: Option<String>,
    pub anniversary: Option<String>,
    pub reference_date: NaiveDate,
    pub soon_days: i64,
}

pub fn run(options: &ExpiryRunOptions) -> ClientResult<SuccessEnvelope> {
    let data = evaluate(options)?;
    success("expiry", data)
}

pub fn evaluate(options: &ExpiryRunOptions) -> ClientResult<ExpiryData> {
    let definition_json = options
        .definition
        .as_deref()
        .unwrap_or(SINGLE_DEFINITION_JSON);
    let reference = options.reference_date;
    let evaluated = evaluate_cycle(
        &options.cycle_type,
        definition_json,
        options.anniversary.as_deref(),
        reference,
    )?;
    let view = build_expiry_view(&evaluated.result, &evaluated.bounds, options.soon_days);

    Ok(ExpiryData {
        reference_date: format_iso_date(&reference),
        cycle_type: evaluated.cycle_type.as_str().to_string(),
        cycle_label: evaluated.cycle_type.label().to_string(),
        current_cycle_start: view.current_cycle_start,
        current_cycle_end: view.current_cycle_end,
        next_reset_date: view.next_reset_date,
        next_expiry_date: view.next_expiry_date,
        days_until_expiry: evaluated.result.days_until_expiry,
        status: view.status,
        expiring_soon: view.expiring_soon,
        soon_threshold_days: options.soon_days,
        override_applied: evaluated.override_applied,
        recurs: evaluated.cycle_type.recurs(),
    })
}
