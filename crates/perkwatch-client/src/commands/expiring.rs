//! Ranked list of benefits that expire soon and still hold unused value.
//!
//! Every benefit is evaluated against the same reference date. A benefit
//! whose cycle data is broken is reported under `skipped` and left out of the
//! ranking; it never aborts the report.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::ClientResult;
use crate::catalog::{BenefitEntry, CardEntry, Catalog, UsageRecord, load_catalog};
use crate::commands::common::{
    EvaluatedCycle, build_expiry_view, evaluate_benefit, round_cents, skip_benefit,
};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ExpiringData, ExpiringRow, ExpiringSummary};
use crate::cycle::date::format_iso_date;
use crate::cycle::{CycleBounds, ExpiryStatus};

#[derive(Debug, Clone)]
pub struct ExpiringRunOptions {
    pub catalog_path: PathBuf,
    pub reference_date: NaiveDate,
    pub horizon_days: i64,
    pub soon_days: i64,
}

/// Inputs shared by every benefit in one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportParameters {
    pub reference_date: NaiveDate,
    pub horizon_days: i64,
    pub soon_days: i64,
}

pub fn run(options: &ExpiringRunOptions) -> ClientResult<SuccessEnvelope> {
    let catalog = load_catalog(&options.catalog_path)?;
    let parameters = ReportParameters {
        reference_date: options.reference_date,
        horizon_days: options.horizon_days,
        soon_days: options.soon_days,
    };
    let data = build_report(
        &catalog,
        &options.catalog_path.display().to_string(),
        parameters,
    );
    success("expiring", data)
}

pub fn build_report(
    catalog: &Catalog,
    catalog_path: &str,
    parameters: ReportParameters,
) -> ExpiringData {
    let mut summary = ExpiringSummary::default();
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for card in &catalog.cards {
        for slot in &card.benefits {
            if slot.entry().is_ok_and(|benefit| !benefit.active) {
                summary.inactive += 1;
                continue;
            }
            summary.benefits_evaluated += 1;

            let evaluated = slot.entry().and_then(|benefit| {
                evaluate_benefit(card, benefit, parameters.reference_date)
                    .map(|evaluated| (benefit, evaluated))
            });
            let (benefit, evaluated) = match evaluated {
                Ok(pair) => pair,
                Err(error) => {
                    skipped.push(skip_benefit(&card.id, slot.id(), &error));
                    continue;
                }
            };

            if evaluated.result.days_until_expiry > parameters.horizon_days {
                summary.beyond_horizon += 1;
                continue;
            }

            let value_limit = benefit.cycle_value_limit();
            let used_value = used_value_in_cycle(&catalog.usage, &benefit.id, &evaluated.bounds);
            let value_at_risk = value_limit.map(|limit| round_cents((limit - used_value).max(0.0)));
            if value_at_risk.is_some_and(|remaining| remaining <= 0.0) {
                summary.fully_used += 1;
                continue;
            }

            rows.push(build_row(
                card,
                benefit,
                &evaluated,
                parameters.soon_days,
                ValueFigures {
                    value_limit,
                    used_value,
                    value_at_risk,
                },
            ));
        }
    }

    rows.sort_by(|left, right| {
        left.days_until_expiry
            .cmp(&right.days_until_expiry)
            .then_with(|| left.card_id.cmp(&right.card_id))
            .then_with(|| left.benefit_id.cmp(&right.benefit_id))
    });

    summary.listed = rows.len();
    summary.skipped = skipped.len();
    summary.expired = rows
        .iter()
        .filter(|row| row.status == ExpiryStatus::Expired.as_str())
        .count();
    summary.expiring_soon = rows.iter().filter(|row| row.expiring_soon).count();
    summary.total_value_at_risk = round_cents(
        rows.iter()
            .filter_map(|row| row.value_at_risk)
            .sum::<f64>(),
    );

    debug!(
        evaluated = summary.benefits_evaluated,
        listed = summary.listed,
        skipped = summary.skipped,
        "expiring report built"
    );

    ExpiringData {
        reference_date: format_iso_date(&parameters.reference_date),
        catalog_path: catalog_path.to_string(),
        horizon_days: parameters.horizon_days,
        soon_threshold_days: parameters.soon_days,
        rows,
        skipped,
        summary,
    }
}

/// Sum of usage logged for `benefit_id` inside the cycle's inclusive bounds.
/// Usage with an unreadable date is ignored.
pub fn used_value_in_cycle(usage: &[UsageRecord], benefit_id: &str, bounds: &CycleBounds) -> f64 {
    let total = usage
        .iter()
        .filter(|record| record.benefit_id == benefit_id)
        .filter_map(|record| match record.used_on() {
            Some(date) => Some((date, record.amount)),
            None => {
                warn!(
                    benefit_id = %record.benefit_id,
                    date = %record.date,
                    "ignoring usage record with an unreadable date"
                );
                None
            }
        })
        .filter(|(date, _)| bounds.start.is_none_or(|start| *date >= start) && *date <= bounds.end)
        .map(|(_, amount)| amount)
        .sum::<f64>();
    round_cents(total)
}

struct ValueFigures {
    value_limit: Option<f64>,
    used_value: f64,
    value_at_risk: Option<f64>,
}

fn build_row(
    card: &CardEntry,
    benefit: &BenefitEntry,
    evaluated: &EvaluatedCycle,
    soon_days: i64,
    figures: ValueFigures,
) -> ExpiringRow {
    let view = build_expiry_view(&evaluated.result, &evaluated.bounds, soon_days);

    ExpiringRow {
        card_id: card.id.clone(),
        card_name: card.name.clone(),
        benefit_id: benefit.id.clone(),
        benefit_name: benefit.name.clone(),
        cycle_type: evaluated.cycle_type.as_str().to_string(),
        cycle_label: evaluated.cycle_type.label().to_string(),
        current_cycle_start: view.current_cycle_start,
        current_cycle_end: view.current_cycle_end,
        next_reset_date: view.next_reset_date,
        next_expiry_date: view.next_expiry_date,
        days_until_expiry: evaluated.result.days_until_expiry,
        status: view.status,
        expiring_soon: view.expiring_soon,
        value_limit: figures.value_limit,
        used_value: figures.used_value,
        value_at_risk: figures.value_at_risk,
    }
}
