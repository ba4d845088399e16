use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ExpiryData {
    pub reference_date: String,
    pub cycle_type: String,
    pub cycle_label: String,
    pub current_cycle_start: Option<String>,
    pub current_cycle_end: String,
    pub next_reset_date: String,
    pub next_expiry_date: String,
    pub days_until_expiry: i64,
    pub status: String,
    pub expiring_soon: bool,
    pub soon_threshold_days: i64,
    pub override_applied: bool,
    pub recurs: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiringData {
    pub reference_date: String,
    pub catalog_path: String,
    pub horizon_days: i64,
    pub soon_threshold_days: i64,
    pub rows: Vec<ExpiringRow>,
    pub skipped: Vec<SkippedBenefit>,
    pub summary: ExpiringSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiringRow {
    pub card_id: String,
    pub card_name: String,
    pub benefit_id: String,
    pub benefit_name: String,
    pub cycle_type: String,
    pub cycle_label: String,
    pub current_cycle_start: Option<String>,
    pub current_cycle_end: String,
    pub next_reset_date: String,
    pub next_expiry_date: String,
    pub days_until_expiry: i64,
    pub status: String,
    pub expiring_soon: bool,
    pub value_limit: Option<f64>,
    pub used_value: f64,
    pub value_at_risk: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedBenefit {
    pub card_id: String,
    pub benefit_id: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpiringSummary {
    pub benefits_evaluated: usize,
    pub listed: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    pub fully_used: usize,
    pub beyond_horizon: usize,
    pub inactive: usize,
    pub skipped: usize,
    pub total_value_at_risk: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarData {
    pub reference_date: String,
    pub through_date: String,
    pub months: u32,
    pub catalog_path: String,
    pub events: Vec<CalendarEvent>,
    pub skipped: Vec<SkippedBenefit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub date: String,
    /// `expiring`, `reset` or `anniversary`.
    pub kind: String,
    pub title: String,
    pub card_id: String,
    pub card_name: String,
    pub benefit_id: Option<String>,
    pub value: Option<f64>,
}
