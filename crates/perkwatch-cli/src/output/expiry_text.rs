use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_expiry(data: &Value) -> io::Result<String> {
    let reference_date = required_str(data, "reference_date", "expiry")?;
    let cycle_type = required_str(data, "cycle_type", "expiry")?;
    let days = data
        .get("days_until_expiry")
        .and_then(Value::as_i64)
        .ok_or_else(|| io::Error::other("expiry output requires days_until_expiry"))?;
    let recurs = data.get("recurs").and_then(Value::as_bool).unwrap_or(true);
    let override_applied = data
        .get("override_applied")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let current_cycle = match data.get("current_cycle_start").and_then(Value::as_str) {
        Some(start) => format!("{start} to {}", text(data, "current_cycle_end")),
        None if recurs => format!("until {}", text(data, "current_cycle_end")),
        None => "no recurring cycle".to_string(),
    };
    let expires = if !recurs && !override_applied {
        "never".to_string()
    } else {
        format!(
            "{} ({})",
            text(data, "next_expiry_date"),
            describe_days(days)
        )
    };
    let next_reset = if recurs {
        text(data, "next_reset_date")
    } else {
        "does not reset".to_string()
    };

    let mut entries = vec![
        ("Status:", text(data, "status")),
        ("Current cycle:", current_cycle),
        ("Expires:", expires),
        ("Next reset:", next_reset),
    ];
    if override_applied {
        entries.push(("Deadline:", "set by expiryDate".to_string()));
    }

    let mut lines = vec![
        format!("{cycle_type} benefit as of {reference_date}"),
        String::new(),
    ];
    lines.extend(format::key_value_rows(&entries, 2));
    if data.get("expiring_soon").and_then(Value::as_bool) == Some(true) {
        lines.push(String::new());
        lines.push(format!(
            "Use it soon: this benefit expires within {} days.",
            text(data, "soon_threshold_days")
        ));
    }

    Ok(lines.join("\n"))
}

pub fn render_expiring(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("expiring output requires rows"))?;
    let reference_date = required_str(data, "reference_date", "expiring")?;
    let horizon = text(data, "horizon_days");

    let mut lines = Vec::new();
    if rows.is_empty() {
        lines.push(format!(
            "No benefits with unused value expire within {horizon} days (as of {reference_date})."
        ));
    } else {
        lines.push(format!(
            "{} expiring within {horizon} days (as of {reference_date})",
            pluralize(rows.len(), "benefit")
        ));
        lines.push(String::new());
        lines.push("Benefits:".to_string());

        let columns = [
            Column::left("Card"),
            Column::left("Benefit"),
            Column::left("Expires"),
            Column::right("Days"),
            Column::left("Status"),
            Column::right("At Risk"),
        ];
        let table_rows = rows
            .iter()
            .map(|row| {
                vec![
                    display_name(row, "card_name", "card_id"),
                    display_name(row, "benefit_name", "benefit_id"),
                    text(row, "next_expiry_date"),
                    text(row, "days_until_expiry"),
                    text(row, "status"),
                    row.get("value_at_risk")
                        .and_then(Value::as_f64)
                        .map(format_usd)
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &columns,
            &table_rows,
            format::terminal_width(),
            "Benefit",
        ));
    }

    lines.extend(skipped_lines(data));

    if let Some(summary) = data.get("summary") {
        let total_at_risk = summary
            .get("total_value_at_risk")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.extend(format::key_value_rows(
            &[
                ("Value at risk:", format_usd(total_at_risk)),
                ("Expiring soon:", text(summary, "expiring_soon")),
                ("Expired:", text(summary, "expired")),
                ("Fully used:", text(summary, "fully_used")),
                ("Beyond horizon:", text(summary, "beyond_horizon")),
                ("Inactive:", text(summary, "inactive")),
                ("Catalog:", text(data, "catalog_path")),
            ],
            2,
        ));
    }

    Ok(lines.join("\n"))
}

pub fn render_calendar(data: &Value) -> io::Result<String> {
    let events = data
        .get("events")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("calendar output requires events"))?;
    let reference_date = required_str(data, "reference_date", "calendar")?;
    let through_date = required_str(data, "through_date", "calendar")?;

    let mut lines = Vec::new();
    if events.is_empty() {
        lines.push(format!(
            "No expiries, resets or anniversaries through {through_date} (as of {reference_date})."
        ));
    } else {
        lines.push(format!(
            "{} through {through_date} (as of {reference_date})",
            pluralize(events.len(), "event")
        ));
        lines.push(String::new());

        let columns = [
            Column::left("Date"),
            Column::left("Event"),
            Column::left("Card"),
            Column::right("Value"),
        ];
        let table_rows = events
            .iter()
            .map(|event| {
                vec![
                    text(event, "date"),
                    text(event, "title"),
                    display_name(event, "card_name", "card_id"),
                    event
                        .get("value")
                        .and_then(Value::as_f64)
                        .map(format_usd)
                        .unwrap_or_default(),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table_or_blocks(
            &columns,
            &table_rows,
            format::terminal_width(),
            "Event",
        ));
    }

    lines.extend(skipped_lines(data));
    lines.push(String::new());
    lines.push(format!("Catalog: {}", text(data, "catalog_path")));

    Ok(lines.join("\n"))
}

fn skipped_lines(data: &Value) -> Vec<String> {
    let Some(skipped) = data.get("skipped").and_then(Value::as_array) else {
        return Vec::new();
    };
    if skipped.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        String::new(),
        "Skipped (fix these benefits in the catalog):".to_string(),
    ];
    for entry in skipped {
        lines.push(format!(
            "  {} on {}: {}",
            text(entry, "benefit_id"),
            text(entry, "card_id"),
            text(entry, "message")
        ));
    }
    lines
}

fn required_str<'a>(data: &'a Value, key: &str, command: &str) -> io::Result<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other(format!("{command} output requires {key}")))
}

fn text(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

fn display_name(row: &Value, name_key: &str, id_key: &str) -> String {
    row.get(name_key)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| text(row, id_key))
}

fn describe_days(days: i64) -> String {
    match days {
        0 => "expires today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "expired 1 day ago".to_string(),
        value if value < 0 => format!("expired {} days ago", -value),
        value => format!("{value} days left"),
    }
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn format_usd(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{describe_days, render_calendar, render_expiring, render_expiry};

    #[test]
    fn expiry_text_lists_cycle_and_countdown() {
        let data = json!({
            "reference_date": "2025-01-15",
            "cycle_type": "CARDMEMBER_YEAR",
            "cycle_label": "/year",
            "current_cycle_start": "2024-03-02",
            "current_cycle_end": "2025-03-01",
            "next_reset_date": "2025-03-02",
            "next_expiry_date": "2025-03-01",
            "days_until_expiry": 45,
            "status": "upcoming",
            "expiring_soon": false,
            "soon_threshold_days": 30,
            "override_applied": false,
            "recurs": true
        });

        let rendered = render_expiry(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("CARDMEMBER_YEAR benefit as of 2025-01-15"));
            assert!(text.contains("Current cycle:  2024-03-02 to 2025-03-01"));
            assert!(text.contains("Expires:        2025-03-01 (45 days left)"));
            assert!(text.contains("Next reset:     2025-03-02"));
            assert!(!text.contains("Use it soon"));
        }
    }

    #[test]
    fn one_time_without_deadline_never_expires() {
        let data = json!({
            "reference_date": "2025-01-15",
            "cycle_type": "ONE_TIME",
            "current_cycle_start": null,
            "current_cycle_end": "2099-12-31",
            "next_reset_date": "2099-12-31",
            "next_expiry_date": "2099-12-31",
            "days_until_expiry": 27378,
            "status": "upcoming",
            "expiring_soon": false,
            "soon_threshold_days": 30,
            "override_applied": false,
            "recurs": false
        });

        let rendered = render_expiry(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("Current cycle:  no recurring cycle"));
            assert!(text.contains("Expires:        never"));
            assert!(text.contains("Next reset:     does not reset"));
        }
    }

    #[test]
    fn expiring_text_renders_rows_skips_and_summary() {
        let data = json!({
            "reference_date": "2025-09-10",
            "catalog_path": "/tmp/catalog.json",
            "horizon_days": 60,
            "soon_threshold_days": 30,
            "rows": [{
                "card_id": "csr",
                "card_name": "Sapphire Reserve",
                "benefit_id": "csr-travel",
                "benefit_name": "Travel Credit",
                "next_expiry_date": "2025-09-15",
                "days_until_expiry": 5,
                "status": "expiring-soon",
                "value_at_risk": 180.0
            }],
            "skipped": [{
                "card_id": "gold",
                "benefit_id": "gold-broken",
                "code": "configuration_error",
                "message": "configuration error: cycle definition is not valid JSON"
            }],
            "summary": {
                "expiring_soon": 1,
                "expired": 0,
                "fully_used": 2,
                "beyond_horizon": 3,
                "inactive": 0,
                "total_value_at_risk": 180.0
            }
        });

        let rendered = render_expiring(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("1 benefit expiring within 60 days (as of 2025-09-10)"));
            assert!(text.contains("Sapphire Reserve"));
            assert!(text.contains("$180.00"));
            assert!(text.contains("  gold-broken on gold: configuration error"));
            assert!(text.contains("Value at risk:   $180.00"));
            assert!(text.contains("Catalog:         /tmp/catalog.json"));
        }
    }

    #[test]
    fn empty_report_says_nothing_is_expiring() {
        let data = json!({
            "reference_date": "2025-09-10",
            "catalog_path": "catalog.json",
            "horizon_days": 14,
            "rows": [],
            "skipped": []
        });

        let rendered = render_expiring(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert_eq!(
                text,
                "No benefits with unused value expire within 14 days (as of 2025-09-10)."
            );
        }
    }

    #[test]
    fn calendar_text_lists_events_in_a_table() {
        let data = json!({
            "reference_date": "2025-09-10",
            "through_date": "2025-12-10",
            "months": 3,
            "catalog_path": "/tmp/catalog.json",
            "events": [
                {
                    "date": "2025-09-15",
                    "kind": "expiring",
                    "title": "Travel Credit expires",
                    "card_id": "csr",
                    "card_name": "Sapphire Reserve",
                    "benefit_id": "csr-travel",
                    "value": 300.0
                },
                {
                    "date": "2025-09-15",
                    "kind": "anniversary",
                    "title": "Card anniversary",
                    "card_id": "csr",
                    "card_name": "Sapphire Reserve",
                    "benefit_id": null,
                    "value": null
                }
            ],
            "skipped": []
        });

        let rendered = render_calendar(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("2 events through 2025-12-10 (as of 2025-09-10)"));
            assert!(text.contains("  Date        Event"));
            assert!(text.contains("2025-09-15  Travel Credit expires"));
            assert!(text.contains("$300.00"));
            assert!(text.contains("Card anniversary"));
            assert!(!text.contains("Skipped"));
            assert!(text.ends_with("Catalog: /tmp/catalog.json"));
        }
    }

    #[test]
    fn empty_calendar_says_so() {
        let data = json!({
            "reference_date": "2025-09-10",
            "through_date": "2025-10-10",
            "catalog_path": "catalog.json",
            "events": [],
            "skipped": []
        });

        let rendered = render_calendar(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with(
                "No expiries, resets or anniversaries through 2025-10-10 (as of 2025-09-10)."
            ));
        }
    }

    #[test]
    fn day_counts_read_naturally() {
        assert_eq!(describe_days(0), "expires today");
        assert_eq!(describe_days(1), "1 day left");
        assert_eq!(describe_days(-3), "expired 3 days ago");
    }
}
