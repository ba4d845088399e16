//! Benefit catalog documents: cards, the benefits they carry, and the usage
//! logged against those benefits.
//!
//! Cycle fields are kept as the raw strings the store provides and are only
//! parsed when a benefit is evaluated. Each benefit is decoded on its own: an
//! entry with mistyped or missing fields is kept as [`CatalogBenefit::Malformed`]
//! and the rest of the catalog still loads. Usage records that cannot be
//! decoded are dropped with a warning.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::cycle::date::parse_iso_date_or_timestamp;
use crate::cycle::definition::SINGLE_DEFINITION_JSON;
use crate::{ClientError, ClientResult, CycleError, CycleResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub cards: Vec<CardEntry>,
    #[serde(default, deserialize_with = "decode_usage")]
    pub usage: Vec<UsageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `MM-DD` account anniversary, only needed by cardmember-year benefits.
    #[serde(default)]
    pub renewal_month_day: Option<String>,
    #[serde(default, deserialize_with = "decode_benefits")]
    pub benefits: Vec<CatalogBenefit>,
}

/// One entry of a card's `benefits` array.
#[derive(Debug, Clone)]
pub enum CatalogBenefit {
    Valid(BenefitEntry),
    /// The entry is not a benefit object. `id` falls back to the entry's
    /// position (`#1`, `#2`, ...) when it has no string id.
    Malformed { id: String, error: CycleError },
}

impl CatalogBenefit {
    fn decode(position: usize, value: Value) -> Self {
        match BenefitEntry::deserialize(&value) {
            Ok(entry) => Self::Valid(entry),
            Err(error) => Self::Malformed {
                id: value
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", position + 1)),
                error: CycleError::configuration(format!("benefit entry is malformed: {error}")),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Valid(entry) => &entry.id,
            Self::Malformed { id, .. } => id,
        }
    }

    pub fn entry(&self) -> CycleResult<&BenefitEntry> {
        match self {
            Self::Valid(entry) => Ok(entry),
            Self::Malformed { error, .. } => Err(error.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cycle_type: String,
    /// Either an embedded JSON object or the JSON text itself.
    #[serde(default)]
    pub cycle_definition: Option<Value>,
    #[serde(default)]
    pub nominal_value: Option<f64>,
    #[serde(default)]
    pub usage_limit_per_cycle: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl BenefitEntry {
    /// Definition JSON text as the cycle engine expects it. A missing
    /// definition means a plain single cycle.
    pub fn definition_json(&self) -> String {
        match &self.cycle_definition {
            None | Some(Value::Null) => SINGLE_DEFINITION_JSON.to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Cash value the benefit grants per cycle, when it is tracked in USD.
    pub fn cycle_value_limit(&self) -> Option<f64> {
        if !self.currency.eq_ignore_ascii_case("USD") {
            return None;
        }
        self.usage_limit_per_cycle
            .or(self.nominal_value)
            .filter(|limit| *limit > 0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub benefit_id: String,
    pub date: String,
    #[serde(default)]
    pub amount: f64,
}

impl UsageRecord {
    pub fn used_on(&self) -> Option<NaiveDate> {
        parse_iso_date_or_timestamp(&self.date)
    }
}

pub fn load_catalog(path: &Path) -> ClientResult<Catalog> {
    let content = fs::read_to_string(path)
        .map_err(|error| ClientError::catalog_unreadable(path, &error.to_string()))?;
    parse_catalog(&content, path)
}

pub fn parse_catalog(content: &str, source: &Path) -> ClientResult<Catalog> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::catalog_invalid(source, "the file is empty"));
    }
    if !trimmed.starts_with('{') {
        return Err(ClientError::catalog_invalid(
            source,
            "the top level must be a JSON object",
        ));
    }
    serde_json::from_str::<Catalog>(content)
        .map_err(|error| ClientError::catalog_invalid(source, &error.to_string()))
}

fn decode_benefits<'de, D>(deserializer: D) -> Result<Vec<CatalogBenefit>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(position, value)| CatalogBenefit::decode(position, value))
        .collect())
}

fn decode_usage<'de, D>(deserializer: D) -> Result<Vec<UsageRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match UsageRecord::deserialize(&value) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(position, "ignoring malformed usage record: {error}");
                None
            }
        })
        .collect())
}

fn default_currency() -> String {
    "USD".to_string()
}

const fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{BenefitEntry, CatalogBenefit, parse_catalog};

    fn valid(benefit: &CatalogBenefit) -> Option<&BenefitEntry> {
        benefit.entry().ok()
    }

    #[test]
    fn accepts_embedded_and_stringified_definitions() {
        let parsed = parse_catalog(
            r#"{
                "cards": [{
                    "id": "csr",
                    "name": "Sapphire Reserve",
                    "renewalMonthDay": "03-01",
                    "benefits": [
                        {"id": "dining", "cycleType": "SEMIANNUAL_CALENDAR",
                         "cycleDefinition": {"type": "multiple_windows", "windows": []}},
                        {"id": "travel", "cycleType": "CARDMEMBER_YEAR",
                         "cycleDefinition": "{\"type\":\"single\"}", "usageLimitPerCycle": 300},
                        {"id": "lounge", "cycleType": "ONE_TIME"}
                    ]
                }]
            }"#,
            Path::new("catalog.json"),
        );
        assert!(parsed.is_ok());
        if let Ok(catalog) = parsed {
            let benefits = catalog.cards[0]
                .benefits
                .iter()
                .filter_map(valid)
                .collect::<Vec<&BenefitEntry>>();
            assert_eq!(benefits.len(), 3);
            assert_eq!(
                benefits[0].definition_json(),
                r#"{"type":"multiple_windows","windows":[]}"#
            );
            assert_eq!(benefits[1].definition_json(), r#"{"type":"single"}"#);
            assert_eq!(benefits[1].cycle_value_limit(), Some(300.0));
            assert_eq!(benefits[2].definition_json(), r#"{"type":"single"}"#);
            assert!(benefits[2].active);
            assert!(catalog.usage.is_empty());
        }
    }

    #[test]
    fn value_limit_requires_usd() {
        let parsed = parse_catalog(
            r#"{"cards": [{"id": "c", "benefits": [
                {"id": "points", "cycleType": "MONTHLY", "nominalValue": 5000, "currency": "POINTS"},
                {"id": "cash", "cycleType": "MONTHLY", "nominalValue": 15}
            ]}]}"#,
            Path::new("catalog.json"),
        );
        assert!(parsed.is_ok());
        if let Ok(catalog) = parsed {
            let limits = catalog.cards[0]
                .benefits
                .iter()
                .filter_map(valid)
                .map(BenefitEntry::cycle_value_limit)
                .collect::<Vec<Option<f64>>>();
            assert_eq!(limits, vec![None, Some(15.0)]);
        }
    }

    #[test]
    fn mistyped_benefits_are_kept_apart_from_the_good_ones() {
        let parsed = parse_catalog(
            r#"{"cards": [{"id": "c", "benefits": [
                {"id": "good", "cycleType": "MONTHLY", "usageLimitPerCycle": 15},
                {"id": "numeric-type", "cycleType": 7},
                {"id": "no-type", "name": "No Type"},
                {"id": "string-limit", "cycleType": "MONTHLY", "usageLimitPerCycle": "15"},
                "not an object"
            ]}],
            "usage": [
                {"benefitId": "good", "date": "2025-06-01", "amount": 5},
                {"benefitId": "good", "amount": "lots"}
            ]}"#,
            Path::new("catalog.json"),
        );
        assert!(parsed.is_ok());
        if let Ok(catalog) = parsed {
            let benefits = &catalog.cards[0].benefits;
            assert_eq!(benefits.len(), 5);
            assert!(matches!(&benefits[0], CatalogBenefit::Valid(entry) if entry.id == "good"));

            let malformed = benefits[1..]
                .iter()
                .map(|benefit| (benefit.id(), benefit.entry().err().map(|error| error.code())))
                .collect::<Vec<(&str, Option<&str>)>>();
            assert_eq!(
                malformed,
                vec![
                    ("numeric-type", Some("configuration_error")),
                    ("no-type", Some("configuration_error")),
                    ("string-limit", Some("configuration_error")),
                    ("#5", Some("configuration_error")),
                ]
            );
            assert_eq!(catalog.usage.len(), 1);
        }
    }

    #[test]
    fn rejects_documents_that_are_not_catalogs() {
        for content in ["", "[]", "{\"cards\": {}}", "{not json"] {
            let parsed = parse_catalog(content, Path::new("catalog.json"));
            assert!(parsed.is_err());
            if let Err(error) = parsed {
                assert_eq!(error.code, "catalog_invalid");
            }
        }
    }
}
