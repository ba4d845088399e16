use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::cycle::date::{
    clamped_date, max_days_in_month, next_day, parse_iso_date_or_timestamp,
};
use crate::{CycleError, CycleResult};

/// Definition text for a plain single cycle with no deadline.
pub const SINGLE_DEFINITION_JSON: &str = r#"{"type":"single"}"#;

/// How a benefit's usage limit recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CycleType {
    Monthly,
    CalendarYear,
    CardmemberYear,
    SemiannualCalendar,
    OneTime,
    PerTrip,
}

impl CycleType {
    pub const ALL: [Self; 6] = [
        Self::Monthly,
        Self::CalendarYear,
        Self::CardmemberYear,
        Self::SemiannualCalendar,
        Self::OneTime,
        Self::PerTrip,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::CalendarYear => "CALENDAR_YEAR",
            Self::CardmemberYear => "CARDMEMBER_YEAR",
            Self::SemiannualCalendar => "SEMIANNUAL_CALENDAR",
            Self::OneTime => "ONE_TIME",
            Self::PerTrip => "PER_TRIP",
        }
    }

    /// Short suffix shown next to a per-cycle amount, e.g. `$10/month`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "/month",
            Self::CalendarYear | Self::CardmemberYear => "/year",
            Self::SemiannualCalendar => "/6 months",
            Self::OneTime | Self::PerTrip => "",
        }
    }

    /// False for benefits that never reset on their own.
    pub const fn recurs(self) -> bool {
        !matches!(self, Self::OneTime | Self::PerTrip)
    }
}

impl FromStr for CycleType {
    type Err = CycleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| CycleError::UnsupportedCycle(value.to_string()))
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A month/day range that repeats every year. Bounds are inclusive and the
/// range never wraps past Dec 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleWindow {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl CycleWindow {
    pub fn new(start_month: u32, start_day: u32, end_month: u32, end_day: u32) -> CycleResult<Self> {
        let window = Self {
            start_month,
            start_day,
            end_month,
            end_day,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> CycleResult<()> {
        validate_month_day(self.start_month, self.start_day, "window start")?;
        validate_month_day(self.end_month, self.end_day, "window end")?;
        if self.start_key() > self.end_key() {
            return Err(CycleError::configuration(format!(
                "window {self} starts after it ends; windows may not wrap across the year boundary"
            )));
        }
        if self.start_key() == (2, 29) && self.end_key() == (2, 29) {
            return Err(CycleError::configuration(format!(
                "window {self} only exists in leap years"
            )));
        }
        Ok(())
    }

    /// A Feb 29 start opens on Mar 1 in common years, so it never overlaps a
    /// window that ends on Feb 28.
    pub fn start_in(&self, year: i32) -> CycleResult<NaiveDate> {
        let start = clamped_date(year, self.start_month, self.start_day)?;
        if start.day() == self.start_day {
            Ok(start)
        } else {
            next_day(start)
        }
    }

    /// A Feb 29 end closes on Feb 28 in common years.
    pub fn end_in(&self, year: i32) -> CycleResult<NaiveDate> {
        clamped_date(year, self.end_month, self.end_day)
    }

    fn start_key(&self) -> (u32, u32) {
        (self.start_month, self.start_day)
    }

    fn end_key(&self) -> (u32, u32) {
        (self.end_month, self.end_day)
    }
}

impl fmt::Display for CycleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}..{:02}-{:02}",
            self.start_month, self.start_day, self.end_month, self.end_day
        )
    }
}

/// Typed form of a benefit's stored cycle definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleDefinition {
    /// No sub-windows. `expiry_date`, when set, is a hard deadline that
    /// replaces the computed cycle end as the expiry.
    Single { expiry_date: Option<NaiveDate> },
    /// Ordered, non-overlapping recurring windows.
    MultipleWindows { windows: Vec<CycleWindow> },
}

impl CycleDefinition {
    pub const fn single() -> Self {
        Self::Single { expiry_date: None }
    }

    pub const fn single_with_expiry(expiry_date: NaiveDate) -> Self {
        Self::Single {
            expiry_date: Some(expiry_date),
        }
    }

    pub fn multiple_windows(windows: Vec<CycleWindow>) -> CycleResult<Self> {
        validate_windows(&windows)?;
        Ok(Self::MultipleWindows { windows })
    }

    pub fn explicit_expiry(&self) -> Option<NaiveDate> {
        match self {
            Self::Single { expiry_date } => *expiry_date,
            Self::MultipleWindows { .. } => None,
        }
    }

    pub fn windows(&self) -> &[CycleWindow] {
        match self {
            Self::Single { .. } => &[],
            Self::MultipleWindows { windows } => windows,
        }
    }

    /// Parses the JSON text kept by the benefit definition store.
    pub fn parse(json: &str) -> CycleResult<Self> {
        let value = serde_json::from_str::<Value>(json).map_err(|err| {
            CycleError::configuration(format!("cycle definition is not valid JSON: {err}"))
        })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> CycleResult<Self> {
        if !value.is_object() {
            return Err(CycleError::configuration(
                "cycle definition must be a JSON object with a `type` field",
            ));
        }
        let raw = RawCycleDefinition::deserialize(value).map_err(|err| {
            CycleError::configuration(format!("cycle definition has an invalid shape: {err}"))
        })?;

        match raw {
            RawCycleDefinition::Single { expiry_date } => {
                let expiry_date = match expiry_date.as_deref() {
                    Some(text) => Some(parse_iso_date_or_timestamp(text).ok_or_else(|| {
                        CycleError::configuration(format!(
                            "expiryDate `{text}` must be an ISO date (YYYY-MM-DD)"
                        ))
                    })?),
                    None => None,
                };
                Ok(Self::Single { expiry_date })
            }
            RawCycleDefinition::MultipleWindows {
                windows,
                expiry_date,
            } => {
                if expiry_date.is_some() {
                    return Err(CycleError::configuration(
                        "expiryDate is only supported on `single` cycle definitions",
                    ));
                }
                Self::multiple_windows(windows)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawCycleDefinition {
    Single {
        #[serde(default, rename = "expiryDate")]
        expiry_date: Option<String>,
    },
    MultipleWindows {
        windows: Vec<CycleWindow>,
        #[serde(default, rename = "expiryDate")]
        expiry_date: Option<String>,
    },
}

/// Month and day of a card's account anniversary, from the card's
/// `MM-DD` renewal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardAnniversary {
    month: u32,
    day: u32,
}

impl CardAnniversary {
    pub fn new(month: u32, day: u32) -> CycleResult<Self> {
        validate_month_day(month, day, "card anniversary")?;
        Ok(Self { month, day })
    }

    /// The anniversary placed in `year`; Feb 29 falls back to Feb 28.
    pub fn in_year(self, year: i32) -> CycleResult<NaiveDate> {
        clamped_date(year, self.month, self.day)
    }
}

impl FromStr for CardAnniversary {
    type Err = CycleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CycleError::configuration(format!(
                "card anniversary `{value}` must use MM-DD format"
            ))
        };
        let (month_text, day_text) = value.trim().split_once('-').ok_or_else(invalid)?;
        let month = parse_small_number(month_text).ok_or_else(invalid)?;
        let day = parse_small_number(day_text).ok_or_else(invalid)?;
        Self::new(month, day)
    }
}

impl fmt::Display for CardAnniversary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

fn parse_small_number(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok()
}

fn validate_month_day(month: u32, day: u32, what: &str) -> CycleResult<()> {
    if !(1..=12).contains(&month) {
        return Err(CycleError::configuration(format!(
            "{what} month {month} is out of range 1-12"
        )));
    }
    let max_day = max_days_in_month(month);
    if !(1..=max_day).contains(&day) {
        return Err(CycleError::configuration(format!(
            "{what} day {day} is out of range 1-{max_day} for month {month}"
        )));
    }
    Ok(())
}

fn validate_windows(windows: &[CycleWindow]) -> CycleResult<()> {
    for window in windows {
        window.validate()?;
    }
    for pair in windows.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        if later.start_key() <= earlier.end_key() {
            return Err(CycleError::configuration(format!(
                "windows {earlier} and {later} overlap or are out of calendar order"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CardAnniversary, CycleDefinition, CycleType, CycleWindow};
    use crate::CycleError;

    #[test]
    fn cycle_types_round_trip_through_their_names() {
        for cycle_type in CycleType::ALL {
            let parsed = cycle_type.as_str().parse::<CycleType>();
            assert_eq!(parsed, Ok(cycle_type));
        }
    }

    #[test]
    fn unknown_cycle_type_is_unsupported() {
        let parsed = "BOGUS".parse::<CycleType>();
        assert_eq!(parsed, Err(CycleError::UnsupportedCycle("BOGUS".to_string())));
        assert!(matches!(
            "monthly".parse::<CycleType>(),
            Err(CycleError::UnsupportedCycle(_))
        ));
    }

    #[test]
    fn parses_single_definition_with_and_without_deadline() {
        let plain = CycleDefinition::parse(r#"{"type":"single"}"#);
        assert_eq!(plain, Ok(CycleDefinition::single()));

        let deadline = CycleDefinition::parse(r#"{"type":"single","expiryDate":"2026-06-30"}"#);
        assert!(deadline.is_ok());
        if let Ok(definition) = deadline {
            assert_eq!(
                definition.explicit_expiry().map(|date| date.to_string()),
                Some("2026-06-30".to_string())
            );
        }

        let null_deadline = CycleDefinition::parse(r#"{"type":"single","expiryDate":null}"#);
        assert_eq!(null_deadline, Ok(CycleDefinition::single()));
    }

    #[test]
    fn parses_semiannual_windows() {
        let parsed = CycleDefinition::parse(
            r#"{"type":"multiple_windows","windows":[
                {"startMonth":1,"startDay":1,"endMonth":6,"endDay":30},
                {"startMonth":7,"startDay":1,"endMonth":12,"endDay":31}
            ]}"#,
        );
        assert!(parsed.is_ok());
        if let Ok(definition) = parsed {
            assert_eq!(definition.windows().len(), 2);
            assert_eq!(definition.explicit_expiry(), None);
        }
    }

    #[test]
    fn rejects_malformed_definitions_as_configuration_errors() {
        let cases = [
            "not json",
            "[]",
            r#"{"windows":[]}"#,
            r#"{"type":"rolling"}"#,
            r#"{"type":"multiple_windows"}"#,
            r#"{"type":"single","expiryDate":"next summer"}"#,
            r#"{"type":"multiple_windows","windows":[],"expiryDate":"2026-06-30"}"#,
            r#"{"type":"multiple_windows","windows":[{"startMonth":13,"startDay":1,"endMonth":12,"endDay":31}]}"#,
            r#"{"type":"multiple_windows","windows":[{"startMonth":4,"startDay":31,"endMonth":5,"endDay":1}]}"#,
            r#"{"type":"multiple_windows","windows":[{"startMonth":-1,"startDay":1,"endMonth":5,"endDay":1}]}"#,
        ];
        for case in cases {
            let parsed = CycleDefinition::parse(case);
            assert!(
                matches!(parsed, Err(CycleError::Configuration(_))),
                "expected configuration error for {case}"
            );
        }
    }

    #[test]
    fn rejects_wrapping_and_overlapping_windows() {
        assert!(CycleWindow::new(11, 1, 2, 28).is_err());
        assert!(CycleWindow::new(2, 29, 2, 29).is_err());

        let first = CycleWindow::new(1, 1, 6, 30);
        let overlapping = CycleWindow::new(6, 30, 12, 31);
        let out_of_order = CycleWindow::new(1, 1, 3, 31);
        assert!(first.is_ok() && overlapping.is_ok() && out_of_order.is_ok());
        if let (Ok(first), Ok(overlapping), Ok(out_of_order)) = (first, overlapping, out_of_order)
        {
            assert!(CycleDefinition::multiple_windows(vec![first, overlapping]).is_err());
            assert!(CycleDefinition::multiple_windows(vec![first, out_of_order]).is_err());
        }
    }

    #[test]
    fn leap_day_window_start_opens_on_march_first_in_common_years() {
        let window = CycleWindow::new(2, 29, 12, 31);
        assert!(window.is_ok());
        if let Ok(window) = window {
            assert_eq!(
                window.start_in(2025).map(|date| date.to_string()),
                Ok("2025-03-01".to_string())
            );
            assert_eq!(
                window.start_in(2024).map(|date| date.to_string()),
                Ok("2024-02-29".to_string())
            );
        }

        let ends_on_leap_day = CycleWindow::new(1, 1, 2, 29);
        assert!(ends_on_leap_day.is_ok());
        if let Ok(window) = ends_on_leap_day {
            assert_eq!(
                window.end_in(2025).map(|date| date.to_string()),
                Ok("2025-02-28".to_string())
            );
        }
    }

    #[test]
    fn empty_window_list_parses_but_carries_no_windows() {
        let parsed = CycleDefinition::parse(r#"{"type":"multiple_windows","windows":[]}"#);
        assert!(parsed.is_ok());
        if let Ok(definition) = parsed {
            assert!(definition.windows().is_empty());
        }
    }

    #[test]
    fn anniversary_parsing_accepts_padded_and_unpadded_parts() {
        assert_eq!(
            "03-01".parse::<CardAnniversary>().map(|value| value.to_string()),
            Ok("03-01".to_string())
        );
        assert_eq!(
            "3-1".parse::<CardAnniversary>().map(|value| value.to_string()),
            Ok("03-01".to_string())
        );
        assert!("02-29".parse::<CardAnniversary>().is_ok());

        for bad in ["", "0301", "13-01", "02-30", "00-10", "03-", "aa-bb", "003-01"] {
            assert!(
                matches!(bad.parse::<CardAnniversary>(), Err(CycleError::Configuration(_))),
                "expected configuration error for {bad:?}"
            );
        }
    }
}
