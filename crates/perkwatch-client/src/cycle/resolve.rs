use chrono::{Datelike, NaiveDate};

use crate::cycle::date::{
    clamped_date, first_day_of_month, last_day_of_month, never_expires, next_day,
};
use crate::cycle::definition::{CardAnniversary, CycleDefinition, CycleType, CycleWindow};
use crate::{CycleError, CycleResult};

/// Boundaries of the cycle that contains (or, for a semiannual gap, follows)
/// the reference date. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    /// First day of the cycle; `None` when the benefit has no cycle start.
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub next_reset: NaiveDate,
}

pub fn resolve_current_cycle_end(
    cycle_type: CycleType,
    definition: &CycleDefinition,
    reference: NaiveDate,
    anniversary: Option<&CardAnniversary>,
) -> CycleResult<NaiveDate> {
    resolve_cycle(cycle_type, definition, reference, anniversary).map(|bounds| bounds.end)
}

pub fn resolve_next_reset_date(
    cycle_type: CycleType,
    definition: &CycleDefinition,
    reference: NaiveDate,
    anniversary: Option<&CardAnniversary>,
) -> CycleResult<NaiveDate> {
    resolve_cycle(cycle_type, definition, reference, anniversary).map(|bounds| bounds.next_reset)
}

pub fn resolve_current_cycle_start(
    cycle_type: CycleType,
    definition: &CycleDefinition,
    reference: NaiveDate,
    anniversary: Option<&CardAnniversary>,
) -> CycleResult<Option<NaiveDate>> {
    resolve_cycle(cycle_type, definition, reference, anniversary).map(|bounds| bounds.start)
}

pub fn resolve_cycle(
    cycle_type: CycleType,
    definition: &CycleDefinition,
    reference: NaiveDate,
    anniversary: Option<&CardAnniversary>,
) -> CycleResult<CycleBounds> {
    match cycle_type {
        CycleType::Monthly => {
            let end = last_day_of_month(reference)?;
            Ok(CycleBounds {
                start: Some(first_day_of_month(reference)?),
                end,
                next_reset: next_day(end)?,
            })
        }
        CycleType::CalendarYear => {
            let year = reference.year();
            let end = clamped_date(year, 12, 31)?;
            Ok(CycleBounds {
                start: Some(clamped_date(year, 1, 1)?),
                end,
                next_reset: next_day(end)?,
            })
        }
        CycleType::CardmemberYear => {
            let anniversary = anniversary.ok_or_else(|| {
                CycleError::configuration(
                    "a card anniversary (MM-DD) is required for CARDMEMBER_YEAR cycles",
                )
            })?;
            cardmember_year_bounds(*anniversary, reference)
        }
        CycleType::SemiannualCalendar => semiannual_bounds(definition, reference),
        CycleType::OneTime | CycleType::PerTrip => Ok(CycleBounds {
            start: None,
            end: never_expires(),
            next_reset: never_expires(),
        }),
    }
}

// A reference date equal to the anniversary still belongs to the ending
// cycle; the new cycle starts the next day.
fn cardmember_year_bounds(
    anniversary: CardAnniversary,
    reference: NaiveDate,
) -> CycleResult<CycleBounds> {
    let year = reference.year();
    let this_year = anniversary.in_year(year)?;
    let (previous, end) = if this_year >= reference {
        (anniversary.in_year(year - 1)?, this_year)
    } else {
        (this_year, anniversary.in_year(year + 1)?)
    };

    Ok(CycleBounds {
        start: Some(next_day(previous)?),
        end,
        next_reset: next_day(end)?,
    })
}

#[derive(Debug, Clone, Copy)]
struct PlacedWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl PlacedWindow {
    fn place(window: &CycleWindow, year: i32) -> CycleResult<Self> {
        Ok(Self {
            start: window.start_in(year)?,
            end: window.end_in(year)?,
        })
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn semiannual_bounds(
    definition: &CycleDefinition,
    reference: NaiveDate,
) -> CycleResult<CycleBounds> {
    let windows = definition.windows();
    if windows.is_empty() {
        return Err(CycleError::configuration(
            "SEMIANNUAL_CALENDAR cycles need a `multiple_windows` definition with at least one window",
        ));
    }

    let upcoming = upcoming_window(windows, reference)?;
    let current = current_window(windows, reference)?;
    let cycle = current.unwrap_or(upcoming);

    Ok(CycleBounds {
        start: Some(cycle.start),
        end: cycle.end,
        next_reset: upcoming.start,
    })
}

fn current_window(
    windows: &[CycleWindow],
    reference: NaiveDate,
) -> CycleResult<Option<PlacedWindow>> {
    for window in windows {
        let placed = PlacedWindow::place(window, reference.year())?;
        if placed.contains(reference) {
            return Ok(Some(placed));
        }
    }
    Ok(None)
}

/// First window starting strictly after `reference` this year, else the
/// first window of next year.
fn upcoming_window(windows: &[CycleWindow], reference: NaiveDate) -> CycleResult<PlacedWindow> {
    let year = reference.year();
    for window in windows {
        let placed = PlacedWindow::place(window, year)?;
        if placed.start > reference {
            return Ok(placed);
        }
    }

    let Some(first) = windows.first() else {
        return Err(CycleError::configuration(
            "could not determine the next window for a semiannual benefit",
        ));
    };
    PlacedWindow::place(first, year + 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{CycleBounds, resolve_cycle};
    use crate::CycleError;
    use crate::cycle::date::format_iso_date;
    use crate::cycle::definition::{CardAnniversary, CycleDefinition, CycleType, CycleWindow};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }

    fn iso(value: Option<NaiveDate>) -> Option<String> {
        value.as_ref().map(format_iso_date)
    }

    fn halves() -> CycleDefinition {
        let windows = vec![
            CycleWindow {
                start_month: 1,
                start_day: 1,
                end_month: 6,
                end_day: 30,
            },
            CycleWindow {
                start_month: 7,
                start_day: 1,
                end_month: 12,
                end_day: 31,
            },
        ];
        CycleDefinition::MultipleWindows { windows }
    }

    fn assert_bounds(
        resolved: Result<CycleBounds, CycleError>,
        start: Option<&str>,
        end: &str,
        next_reset: &str,
    ) {
        assert!(resolved.is_ok(), "unexpected error: {resolved:?}");
        if let Ok(bounds) = resolved {
            assert_eq!(iso(bounds.start).as_deref(), start);
            assert_eq!(format_iso_date(&bounds.end), end);
            assert_eq!(format_iso_date(&bounds.next_reset), next_reset);
        }
    }

    #[test]
    fn monthly_cycle_spans_the_reference_month() {
        let single = CycleDefinition::single();
        assert_bounds(
            resolve_cycle(CycleType::Monthly, &single, date(2025, 4, 15), None),
            Some("2025-04-01"),
            "2025-04-30",
            "2025-05-01",
        );
        assert_bounds(
            resolve_cycle(CycleType::Monthly, &single, date(2025, 12, 31), None),
            Some("2025-12-01"),
            "2025-12-31",
            "2026-01-01",
        );
        assert_bounds(
            resolve_cycle(CycleType::Monthly, &single, date(2024, 2, 1), None),
            Some("2024-02-01"),
            "2024-02-29",
            "2024-03-01",
        );
    }

    #[test]
    fn calendar_year_cycle_ends_on_december_31() {
        assert_bounds(
            resolve_cycle(
                CycleType::CalendarYear,
                &CycleDefinition::single(),
                date(2025, 1, 1),
                None,
            ),
            Some("2025-01-01"),
            "2025-12-31",
            "2026-01-01",
        );
    }

    #[test]
    fn cardmember_year_anchors_on_the_anniversary() {
        let anniversary = CardAnniversary::new(3, 1);
        assert!(anniversary.is_ok());
        if let Ok(anniversary) = anniversary {
            let single = CycleDefinition::single();
            assert_bounds(
                resolve_cycle(
                    CycleType::CardmemberYear,
                    &single,
                    date(2025, 1, 15),
                    Some(&anniversary),
                ),
                Some("2024-03-02"),
                "2025-03-01",
                "2025-03-02",
            );
            assert_bounds(
                resolve_cycle(
                    CycleType::CardmemberYear,
                    &single,
                    date(2025, 3, 1),
                    Some(&anniversary),
                ),
                Some("2024-03-02"),
                "2025-03-01",
                "2025-03-02",
            );
            assert_bounds(
                resolve_cycle(
                    CycleType::CardmemberYear,
                    &single,
                    date(2025, 3, 2),
                    Some(&anniversary),
                ),
                Some("2025-03-02"),
                "2026-03-01",
                "2026-03-02",
            );
        }
    }

    #[test]
    fn leap_day_anniversary_falls_back_to_february_28() {
        let anniversary = CardAnniversary::new(2, 29);
        assert!(anniversary.is_ok());
        if let Ok(anniversary) = anniversary {
            assert_bounds(
                resolve_cycle(
                    CycleType::CardmemberYear,
                    &CycleDefinition::single(),
                    date(2025, 2, 10),
                    Some(&anniversary),
                ),
                Some("2024-03-01"),
                "2025-02-28",
                "2025-03-01",
            );
        }
    }

    #[test]
    fn semiannual_uses_the_containing_window() {
        assert_bounds(
            resolve_cycle(CycleType::SemiannualCalendar, &halves(), date(2025, 4, 15), None),
            Some("2025-01-01"),
            "2025-06-30",
            "2025-07-01",
        );
        assert_bounds(
            resolve_cycle(CycleType::SemiannualCalendar, &halves(), date(2025, 12, 20), None),
            Some("2025-07-01"),
            "2025-12-31",
            "2026-01-01",
        );
    }

    #[test]
    fn semiannual_gap_rolls_forward_to_the_next_window() {
        let spring_and_fall = CycleDefinition::MultipleWindows {
            windows: vec![
                CycleWindow {
                    start_month: 3,
                    start_day: 1,
                    end_month: 5,
                    end_day: 31,
                },
                CycleWindow {
                    start_month: 9,
                    start_day: 1,
                    end_month: 11,
                    end_day: 30,
                },
            ],
        };
        assert_bounds(
            resolve_cycle(
                CycleType::SemiannualCalendar,
                &spring_and_fall,
                date(2025, 7, 4),
                None,
            ),
            Some("2025-09-01"),
            "2025-11-30",
            "2025-09-01",
        );
        assert_bounds(
            resolve_cycle(
                CycleType::SemiannualCalendar,
                &spring_and_fall,
                date(2025, 12, 15),
                None,
            ),
            Some("2026-03-01"),
            "2026-05-31",
            "2026-03-01",
        );
    }

    #[test]
    fn one_time_and_per_trip_use_the_sentinel() {
        for cycle_type in [CycleType::OneTime, CycleType::PerTrip] {
            assert_bounds(
                resolve_cycle(cycle_type, &CycleDefinition::single(), date(2025, 8, 1), None),
                None,
                "2099-12-31",
                "2099-12-31",
            );
        }
    }

    #[test]
    fn missing_inputs_are_configuration_errors() {
        let missing_anniversary = resolve_cycle(
            CycleType::CardmemberYear,
            &CycleDefinition::single(),
            date(2025, 1, 15),
            None,
        );
        assert!(matches!(missing_anniversary, Err(CycleError::Configuration(_))));

        let no_windows = resolve_cycle(
            CycleType::SemiannualCalendar,
            &CycleDefinition::MultipleWindows {
                windows: Vec::new(),
            },
            date(2025, 1, 15),
            None,
        );
        assert!(matches!(no_windows, Err(CycleError::Configuration(_))));

        let single_semiannual = resolve_cycle(
            CycleType::SemiannualCalendar,
            &CycleDefinition::single(),
            date(2025, 1, 15),
            None,
        );
        assert!(matches!(single_semiannual, Err(CycleError::Configuration(_))));
    }
}
