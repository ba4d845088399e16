use std::path::PathBuf;

use clap::{Parser, Subcommand};
use perkwatch_client::cycle::date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    date::parse_iso_date(value)
        .map(|_| IsoDate(value.to_string()))
        .ok_or_else(|| "date must be a real calendar date in YYYY-MM-DD format".to_string())
}

pub fn parse_day_count(value: &str) -> Result<i64, String> {
    match value.parse::<i64>() {
        Ok(days) if days >= 0 => Ok(days),
        _ => Err("days must be a non-negative whole number".to_string()),
    }
}

pub fn parse_month_count(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(months) if (1..=120).contains(&months) => Ok(months),
        _ => Err("months must be a whole number from 1 to 120".to_string()),
    }
}

/// Extended help shown after `perkwatch expiry --help`.
pub const EXPIRY_AFTER_HELP: &str = "\
Cycle types:
  MONTHLY               Ends on the last day of the reference month.
  CALENDAR_YEAR         Ends on Dec 31 of the reference year.
  CARDMEMBER_YEAR       Ends on the card anniversary; needs --anniversary MM-DD.
                        On the anniversary itself the old cycle is still open.
  SEMIANNUAL_CALENDAR   Ends with the calendar window holding the reference date;
                        needs a multiple_windows definition.
  ONE_TIME, PER_TRIP    Never expire (2099-12-31) unless the definition sets expiryDate.

Cycle definition (--definition):
  {\"type\": \"single\"}
  {\"type\": \"single\", \"expiryDate\": \"2026-06-30\"}
  {\"type\": \"multiple_windows\", \"windows\": [
    {\"startMonth\": 1, \"startDay\": 1, \"endMonth\": 6, \"endDay\": 30},
    {\"startMonth\": 7, \"startDay\": 1, \"endMonth\": 12, \"endDay\": 31}
  ]}

  Windows repeat every year, must be in calendar order, must not overlap,
  and may not wrap past Dec 31. An expiryDate replaces the expiry date only;
  the cycle end and reset keep following the cycle type.

Environment:
  PERKWATCH_TODAY        Reference date used when --today is absent.
  PERKWATCH_SOON_DAYS    Expiring-soon threshold used when --soon-days is absent (default 30).
  PERKWATCH_LOG          Log filter for stderr diagnostics (default warn).
";

/// Extended help shown after `perkwatch expiring --help`.
pub const EXPIRING_AFTER_HELP: &str = "\
Catalog format (JSON object):
  {
    \"cards\": [
      {
        \"id\": \"amex-platinum\",
        \"name\": \"Platinum Card\",
        \"renewalMonthDay\": \"03-01\",
        \"benefits\": [
          {
            \"id\": \"saks-credit\",
            \"name\": \"Saks Credit\",
            \"cycleType\": \"SEMIANNUAL_CALENDAR\",
            \"cycleDefinition\": {\"type\": \"multiple_windows\", \"windows\": [...]},
            \"usageLimitPerCycle\": 50,
            \"currency\": \"USD\"
          }
        ]
      }
    ],
    \"usage\": [
      {\"benefitId\": \"saks-credit\", \"date\": \"2026-02-14\", \"amount\": 20}
    ]
  }

  cycleDefinition may also be the definition JSON as a string, and defaults
  to {\"type\": \"single\"}. Set \"active\": false to leave a benefit out.
  Value at risk is the per-cycle limit minus usage in the current cycle;
  it is only reported for USD benefits.

Which benefits are listed:
  Benefits expiring within --within days (default 60), that still have value
  left. Broken benefits are reported under Skipped and never stop the report.

Environment:
  PERKWATCH_CATALOG        Catalog path used when <catalog> is absent
                           (default ~/.perkwatch/catalog.json).
  PERKWATCH_TODAY          Reference date used when --today is absent.
  PERKWATCH_HORIZON_DAYS   Horizon used when --within is absent.
  PERKWATCH_SOON_DAYS      Expiring-soon threshold used when --soon-days is absent.
";

/// Extended help shown after `perkwatch calendar --help`.
pub const CALENDAR_AFTER_HELP: &str = "\
What is listed:
  Recurring benefits add an expiry event and a reset event on the day after.
  One-time and per-trip benefits are left out. Cards with a renewalMonthDay
  add their next anniversary. Only dates from today through --months months
  ahead (default 3) are shown, earliest first.

  The catalog uses the same format as `perkwatch expiring`. Broken benefits
  are reported under Skipped and never stop the calendar.

Environment:
  PERKWATCH_CATALOG   Catalog path used when <catalog> is absent.
  PERKWATCH_TODAY     Reference date used when --today is absent.
";

#[derive(Debug, Parser)]
#[command(
    name = "perkwatch",
    version,
    about = "credit card benefit cycle and expiry tracker",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the current cycle and expiry for one benefit
    #[command(after_long_help = EXPIRY_AFTER_HELP)]
    Expiry {
        /// MONTHLY, CALENDAR_YEAR, CARDMEMBER_YEAR, SEMIANNUAL_CALENDAR, ONE_TIME or PER_TRIP
        #[arg(long)]
        cycle_type: String,
        /// Cycle definition JSON (defaults to {"type":"single"})
        #[arg(long)]
        definition: Option<String>,
        /// Card anniversary as MM-DD, required for CARDMEMBER_YEAR
        #[arg(long)]
        anniversary: Option<String>,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<IsoDate>,
        /// Days ahead that count as expiring soon
        #[arg(long, value_parser = parse_day_count)]
        soon_days: Option<i64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List benefits with unused value that expire soon, most urgent first
    #[command(after_long_help = EXPIRING_AFTER_HELP)]
    Expiring {
        /// Path to the benefit catalog JSON file
        catalog: Option<PathBuf>,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<IsoDate>,
        /// Only list benefits expiring within this many days
        #[arg(long, value_parser = parse_day_count)]
        within: Option<i64>,
        /// Days ahead that count as expiring soon
        #[arg(long, value_parser = parse_day_count)]
        soon_days: Option<i64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show upcoming expiries, resets and card anniversaries by date
    #[command(after_long_help = CALENDAR_AFTER_HELP)]
    Calendar {
        /// Path to the benefit catalog JSON file
        catalog: Option<PathBuf>,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<IsoDate>,
        /// How many months ahead to show
        #[arg(long, value_parser = parse_month_count)]
        months: Option<u32>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
