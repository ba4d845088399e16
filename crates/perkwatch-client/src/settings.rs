use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::cycle::DEFAULT_EXPIRING_SOON_DAYS;
use crate::cycle::date::parse_iso_date;
use crate::{ClientError, ClientResult};

pub const TODAY_VAR: &str = "PERKWATCH_TODAY";
pub const SOON_DAYS_VAR: &str = "PERKWATCH_SOON_DAYS";
pub const HORIZON_DAYS_VAR: &str = "PERKWATCH_HORIZON_DAYS";
pub const CATALOG_VAR: &str = "PERKWATCH_CATALOG";

/// How far ahead the expiring report looks by default.
pub const DEFAULT_HORIZON_DAYS: i64 = 60;

const CATALOG_DIR: &str = ".perkwatch";
const CATALOG_FILE: &str = "catalog.json";

/// Environment-level configuration. Command-line flags take precedence over
/// every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub today: Option<NaiveDate>,
    pub soon_days: i64,
    pub horizon_days: i64,
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            today: None,
            soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            horizon_days: DEFAULT_HORIZON_DAYS,
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = non_empty(lookup(TODAY_VAR)) {
            settings.today = Some(
                parse_iso_date(&value)
                    .ok_or_else(|| ClientError::invalid_setting(TODAY_VAR, &value, "a YYYY-MM-DD date"))?,
            );
        }
        if let Some(value) = non_empty(lookup(SOON_DAYS_VAR)) {
            settings.soon_days = parse_day_count(SOON_DAYS_VAR, &value)?;
        }
        if let Some(value) = non_empty(lookup(HORIZON_DAYS_VAR)) {
            settings.horizon_days = parse_day_count(HORIZON_DAYS_VAR, &value)?;
        }
        if let Some(value) = non_empty(lookup(CATALOG_VAR)) {
            settings.catalog_path = Some(PathBuf::from(value));
        }

        Ok(settings)
    }

    /// Picks the single reference date for one invocation: the flag, then
    /// `PERKWATCH_TODAY`, then `clock`.
    pub fn reference_date<C>(&self, flag: Option<&str>, clock: C) -> ClientResult<NaiveDate>
    where
        C: FnOnce() -> NaiveDate,
    {
        if let Some(value) = flag {
            return parse_iso_date(value).ok_or_else(|| {
                ClientError::invalid_argument(
                    "`today` must use YYYY-MM-DD format with a real calendar date.",
                )
            });
        }
        Ok(self.today.unwrap_or_else(clock))
    }

    pub fn catalog_path(&self, flag: Option<&Path>) -> ClientResult<PathBuf> {
        let candidate = match (flag, self.catalog_path.as_ref()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => path.clone(),
            (None, None) => match home::home_dir() {
                Some(home_path) => home_path.join(CATALOG_DIR).join(CATALOG_FILE),
                None => return Err(ClientError::home_unresolved()),
            },
        };
        absolutize(&candidate)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn parse_day_count(variable: &str, value: &str) -> ClientResult<i64> {
    value
        .parse::<i64>()
        .ok()
        .filter(|days| *days >= 0)
        .ok_or_else(|| ClientError::invalid_setting(variable, value, "a non-negative whole number of days"))
}

fn absolutize(path: &Path) -> ClientResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| ClientError::catalog_unreadable(path, &error.to_string()))
}
