use chrono::{Local, NaiveDate};
use perkwatch_client::commands;
use perkwatch_client::commands::calendar::{CalendarRunOptions, DEFAULT_CALENDAR_MONTHS};
use perkwatch_client::commands::expiring::ExpiringRunOptions;
use perkwatch_client::commands::expiry::ExpiryRunOptions;
use perkwatch_client::cycle::reference_date_of;
use perkwatch_client::settings::Settings;
use perkwatch_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, IsoDate};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    let settings = Settings::from_env()?;
    dispatch_with(cli, &settings, || reference_date_of(Local::now().naive_local()))
}

/// Runs one command against explicit settings. `clock` is consulted at most
/// once, and only when neither `--today` nor `PERKWATCH_TODAY` is set.
pub fn dispatch_with<C>(cli: &Cli, settings: &Settings, clock: C) -> ClientResult<SuccessEnvelope>
where
    C: FnOnce() -> NaiveDate,
{
    match &cli.command {
        Commands::Expiry {
            cycle_type,
            definition,
            anniversary,
            today,
            soon_days,
            ..
        } => {
            let reference_date =
                settings.reference_date(today.as_ref().map(IsoDate::as_str), clock)?;
            commands::expiry::run(&ExpiryRunOptions {
                cycle_type: cycle_type.clone(),
                definition: definition.clone(),
                anniversary: anniversary.clone(),
                reference_date,
                soon_days: soon_days.unwrap_or(settings.soon_days),
            })
        }
        Commands::Expiring {
            catalog,
            today,
            within,
            soon_days,
            ..
        } => {
            let catalog_path = settings.catalog_path(catalog.as_deref())?;
            let reference_date =
                settings.reference_date(today.as_ref().map(IsoDate::as_str), clock)?;
            commands::expiring::run(&ExpiringRunOptions {
                catalog_path,
                reference_date,
                horizon_days: within.unwrap_or(settings.horizon_days),
                soon_days: soon_days.unwrap_or(settings.soon_days),
            })
        }
        Commands::Calendar {
            catalog,
            today,
            months,
            ..
        } => {
            let catalog_path = settings.catalog_path(catalog.as_deref())?;
            let reference_date =
                settings.reference_date(today.as_ref().map(IsoDate::as_str), clock)?;
            commands::calendar::run(&CalendarRunOptions {
                catalog_path,
                reference_date,
                months: months.unwrap_or(DEFAULT_CALENDAR_MONTHS),
            })
        }
    }
}
