use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const EXPIRY_HELP_COMMAND: &str = "perkwatch expiry --help";
pub(crate) const CATALOG_HELP_COMMAND: &str = "perkwatch expiring --help";

/// Failures raised by the cycle engine.
///
/// Both kinds point at bad upstream data and are never retryable. The engine
/// returns them as soon as they are detected; deciding whether to skip the
/// affected benefit is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// The cycle definition or an auxiliary input (anniversary, window list)
    /// is missing or structurally invalid for the cycle type.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The cycle type string is not one the engine knows.
    #[error("unsupported cycle type `{0}`")]
    UnsupportedCycle(String),
}

impl CycleError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::UnsupportedCycle(_) => "unsupported_cycle",
        }
    }
}

pub type CycleResult<T> = Result<T, CycleError>;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `perkwatch {cmd} --help` for usage."),
            None => "Run `perkwatch --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_setting(variable: &str, value: &str, expected: &str) -> Self {
        Self::new(
            "invalid_argument",
            &format!("Environment variable `{variable}` has invalid value `{value}`."),
            vec![
                format!("Set `{variable}` to {expected}, or unset it to use the default."),
                "Run `perkwatch --help` for usage.".to_string(),
            ],
        )
        .with_data(json!({
            "variable": variable,
            "value": value,
        }))
    }

    /// Wraps an engine failure for a single benefit lookup.
    pub fn from_cycle(error: &CycleError, benefit_id: Option<&str>) -> Self {
        let recovery_steps = match error {
            CycleError::Configuration(_) => vec![
                "Fix the cycle definition or card anniversary for this benefit.".to_string(),
                format!("Run `{EXPIRY_HELP_COMMAND}` to review the definition format."),
            ],
            CycleError::UnsupportedCycle(_) => vec![
                "Use one of: MONTHLY, CALENDAR_YEAR, CARDMEMBER_YEAR, SEMIANNUAL_CALENDAR, ONE_TIME, PER_TRIP."
                    .to_string(),
            ],
        };
        let error_value = Self::new(error.code(), &error.to_string(), recovery_steps);
        match benefit_id {
            Some(id) => error_value.with_data(json!({
                "benefit_id": id,
            })),
            None => error_value,
        }
    }

    pub fn catalog_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "catalog_unreadable",
            &format!("Cannot read benefit catalog at `{location}`: {detail}"),
            vec![
                format!("Check that `{location}` exists and is readable."),
                "Pass a catalog path explicitly or set `PERKWATCH_CATALOG`.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
            "help_command": CATALOG_HELP_COMMAND,
        }))
    }

    pub fn catalog_invalid(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "catalog_invalid",
            &format!("Benefit catalog at `{location}` is not valid: {detail}"),
            vec![
                "The catalog must be a JSON object with `cards` and optional `usage` arrays."
                    .to_string(),
                format!("Run `{CATALOG_HELP_COMMAND}` to review the catalog format."),
            ],
        )
        .with_data(json!({
            "path": location,
            "help_command": CATALOG_HELP_COMMAND,
        }))
    }

    pub fn home_unresolved() -> Self {
        Self::new(
            "catalog_unreadable",
            "Could not resolve a home directory to locate the default benefit catalog.",
            vec!["Pass a catalog path explicitly or set `PERKWATCH_CATALOG`.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

impl From<CycleError> for ClientError {
    fn from(error: CycleError) -> Self {
        Self::from_cycle(&error, None)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
