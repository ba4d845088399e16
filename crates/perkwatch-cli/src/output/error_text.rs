use perkwatch_client::ClientError;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Could not compute benefit expiry.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
        String::new(),
        "What to do next:".to_string(),
    ];

    if error.recovery_steps.is_empty() {
        lines.push("  1. Run `perkwatch --help` for usage.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use perkwatch_client::{ClientError, CycleError};

    use super::render_error;

    #[test]
    fn renders_standard_error_layout() {
        let error = ClientError::from(CycleError::UnsupportedCycle("WEEKLY".to_string()));

        let rendered = render_error(&error);
        assert!(rendered.starts_with("Could not compute benefit expiry."));
        assert!(rendered.contains("  Error:    unsupported_cycle"));
        assert!(rendered.contains("  Details:  unsupported cycle type `WEEKLY`"));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. Use one of: MONTHLY"));
    }

    #[test]
    fn falls_back_to_help_hint_without_recovery_steps() {
        let error = ClientError::new("internal_serialization_error", "boom", Vec::new());
        let rendered = render_error(&error);
        assert!(rendered.ends_with("  1. Run `perkwatch --help` for usage."));
    }
}
