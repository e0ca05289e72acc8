//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found error.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration validation error.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment parsing error.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),

    /// The validated values were rejected by the simulation core.
    #[error("Configuration rejected by simulation core: {0}")]
    Core(#[from] slowlane_core::SimulationError),
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (path, message) in flatten_errors(errors, String::new()) {
        let _ = writeln!(output, "Field '{}':", path);
        let _ = writeln!(output, "  - {}", message);
    }
    output
}

/// Walks nested struct errors so `system.arrival_rate` is reported with its full path.
fn flatten_errors(errors: &ValidationErrors, prefix: String) -> Vec<(String, String)> {
    use validator::ValidationErrorsKind;

    let mut flat = Vec::new();
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(msg) => msg.to_string(),
                        None => error.code.to_string(),
                    };
                    flat.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => flat.extend(flatten_errors(nested, path)),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flat.extend(flatten_errors(nested, format!("{path}[{index}]")));
                }
            }
        }
    }
    flat
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
