//! Error types.
//!
//! - `AppError` is fatal for the current command: it carries a process exit code
//!   and a user-facing message. Startup failures (missing dataset/model/encoders)
//!   are always `AppError`s and stop the program before the form is usable.
//! - `PredictError` is scoped to a single prediction attempt. Front-ends show it
//!   inline and keep the session going.

use crate::domain::Field;

/// Exit code for a canceled prompt or output that could not be written.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for a missing/unreadable startup asset.
pub const EXIT_ASSET_MISSING: u8 = 2;
/// Exit code for an asset that exists but cannot be used.
pub const EXIT_ASSET_INVALID: u8 = 3;
/// Exit code for a failed prediction in a scripted command.
pub const EXIT_PREDICT: u8 = 4;
/// Exit code for a terminal (raw mode, drawing, input) failure in the form.
pub const EXIT_TERMINAL: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A required startup asset could not be read.
    pub fn asset_missing(message: impl Into<String>) -> Self {
        Self::new(EXIT_ASSET_MISSING, message)
    }

    /// A startup asset was read but its content is unusable.
    pub fn asset_invalid(message: impl Into<String>) -> Self {
        Self::new(EXIT_ASSET_INVALID, message)
    }

    /// The interactive terminal could not be driven.
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(EXIT_TERMINAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn is_startup_failure(&self) -> bool {
        matches!(self.exit_code, EXIT_ASSET_MISSING | EXIT_ASSET_INVALID)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Recoverable failure of one predict action.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// The selected label was never seen when the encoders were fit.
    #[error("{} '{label}' not found in training data.", field.display_name())]
    UnknownLabel { field: Field, label: String },

    #[error("Month must be between 1 and 12 (got {0}).")]
    InvalidMonth(u32),

    /// The prediction service itself failed.
    #[error("Could not predict. Try another combination. ({0})")]
    Prediction(String),
}

impl PredictError {
    pub fn unknown(field: Field, label: impl Into<String>) -> Self {
        Self::UnknownLabel {
            field,
            label: label.into(),
        }
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::new(EXIT_PREDICT, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_label_message_names_field_and_value() {
        let err = PredictError::unknown(Field::Market, "Nonexistent Market");
        assert_eq!(err.to_string(), "Market 'Nonexistent Market' not found in training data.");
    }

    #[test]
    fn predict_error_maps_to_scripted_exit_code() {
        let app: AppError = PredictError::Prediction("boom".to_string()).into();
        assert_eq!(app.exit_code(), EXIT_PREDICT);
        assert!(!app.is_startup_failure());
        assert!(AppError::asset_missing("x").is_startup_failure());
    }

    #[test]
    fn terminal_failures_are_not_prediction_failures() {
        let err = AppError::terminal("Event read error");
        assert_eq!(err.exit_code(), EXIT_TERMINAL);
        assert_ne!(EXIT_TERMINAL, EXIT_PREDICT);
        assert!(!err.is_startup_failure());
    }
}
