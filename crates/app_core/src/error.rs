//! Application error types

use app_net::NetError;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Reported to the user, session continues =====
    #[error(transparent)]
    Net(#[from] NetError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing selected")]
    NothingSelected,

    // ===== Local persistence =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Net(e) => e.user_message(),
            AppError::InvalidInput(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_error_message_passes_through() {
        let err = AppError::from(NetError::Application {
            status: 500,
            message: "disk full".into(),
        });
        assert_eq!(err.user_message(), "disk full");
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_toml_error_is_config() {
        let err: AppError = toml::from_str::<toml::Table>("= broken").unwrap_err().into();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.user_message().starts_with("Configuration error"));
    }
}
