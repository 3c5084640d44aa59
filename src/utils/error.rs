use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Exchange rejected: {reason}")]
    ExchangeRejected { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    System,
    Configuration,
    Catalog,
    Exchange,
}

impl ExchangeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExchangeError::IoError(_) | ExchangeError::SerializationError(_) => {
                ErrorCategory::System
            }
            ExchangeError::ConfigError { .. }
            | ExchangeError::ConfigValidationError { .. }
            | ExchangeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ExchangeError::CatalogError { .. } => ErrorCategory::Catalog,
            ExchangeError::ExchangeRejected { .. } => ErrorCategory::Exchange,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            ExchangeError::IoError(e) => format!("Could not read or write a file: {}", e),
            ExchangeError::SerializationError(e) => format!("Malformed JSON data: {}", e),
            ExchangeError::ConfigError { message } => format!("Configuration problem: {}", message),
            ExchangeError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is not valid: {}", field, message)
            }
            ExchangeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is not valid: {}", field, reason)
            }
            ExchangeError::CatalogError { message } => {
                format!("The product catalog could not be loaded: {}", message)
            }
            ExchangeError::ExchangeRejected { reason } => {
                format!("The exchange did not go through: {}", reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::System => "Check that the file exists and is readable",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Catalog => "Check the catalog markup or JSON for product entries",
            ErrorCategory::Exchange => "Try the exchange again; your points were not deducted",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
