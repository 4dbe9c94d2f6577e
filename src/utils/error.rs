use crate::domain::model::Rejection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown compartment size '{name}'")]
    UnknownCompartment { name: String },

    #[error("Cannot convert {entity} record: {message}")]
    ConversionError { entity: String, message: String },

    #[error("Record rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LockerError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LockerError::Rejected(_) => ErrorSeverity::Low,
            LockerError::ValidationError { .. } | LockerError::CsvError(_) => ErrorSeverity::Medium,
            LockerError::UnknownCompartment { .. }
            | LockerError::ConversionError { .. }
            | LockerError::SerializationError(_)
            | LockerError::ZipError(_) => ErrorSeverity::High,
            LockerError::IoError(_)
            | LockerError::ConfigError { .. }
            | LockerError::MissingConfigError { .. }
            | LockerError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LockerError::IoError(_) => "Check that the data files exist and are readable",
            LockerError::SerializationError(_) => "Make sure every data file holds a JSON array of objects",
            LockerError::MissingConfigError { .. }
            | LockerError::InvalidConfigValueError { .. }
            | LockerError::ConfigError { .. } => "Review the configuration file and command line flags",
            LockerError::UnknownCompartment { .. } => "Compartment sizes must be one of: small, medium, large",
            LockerError::ConversionError { .. } => "Fix the offending record in the data file",
            LockerError::Rejected(_) | LockerError::ValidationError { .. } => {
                "Correct the record fields and try again"
            }
            LockerError::CsvError(_) | LockerError::ZipError(_) => "Check that the output path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LockerError::IoError(e) => format!("Could not access a file: {}", e),
            LockerError::Rejected(reason) => format!("The record did not pass validation: {}", reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LockerError>;
