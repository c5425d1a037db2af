use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to read spreadsheet: {message}")]
    ReadError { message: String },

    #[error("No sheets found in workbook")]
    NoSheets,

    #[error("No screen data provided")]
    NoScreenData,

    #[error("Could not determine a standard layout pattern for group '{group}'")]
    NoStandardLayout { group: String },

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

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Analysis,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn read(message: impl Into<String>) -> Self {
        AuditError::ReadError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::ReadError { .. }
            | AuditError::NoSheets
            | AuditError::NoScreenData => ErrorCategory::Input,
            AuditError::NoStandardLayout { .. } => ErrorCategory::Analysis,
            AuditError::CsvError(_)
            | AuditError::ZipError(_)
            | AuditError::IoError(_)
            | AuditError::SerializationError(_) => ErrorCategory::Output,
            AuditError::ConfigError { .. }
            | AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AuditError::NoScreenData => ErrorSeverity::Medium,
            AuditError::IoError(_) | AuditError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code for the binaries: 1 processing, 2 empty input, 3 system.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 依錯誤類型給出修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::ReadError { .. } => {
                "Check that the file exists and is a valid xlsx, xls, ods or csv spreadsheet"
            }
            AuditError::NoSheets => "Make sure the workbook contains at least one worksheet",
            AuditError::NoScreenData => {
                "Make sure the sheet has outlet headers (e.g. 'Food Outlets:') followed by screen rows with priced items"
            }
            AuditError::NoStandardLayout { .. } => {
                "Inspect the group's screens; every screen should list at least one priced item"
            }
            AuditError::CsvError(_) => "The discrepancy CSV could not be written; check the output directory",
            AuditError::ZipError(_) | AuditError::IoError(_) => {
                "Check that the output directory is writable and has free space"
            }
            AuditError::SerializationError(_) => "Report this as a bug with the input file attached",
            AuditError::ConfigError { .. }
            | AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. } => {
                "Review the configuration file or command-line flags"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::ReadError { message } => format!("Could not read the spreadsheet: {}", message),
            AuditError::NoSheets => "The workbook has no sheets".to_string(),
            AuditError::NoScreenData => "No screen data provided".to_string(),
            AuditError::NoStandardLayout { group } => {
                format!("Could not determine a standard layout pattern for {}", group)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
