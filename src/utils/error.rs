use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CleanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CleanError::ConfigValidationError { .. }
            | CleanError::InvalidConfigValueError { .. }
            | CleanError::PatternError(_) => ErrorCategory::Configuration,
            CleanError::InputNotFound { .. }
            | CleanError::CsvError(_)
            | CleanError::SerializationError(_) => ErrorCategory::Input,
            CleanError::ProcessingError { .. } => ErrorCategory::Processing,
            CleanError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CleanError::InputNotFound { .. } => {
                "Check the path; quoted paths are accepted, relative paths resolve against the working directory".to_string()
            }
            CleanError::CsvError(_) => {
                "Make sure the file has a header row and uses the configured delimiter (--delimiter)".to_string()
            }
            CleanError::SerializationError(_) => {
                "JSON input must be an array of flat objects".to_string()
            }
            CleanError::ConfigValidationError { .. }
            | CleanError::InvalidConfigValueError { .. }
            | CleanError::PatternError(_) => {
                "Fix the configuration file or command line flags and run again".to_string()
            }
            CleanError::ProcessingError { .. } => {
                "Re-run with --verbose to see which rows were involved".to_string()
            }
            CleanError::IoError(_) => {
                "Check file permissions and free disk space in the output directory".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CleanError::InputNotFound { path } => format!("File not found: {}", path),
            CleanError::CsvError(e) => format!("Could not read the CSV data: {}", e),
            CleanError::SerializationError(e) => format!("Could not read the JSON data: {}", e),
            CleanError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;
