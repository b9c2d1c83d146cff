use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Data file not found for {table}: {path}")]
    MissingDataFile { table: String, path: String },

    #[error("Schema mismatch in {table}: missing columns {}", .missing.join(", "))]
    SchemaMismatch { table: String, missing: Vec<String> },

    #[error("Malformed row in {table} at line {line}: {message}")]
    MalformedRow {
        table: String,
        line: u64,
        message: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("No usable records after joining {rows} cost rows")]
    EmptyMasterTable { rows: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::MissingDataFile { .. } | DashboardError::IoError(_) => {
                ErrorCategory::Input
            }
            DashboardError::CsvError(_)
            | DashboardError::SchemaMismatch { .. }
            | DashboardError::MalformedRow { .. }
            | DashboardError::ProcessingError { .. }
            | DashboardError::EmptyMasterTable { .. } => ErrorCategory::Data,
            DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DashboardError::ZipError(_) | DashboardError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 合併後沒有資料，多半是 Order_ID 對不上
            DashboardError::EmptyMasterTable { .. } => ErrorSeverity::Medium,
            DashboardError::MissingDataFile { .. }
            | DashboardError::SchemaMismatch { .. }
            | DashboardError::MalformedRow { .. }
            | DashboardError::CsvError(_)
            | DashboardError::ProcessingError { .. }
            | DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. } => ErrorSeverity::High,
            DashboardError::IoError(_)
            | DashboardError::ZipError(_)
            | DashboardError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashboardError::MissingDataFile { path, .. } => format!(
                "Make sure {} exists in the data directory (see --data-dir)",
                path
            ),
            DashboardError::SchemaMismatch { table, missing } => format!(
                "Add the columns {} to the {} file header",
                missing.join(", "),
                table
            ),
            DashboardError::MalformedRow { table, line, .. } => {
                format!("Fix line {} of the {} file", line, table)
            }
            DashboardError::CsvError(_) => "Check that the input files are valid CSV".to_string(),
            DashboardError::ConfigValidationError { field, .. }
            | DashboardError::InvalidConfigValueError { field, .. }
            | DashboardError::MissingConfigError { field } => {
                format!("Review the '{}' setting", field)
            }
            DashboardError::EmptyMasterTable { .. } => {
                "Check that Order_ID values match across the cost, route, order and rating files"
                    .to_string()
            }
            DashboardError::ProcessingError { .. } => {
                "Re-run with --verbose to see which step failed".to_string()
            }
            DashboardError::IoError(_) => {
                "Check file permissions and free disk space".to_string()
            }
            DashboardError::ZipError(_) | DashboardError::SerializationError(_) => {
                "Check that the output path is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read input data: {}", self),
            ErrorCategory::Data => format!("Data loading failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write dashboard: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
