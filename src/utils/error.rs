use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unsupported selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("No element matches selector '{selector}'")]
    ElementNotFoundError { selector: String },

    #[error("Node #{id} does not belong to this document")]
    UnknownNodeError { id: usize },

    #[error("Dispatch of '{event}' failed: {message}")]
    DispatchError { event: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Page,
    Selector,
    Event,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ShimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShimError::IoError(_) => ErrorCategory::Io,
            ShimError::SerializationError(_) => ErrorCategory::Page,
            ShimError::CsvError(_) => ErrorCategory::Io,
            ShimError::SelectorError { .. } => ErrorCategory::Selector,
            ShimError::ElementNotFoundError { .. } => ErrorCategory::Page,
            ShimError::UnknownNodeError { .. } => ErrorCategory::Page,
            ShimError::DispatchError { .. } => ErrorCategory::Event,
            ShimError::ConfigError { .. }
            | ShimError::ConfigValidationError { .. }
            | ShimError::InvalidConfigValueError { .. }
            | ShimError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ShimError::IoError(_) => ErrorSeverity::Critical,
            ShimError::SerializationError(_) => ErrorSeverity::High,
            ShimError::CsvError(_) => ErrorSeverity::Medium,
            ShimError::SelectorError { .. } => ErrorSeverity::High,
            ShimError::ElementNotFoundError { .. } => ErrorSeverity::Medium,
            ShimError::UnknownNodeError { .. } => ErrorSeverity::High,
            ShimError::DispatchError { .. } => ErrorSeverity::High,
            ShimError::ConfigError { .. }
            | ShimError::ConfigValidationError { .. }
            | ShimError::InvalidConfigValueError { .. }
            | ShimError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ShimError::IoError(_) => {
                "Check that the referenced files exist and are readable/writable".to_string()
            }
            ShimError::SerializationError(_) => {
                "Check the page snapshot JSON structure against the documented format".to_string()
            }
            ShimError::CsvError(_) => {
                "Check the report path and re-run; the simulation itself already completed"
                    .to_string()
            }
            ShimError::SelectorError { .. } => {
                "Use the supported subset: tag, #id, .class, [attr], [attr='value'], descendant and '>' combinators"
                    .to_string()
            }
            ShimError::ElementNotFoundError { .. } => {
                "Check the selector against the page snapshot; the element may be missing or spelled differently"
                    .to_string()
            }
            ShimError::UnknownNodeError { .. } => {
                "Only use node handles obtained from this document's own queries".to_string()
            }
            ShimError::DispatchError { .. } => {
                "Inspect the listener that failed; dispatch stops at the first listener error"
                    .to_string()
            }
            ShimError::ConfigError { .. }
            | ShimError::ConfigValidationError { .. }
            | ShimError::InvalidConfigValueError { .. }
            | ShimError::MissingConfigError { .. } => {
                "Fix the scenario/CLI configuration and run again".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShimError::IoError(e) => format!("File operation failed: {}", e),
            ShimError::SerializationError(_) => "The page snapshot could not be parsed".to_string(),
            ShimError::CsvError(_) => "Writing the event report failed".to_string(),
            ShimError::SelectorError { selector, .. } => {
                format!("The selector '{}' is not supported", selector)
            }
            ShimError::ElementNotFoundError { selector } => {
                format!("Nothing on the page matches '{}'", selector)
            }
            ShimError::UnknownNodeError { .. } => "Internal page reference is stale".to_string(),
            ShimError::DispatchError { event, .. } => {
                format!("A listener for '{}' reported an error", event)
            }
            ShimError::ConfigError { message } => format!("Configuration problem: {}", message),
            ShimError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            ShimError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            ShimError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ShimError>;
