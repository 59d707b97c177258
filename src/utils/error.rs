use crate::domain::report::{ParseError, SourceLocation, ValidationIssue, ValidationWarning};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        location: Option<SourceLocation>,
    },

    #[error("Validation failed with {} error(s) and {} warning(s)", errors.len(), warnings.len())]
    Validation {
        errors: Vec<ValidationIssue>,
        warnings: Vec<ValidationWarning>,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

pub type Result<T> = std::result::Result<T, MigrationError>;

impl From<ParseError> for MigrationError {
    fn from(e: ParseError) -> Self {
        MigrationError::Parse {
            message: e.message,
            location: e.location,
        }
    }
}

/// Which pipeline boundary a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    ParseFailure,
    ValidationFailure,
    RenderFailure,
    IoFailure,
    ConfigFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Architecture,
    Internal,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MigrationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MigrationError::Parse { .. } => FailureKind::ParseFailure,
            MigrationError::Validation { .. } => FailureKind::ValidationFailure,
            MigrationError::Render { .. } => FailureKind::RenderFailure,
            MigrationError::Io(_)
            | MigrationError::Storage { .. }
            | MigrationError::Serialization(_) => FailureKind::IoFailure,
            MigrationError::Toml(_)
            | MigrationError::Config { .. }
            | MigrationError::InvalidConfigValue { .. }
            | MigrationError::MissingConfig { .. } => FailureKind::ConfigFailure,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            FailureKind::ParseFailure => ErrorCategory::Input,
            FailureKind::ValidationFailure => ErrorCategory::Architecture,
            FailureKind::RenderFailure => ErrorCategory::Internal,
            FailureKind::IoFailure => ErrorCategory::System,
            FailureKind::ConfigFailure => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MigrationError::Validation { errors, .. } if errors.is_empty() => ErrorSeverity::Low,
            MigrationError::Parse { .. } | MigrationError::Validation { .. } => ErrorSeverity::Medium,
            MigrationError::Render { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Source location of the failure, when the reporting boundary knows it.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            MigrationError::Parse { location, .. } => location.as_ref(),
            MigrationError::Validation { errors, .. } => {
                errors.iter().find_map(|e| e.location.as_ref())
            }
            _ => None,
        }
    }

    /// Message for terminal output: the error plus its location and, for
    /// validation failures, every finding on its own line.
    pub fn user_friendly_message(&self) -> String {
        let mut message = match self.location() {
            Some(location) => format!("{} at {}", self, location),
            None => self.to_string(),
        };
        if let MigrationError::Validation { errors, warnings } = self {
            for error in errors {
                message.push_str(&format!("\n  error: {}", error));
            }
            for warning in warnings {
                message.push_str(&format!("\n  warning: {}", warning));
            }
        }
        message
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            FailureKind::ParseFailure => "Fix the syntax of the source file and run the migration again",
            FailureKind::ValidationFailure => {
                "Resolve the reported architecture violations, or rerun with --skip-validation"
            }
            FailureKind::RenderFailure => {
                "The declaration breaks an invariant the renderer relies on; enable validation to locate it"
            }
            FailureKind::IoFailure => "Check that the destination directory exists and is writable",
            FailureKind::ConfigFailure => "Check the configuration file and command line flags",
        }
    }
}
