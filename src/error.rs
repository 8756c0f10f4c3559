use crate::notify::{Notice, NoticeLevel};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("{file_name}: {}", reasons.join("; "))]
    Validation {
        file_name: String,
        reasons: Vec<String>,
    },

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("No character classes selected")]
    EmptyCharset,

    #[error("Password length {length} outside {min}..={max}")]
    InvalidLength { length: usize, min: usize, max: usize },

    #[error("Screen capture denied: {0}")]
    CaptureDenied(String),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardFailure(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Interrupted before the command finished")]
    Interrupted,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ToolError {
    /// Whether the user can simply correct the input and try again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ToolError::ConfigurationError(_) | ToolError::IoError(_)
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ToolError::ClipboardFailure(_) => ErrorSeverity::Low,
            ToolError::Validation { .. } => ErrorSeverity::Low,
            ToolError::EmptyCharset | ToolError::InvalidLength { .. } => ErrorSeverity::Low,
            ToolError::ConfigurationError(_) => ErrorSeverity::High,
            ToolError::IoError(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    /// Transient notice shown at the point of use.
    pub fn notice(&self) -> Notice {
        let level = match self.severity() {
            ErrorSeverity::Low => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };

        let title = match self {
            ToolError::Validation { .. } => "File rejected",
            ToolError::UnsupportedAlgorithm(_) => "Unsupported algorithm",
            ToolError::EmptyCharset | ToolError::InvalidLength { .. } => "Cannot generate password",
            ToolError::CaptureDenied(_) | ToolError::CaptureFailed(_) => "Recording failed",
            ToolError::AlreadyRecording => "Already recording",
            ToolError::ClipboardFailure(_) => "Copy failed",
            ToolError::InvalidUrl(_) => "Invalid URL",
            ToolError::InvalidEncoding(_) => "Invalid input",
            ToolError::UnsupportedFormat(_) => "Unsupported format",
            ToolError::Interrupted => "Cancelled",
            _ => "Error",
        };

        Notice::new(level, title, self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for ToolError {
    fn from(err: base64::DecodeError) -> Self {
        ToolError::InvalidEncoding(err.to_string())
    }
}
