//! Scanner Error Types

use std::path::PathBuf;

use crate::backend::BackendError;

/// Scanner error types
///
/// Every failure aborts the current operation only; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The native backend could not be initialised; no service exists
    #[error("Could not initialise the '{backend}' scanner backend: {source}")]
    BackendInit {
        backend: String,
        #[source]
        source: BackendError,
    },

    /// A caller-supplied device name matches no enumerated device
    #[error("Scanner with the given name not found: {name}")]
    DeviceNotFound { name: String },

    /// Fallback to the first device with an empty device list
    #[error("No scanner found")]
    NoDeviceAvailable,

    /// The device lacks one or more of the required options
    #[error(
        "Not all required scanner options were found on '{device}' (missing: {}). Likely your device is not supported.",
        .missing.join(", ")
    )]
    UnsupportedDevice { device: String, missing: Vec<String> },

    /// A native call returned a non-success status
    #[error("Scanner operation '{operation}' failed on '{device}': {source}")]
    Native {
        operation: String,
        device: String,
        #[source]
        source: BackendError,
    },

    /// Caller supplied a value the native layer cannot hold
    #[error("Invalid scanner configuration: {message}")]
    PreconditionViolation { message: String },

    /// Frame parameters the scan driver cannot assemble
    #[error("Unsupported scan frame: {message}")]
    InvalidFrame { message: String },

    /// Malformed argument from the calling layer
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Image file could not be written
    #[error("Could not write image to '{}': {message}", .path.display())]
    Output { path: PathBuf, message: String },
}

impl ScanError {
    /// Wrap a backend failure, logging it with the originating call site.
    #[track_caller]
    pub fn native(operation: impl Into<String>, device: &str, source: BackendError) -> Self {
        let operation = operation.into();
        let location = std::panic::Location::caller();
        log::warn!(
            "Scanner operation '{}' failed on '{}': {} (at {}:{})",
            operation,
            device,
            source,
            location.file(),
            location.line()
        );
        ScanError::Native {
            operation,
            device: device.to_string(),
            source,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ScanError::PreconditionViolation {
            message: message.into(),
        }
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        ScanError::InvalidFrame {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ScanError::InvalidArgument {
            message: message.into(),
        }
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ScanError::DeviceNotFound { .. } => true,
            ScanError::NoDeviceAvailable => true,
            ScanError::UnsupportedDevice { .. } => true,
            ScanError::PreconditionViolation { .. } => true,
            ScanError::InvalidArgument { .. } => true,
            ScanError::Output { .. } => true,
            ScanError::BackendInit { .. } => false,
            ScanError::Native { .. } => false,
            ScanError::InvalidFrame { .. } => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
