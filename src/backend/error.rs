//! Native Backend Error Types

use std::fmt;

/// Non-success status codes reported by a native capture backend.
///
/// The set mirrors the status words of the SANE C API so adapters can map
/// one-to-one; other backends pick the closest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Unsupported,
    Cancelled,
    DeviceBusy,
    Invalid,
    Eof,
    Jammed,
    NoDocs,
    CoverOpen,
    IoError,
    NoMem,
    AccessDenied,
}

impl Status {
    /// Map a raw native status code. `None` means success (code 0) or an
    /// unknown code that is folded into [`Status::IoError`] by callers.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Status::Unsupported),
            2 => Some(Status::Cancelled),
            3 => Some(Status::DeviceBusy),
            4 => Some(Status::Invalid),
            5 => Some(Status::Eof),
            6 => Some(Status::Jammed),
            7 => Some(Status::NoDocs),
            8 => Some(Status::CoverOpen),
            9 => Some(Status::IoError),
            10 => Some(Status::NoMem),
            11 => Some(Status::AccessDenied),
            _ => None,
        }
    }

    /// Raw native status code for this status.
    pub fn code(self) -> i32 {
        match self {
            Status::Unsupported => 1,
            Status::Cancelled => 2,
            Status::DeviceBusy => 3,
            Status::Invalid => 4,
            Status::Eof => 5,
            Status::Jammed => 6,
            Status::NoDocs => 7,
            Status::CoverOpen => 8,
            Status::IoError => 9,
            Status::NoMem => 10,
            Status::AccessDenied => 11,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Unsupported => "Operation not supported",
            Status::Cancelled => "Operation was cancelled",
            Status::DeviceBusy => "Device busy",
            Status::Invalid => "Invalid argument",
            Status::Eof => "End of file reached",
            Status::Jammed => "Document feeder jammed",
            Status::NoDocs => "Document feeder out of documents",
            Status::CoverOpen => "Scanner cover is open",
            Status::IoError => "Error during device I/O",
            Status::NoMem => "Out of memory",
            Status::AccessDenied => "Access to resource has been denied",
        };
        write!(f, "{} (code: {})", text, self.code())
    }
}

/// Errors surfaced by a [`crate::backend::ScanBackend`] implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    Status(Status),

    #[error("Unknown device handle: {handle}")]
    UnknownHandle { handle: u64 },

    #[error("Option index {index} out of range")]
    OptionIndex { index: usize },

    #[error("Option value does not match option type: {message}")]
    ValueKind { message: String },

    #[error("Backend is not initialised")]
    NotInitialised,

    #[error("Backend failure: {message}")]
    Other { message: String },
}

impl BackendError {
    /// True when the error is the end-of-data marker of a read loop.
    pub fn is_eof(&self) -> bool {
        matches!(self, BackendError::Status(Status::Eof))
    }
}

impl From<Status> for BackendError {
    fn from(status: Status) -> Self {
        BackendError::Status(status)
    }
}

/// Result type for native backend operations
pub type BackendResult<T> = Result<T, BackendError>;
