//! Generic error handling utilities
//!
//! Lets the front end report any error type the same way: caller mistakes
//! are printed as-is, device and system failures get a short context line
//! with the details at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the message tells the user what to fix
    ///
    /// Examples: unknown device name, option string too long, unsupported
    /// device. Counter-examples: a jammed feeder, a failed native call.
    fn is_user_actionable(&self) -> bool;

    /// The message to show for a user-actionable error
    fn user_message(&self) -> Option<String>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use carbonpaper::core::error_handling::log_error_with_context;
/// # use carbonpaper::scanner::ScanError;
/// let error = ScanError::NoDeviceAvailable;
/// log_error_with_context(&error, "Scanning");
/// // Logs: "FATAL: No scanner found"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {} failed: {}", operation_context, error),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Text to print on the terminal for a failed operation
pub fn describe_error<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(message) if error.is_user_actionable() => message,
        _ => format!("{} failed: {}", operation_context, error),
    }
}
