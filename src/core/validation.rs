//! Validation utilities
//!
//! Shared by the command line parser and the scanner core. Validators return
//! `Result<_, String>` so they plug straight into clap's `value_parser`.

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Validate a resolution given in dots per inch
pub fn validate_resolution(value: &str) -> Result<i32, String> {
    match value.parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err("Resolution must be greater than 0".to_string()),
        Err(_) => Err(format!("'{}' is not a valid resolution", value)),
    }
}

/// Validate a coordinate in millimetres
pub fn validate_millimetres(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
        Ok(_) => Err(format!("'{}' is not a valid position in millimetres", value)),
        Err(_) => Err(format!("'{}' is not a number", value)),
    }
}

/// Validate the read buffer size
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize, String> {
    if chunk_size == 0 {
        return Err("Chunk size must be greater than 0".to_string());
    }
    Ok(chunk_size)
}

/// Validate that a string fits a native string option buffer
pub fn validate_string_capacity(field: &str, value: &str, capacity: usize) -> Result<(), String> {
    if value.len() > capacity {
        return Err(format!(
            "{} '{}' is {} bytes long, at most {} bytes are supported",
            field,
            value,
            value.len(),
            capacity
        ));
    }
    if value.contains('\0') {
        return Err(format!("{} must not contain NUL characters", field));
    }
    Ok(())
}
