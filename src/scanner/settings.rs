//! Scanner tuning knobs

use crate::core::validation::validate_chunk_size;
use crate::scanner::error::{ScanError, ScanResult};

/// Size of the scratch buffer each native read fills (8 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Capacity of the buffers string options are written through.
pub const DEFAULT_STRING_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub chunk_size: usize,
    pub string_capacity: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            string_capacity: DEFAULT_STRING_CAPACITY,
        }
    }
}

impl ScanSettings {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> ScanResult<()> {
        validate_chunk_size(self.chunk_size).map_err(ScanError::invalid_argument)?;
        if self.string_capacity == 0 {
            return Err(ScanError::invalid_argument(
                "string capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}
