//! Scanner API
//!
//! Public surface of the scanner core. Callers outside `scanner` import from
//! here rather than from the individual modules.

// Service façade
pub use crate::scanner::service::{ScanService, ServiceState};
pub use crate::scanner::settings::{ScanSettings, DEFAULT_CHUNK_SIZE, DEFAULT_STRING_CAPACITY};

// Error handling
pub use crate::scanner::error::{ScanError, ScanResult};

// Records exchanged with callers
pub use crate::scanner::types::{
    Capabilities, Configuration, ConfigurationPatch, DeviceDescriptor, RawImage,
};

// Image output
pub use crate::scanner::output::{ImageSink, PngSink};
