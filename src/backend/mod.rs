//! Native Capture Backends
//!
//! Abstraction over the native scanner library. The scanner core talks to
//! hardware exclusively through [`ScanBackend`], which keeps the session,
//! option mapping and acquisition logic testable against [`MemoryBackend`].
//!
//! ## Adapters
//!
//! - **MemoryBackend**: in-process simulated devices, scripted frames and
//!   call accounting for tests
//! - **SaneBackend** (feature `sane`): libsane through its C API

pub mod error;
pub mod memory;
#[cfg(feature = "sane")]
pub mod sane;
pub mod traits;
pub mod types;

pub use error::{BackendError, BackendResult, Status};
pub use memory::{MemoryBackend, MemoryDevice, MemoryStats};
#[cfg(feature = "sane")]
pub use sane::SaneBackend;
pub use traits::ScanBackend;
pub use types::{
    Fixed, FrameFormat, FrameParameters, NativeDevice, NativeHandle, OptionConstraint,
    OptionDescriptor, OptionValue, ValueKind,
};
