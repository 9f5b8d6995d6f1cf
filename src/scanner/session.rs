//! Device Session Manager
//!
//! At most one native handle per device descriptor. Handles stay open until
//! [`SessionManager::close_all`] runs at shutdown.

use std::collections::HashMap;

use crate::backend::{NativeHandle, ScanBackend};
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::types::DeviceDescriptor;

#[derive(Debug, Default)]
pub struct SessionManager {
    handles: HashMap<String, NativeHandle>,
    /// Descriptors in the order they were opened
    opened: Vec<String>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `device`, opening it on first use.
    ///
    /// Repeated calls for an open device return the same handle without a
    /// native call. A failed open records nothing.
    pub fn open(
        &mut self,
        backend: &mut dyn ScanBackend,
        device: &DeviceDescriptor,
    ) -> ScanResult<NativeHandle> {
        if let Some(handle) = self.handles.get(device.descriptor()) {
            return Ok(*handle);
        }

        log::debug!("Opening device '{}'", device);
        let handle = backend
            .open(device.native_name())
            .map_err(|e| ScanError::native("open", device.descriptor(), e))?;

        self.handles.insert(device.descriptor().to_string(), handle);
        self.opened.push(device.descriptor().to_string());
        log::info!("Opened device '{}'", device);
        Ok(handle)
    }

    pub fn handle(&self, descriptor: &str) -> Option<NativeHandle> {
        self.handles.get(descriptor).copied()
    }

    pub fn is_open(&self, descriptor: &str) -> bool {
        self.handles.contains_key(descriptor)
    }

    /// Open descriptors, oldest first.
    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    pub fn len(&self) -> usize {
        self.opened.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opened.is_empty()
    }

    /// Close every open handle and forget it.
    pub fn close_all(&mut self, backend: &mut dyn ScanBackend) {
        for descriptor in self.opened.drain(..) {
            if let Some(handle) = self.handles.remove(&descriptor) {
                log::debug!("Closing device '{}'", descriptor);
                backend.close(handle);
            }
        }
    }
}
