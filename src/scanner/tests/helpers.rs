//! Test helper functions for scanner unit tests
//!
//! These helpers are separate from integration test helpers in tests/common/
//! since unit tests and integration tests run in different contexts.

use std::sync::Arc;

use crate::backend::{
    FrameParameters, MemoryBackend, MemoryDevice, NativeHandle, OptionValue, ScanBackend,
};
use crate::scanner::options::{OptionIndexCache, OptionIndexMap};
use crate::scanner::service::ScanService;
use crate::scanner::session::SessionManager;
use crate::scanner::types::DeviceDescriptor;

pub const FLATBED: &str = "memory:flatbed0";
pub const FLATBED_DESCRIPTOR: &str = "memory:flatbed0 (Carbonpaper / Virtual Flatbed)";

/// Uninitialised backend with one simulated flatbed.
pub fn flatbed_backend() -> MemoryBackend {
    MemoryBackend::new().with_device(MemoryDevice::flatbed(FLATBED))
}

/// Service over a clone of `backend`; the caller keeps `backend` to inspect.
pub fn service_over(backend: &MemoryBackend) -> ScanService {
    ScanService::new(backend.clone()).expect("memory backend initialises")
}

pub fn descriptor_of(device: &MemoryDevice) -> DeviceDescriptor {
    // Same format the service derives from enumeration.
    let mut backend = MemoryBackend::new().with_device(device.clone());
    backend.init().unwrap();
    let native = backend.list_devices().unwrap();
    DeviceDescriptor::from_native(&native[0])
}

pub fn flatbed_descriptor() -> DeviceDescriptor {
    DeviceDescriptor::new(FLATBED_DESCRIPTOR, FLATBED)
}

/// Initialised backend with the flatbed opened and its option map resolved.
pub struct OpenedFlatbed {
    pub backend: MemoryBackend,
    pub sessions: SessionManager,
    pub cache: OptionIndexCache,
    pub handle: NativeHandle,
    pub map: Arc<OptionIndexMap>,
}

pub fn opened_flatbed() -> OpenedFlatbed {
    opened_device(MemoryDevice::flatbed(FLATBED))
}

pub fn opened_device(device: MemoryDevice) -> OpenedFlatbed {
    let descriptor = descriptor_of(&device);
    let mut backend = MemoryBackend::new().with_device(device);
    backend.init().unwrap();
    let mut sessions = SessionManager::new();
    let mut cache = OptionIndexCache::new();
    let map = cache.resolve(&mut backend, &mut sessions, &descriptor).unwrap();
    let handle = sessions.handle(descriptor.descriptor()).unwrap();
    OpenedFlatbed {
        backend,
        sessions,
        cache,
        handle,
        map,
    }
}

/// Flatbed whose acquisitions return `chunks` for the fixed `frame`.
pub fn scripted_flatbed(name: &str, frame: FrameParameters, chunks: Vec<Vec<u8>>) -> MemoryDevice {
    MemoryDevice::flatbed(name).with_frame(frame, chunks)
}

pub fn string_value(value: &str) -> OptionValue {
    let mut bytes = value.as_bytes().to_vec();
    bytes.resize(128, 0);
    OptionValue::Bytes(bytes)
}
