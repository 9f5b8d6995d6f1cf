//! Scan Service
//!
//! Façade tying the backend, the device sessions, the option cache and the
//! scan driver together. One service owns one initialised backend for its
//! whole life.
//!
//! ## Lifecycle
//!
//! - construction initialises the backend (failure means no service)
//! - every operation runs in the `Ready` state
//! - [`ScanService::shutdown`] (or drop) closes all devices and shuts the
//!   backend down exactly once
//!
//! All operations taking an optional device fall back to the first
//! enumerated device when given `None`.

use std::path::Path;
use std::sync::Arc;

use crate::backend::{NativeHandle, ScanBackend};
use crate::scanner::codec::OptionCodec;
use crate::scanner::driver::ScanDriver;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::options::{OptionIndexCache, OptionIndexMap};
use crate::scanner::output::{ImageSink, PngSink};
use crate::scanner::session::SessionManager;
use crate::scanner::settings::ScanSettings;
use crate::scanner::types::{
    Capabilities, Configuration, ConfigurationPatch, DeviceDescriptor, RawImage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Ready,
    Shutdown,
}

pub struct ScanService {
    backend: Box<dyn ScanBackend>,
    sessions: SessionManager,
    options: OptionIndexCache,
    devices: Option<Vec<DeviceDescriptor>>,
    settings: ScanSettings,
    sink: Box<dyn ImageSink>,
    state: ServiceState,
}

impl std::fmt::Debug for ScanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanService")
            .field("backend", &self.backend.name())
            .field("sessions", &self.sessions)
            .field("devices", &self.devices)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}

impl ScanService {
    /// Initialise `backend` and wrap it with default settings.
    pub fn new(backend: impl ScanBackend + 'static) -> ScanResult<Self> {
        Self::with_settings(backend, ScanSettings::default())
    }

    pub fn with_settings(
        backend: impl ScanBackend + 'static,
        settings: ScanSettings,
    ) -> ScanResult<Self> {
        Self::from_boxed(Box::new(backend), settings)
    }

    /// Initialise an already boxed backend (chosen at run time).
    pub fn from_boxed(mut backend: Box<dyn ScanBackend>, settings: ScanSettings) -> ScanResult<Self> {
        settings.validate()?;
        log::debug!("Initialising '{}' scanner backend", backend.name());
        backend.init().map_err(|source| {
            log::error!(
                "Could not initialise '{}' scanner backend: {}",
                backend.name(),
                source
            );
            ScanError::BackendInit {
                backend: backend.name().to_string(),
                source,
            }
        })?;
        log::info!("Scanner backend '{}' ready", backend.name());

        Ok(Self {
            backend,
            sessions: SessionManager::new(),
            options: OptionIndexCache::new(),
            devices: None,
            settings,
            sink: Box::new(PngSink),
            state: ServiceState::Ready,
        })
    }

    /// Replace the PNG writer used by [`ScanService::scan_to_file`].
    pub fn with_sink(mut self, sink: impl ImageSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Descriptors of the devices opened so far, oldest first.
    pub fn opened_devices(&self) -> &[String] {
        self.sessions.opened()
    }

    /// Enumerated devices. The backend is queried on the first call only.
    pub fn list_devices(&mut self) -> ScanResult<&[DeviceDescriptor]> {
        if self.devices.is_none() {
            self.load_devices()?;
        }
        Ok(self.devices.as_deref().unwrap_or_default())
    }

    /// Query the backend again, replacing the cached device list.
    ///
    /// Open sessions and cached option maps are kept; they are keyed by
    /// descriptor, so a device that is still attached reuses them.
    pub fn reload_devices(&mut self) -> ScanResult<&[DeviceDescriptor]> {
        self.load_devices()?;
        Ok(self.devices.as_deref().unwrap_or_default())
    }

    fn load_devices(&mut self) -> ScanResult<()> {
        let native = self
            .backend
            .list_devices()
            .map_err(|e| ScanError::native("get devices", self.backend.name(), e))?;
        let devices: Vec<DeviceDescriptor> =
            native.iter().map(DeviceDescriptor::from_native).collect();
        log::info!("Found {} scanner device(s)", devices.len());
        for device in &devices {
            log::debug!("Found device '{}'", device);
        }
        self.devices = Some(devices);
        Ok(())
    }

    /// The given device, or the first enumerated one.
    pub fn resolve_device(&mut self, device: Option<&DeviceDescriptor>) -> ScanResult<DeviceDescriptor> {
        if let Some(device) = device {
            return Ok(device.clone());
        }
        self.list_devices()?
            .first()
            .cloned()
            .ok_or(ScanError::NoDeviceAvailable)
    }

    /// Enumerated device called `name`.
    ///
    /// `name` is matched against the descriptor strings first, then against
    /// the backend's device identifiers.
    pub fn find_device(&mut self, name: &str) -> ScanResult<DeviceDescriptor> {
        let devices = self.list_devices()?;
        devices
            .iter()
            .find(|device| device.descriptor() == name)
            .or_else(|| devices.iter().find(|device| device.native_name() == name))
            .cloned()
            .ok_or_else(|| ScanError::DeviceNotFound {
                name: name.to_string(),
            })
    }

    /// Option slot map of a device, discovered on first use.
    pub fn option_map(&mut self, device: Option<&DeviceDescriptor>) -> ScanResult<Arc<OptionIndexMap>> {
        let device = self.resolve_device(device)?;
        self.prepare(&device).map(|(map, _)| map)
    }

    pub fn get_capabilities(&mut self, device: Option<&DeviceDescriptor>) -> ScanResult<Capabilities> {
        let device = self.resolve_device(device)?;
        let (map, handle) = self.prepare(&device)?;
        OptionCodec::new(
            self.backend.as_mut(),
            handle,
            &map,
            device.descriptor(),
            self.settings.string_capacity,
        )
        .capabilities()
    }

    pub fn get_configuration(
        &mut self,
        device: Option<&DeviceDescriptor>,
    ) -> ScanResult<Configuration> {
        let device = self.resolve_device(device)?;
        let (map, handle) = self.prepare(&device)?;
        OptionCodec::new(
            self.backend.as_mut(),
            handle,
            &map,
            device.descriptor(),
            self.settings.string_capacity,
        )
        .configuration()
    }

    pub fn set_configuration(
        &mut self,
        device: Option<&DeviceDescriptor>,
        configuration: &Configuration,
    ) -> ScanResult<()> {
        let device = self.resolve_device(device)?;
        let (map, handle) = self.prepare(&device)?;
        log::info!("Applying configuration to '{}'", device);
        OptionCodec::new(
            self.backend.as_mut(),
            handle,
            &map,
            device.descriptor(),
            self.settings.string_capacity,
        )
        .apply(configuration)
    }

    /// Read the current configuration, merge `patch` over it and write it
    /// back. Returns the configuration that was written.
    pub fn update_configuration(
        &mut self,
        device: Option<&DeviceDescriptor>,
        patch: &ConfigurationPatch,
    ) -> ScanResult<Configuration> {
        let device = self.resolve_device(device)?;
        let current = self.get_configuration(Some(&device))?;
        let merged = patch.apply(&current);
        self.set_configuration(Some(&device), &merged)?;
        Ok(merged)
    }

    /// Acquire one image with the device's current configuration.
    pub fn scan_to_buffer(&mut self, device: Option<&DeviceDescriptor>) -> ScanResult<Option<RawImage>> {
        let device = self.resolve_device(device)?;
        let (_, handle) = self.prepare(&device)?;
        ScanDriver::new(
            self.backend.as_mut(),
            handle,
            device.descriptor(),
            self.settings.chunk_size,
        )
        .scan()
    }

    /// Acquire one image and write it to `path`.
    ///
    /// Returns `false`, without creating a file, when the device delivered
    /// no data.
    pub fn scan_to_file(&mut self, device: Option<&DeviceDescriptor>, path: &Path) -> ScanResult<bool> {
        match self.scan_to_buffer(device)? {
            Some(image) => {
                self.sink.write(&image, path)?;
                Ok(true)
            }
            None => {
                log::warn!("Nothing scanned, '{}' not written", path.display());
                Ok(false)
            }
        }
    }

    /// Close every device and shut the backend down.
    pub fn shutdown(mut self) -> ScanResult<()> {
        self.finish()
    }

    /// Make sure the device is open and its option map is known.
    fn prepare(
        &mut self,
        device: &DeviceDescriptor,
    ) -> ScanResult<(Arc<OptionIndexMap>, NativeHandle)> {
        let map = self
            .options
            .resolve(self.backend.as_mut(), &mut self.sessions, device)?;
        let handle = self.sessions.open(self.backend.as_mut(), device)?;
        Ok((map, handle))
    }

    fn finish(&mut self) -> ScanResult<()> {
        if self.state == ServiceState::Shutdown {
            return Ok(());
        }
        self.state = ServiceState::Shutdown;
        log::debug!("Closing {} scanner device(s)", self.sessions.len());
        self.sessions.close_all(self.backend.as_mut());
        self.backend
            .shutdown()
            .map_err(|e| ScanError::native("exit", self.backend.name(), e))?;
        log::info!("Scanner backend '{}' shut down", self.backend.name());
        Ok(())
    }
}

impl Drop for ScanService {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("Scanner shutdown failed: {}", e);
        }
    }
}
