//! Host-facing operations
//!
//! The name-based surface a calling environment (script binding, command
//! line) uses. Devices are addressed by name; `None` means the first
//! enumerated device. Names that match nothing fail with
//! [`ScanError::DeviceNotFound`] instead of falling back.

use std::path::Path;

use crate::scanner::{
    Capabilities, Configuration, ConfigurationPatch, DeviceDescriptor, RawImage, ScanError,
    ScanResult, ScanService,
};

#[derive(Debug)]
pub struct ScannerHost {
    service: ScanService,
}

impl ScannerHost {
    pub fn new(service: ScanService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ScanService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut ScanService {
        &mut self.service
    }

    /// Descriptor strings of all enumerated devices, in enumeration order.
    pub fn get_scanners(&mut self) -> ScanResult<Vec<String>> {
        Ok(self
            .service
            .list_devices()?
            .iter()
            .map(|device| device.descriptor().to_string())
            .collect())
    }

    fn device(&mut self, name: Option<&str>) -> ScanResult<Option<DeviceDescriptor>> {
        name.map(|name| self.service.find_device(name)).transpose()
    }

    pub fn get_capabilities(&mut self, name: Option<&str>) -> ScanResult<Capabilities> {
        let device = self.device(name)?;
        self.service.get_capabilities(device.as_ref())
    }

    pub fn get_configuration(&mut self, name: Option<&str>) -> ScanResult<Configuration> {
        let device = self.device(name)?;
        self.service.get_configuration(device.as_ref())
    }

    /// Merge the fields present in `patch` onto the device's current
    /// configuration; absent fields are left untouched.
    pub fn set_configuration(
        &mut self,
        name: Option<&str>,
        patch: &ConfigurationPatch,
    ) -> ScanResult<Configuration> {
        let device = self.device(name)?;
        self.service.update_configuration(device.as_ref(), patch)
    }

    /// [`ScannerHost::set_configuration`] with the patch given as a JSON object.
    pub fn set_configuration_value(
        &mut self,
        name: Option<&str>,
        value: &serde_json::Value,
    ) -> ScanResult<Configuration> {
        if !value.is_object() {
            return Err(ScanError::invalid_argument(
                "Expecting: setConfiguration(deviceName:string, configuration:object)",
            ));
        }
        let patch: ConfigurationPatch = serde_json::from_value(value.clone())
            .map_err(|e| ScanError::invalid_argument(format!("Invalid configuration: {}", e)))?;
        self.set_configuration(name, &patch)
    }

    pub fn scan_to_file(&mut self, name: Option<&str>, path: &Path) -> ScanResult<bool> {
        let device = self.device(name)?;
        self.service.scan_to_file(device.as_ref(), path)
    }

    pub fn scan_to_buffer(&mut self, name: Option<&str>) -> ScanResult<Option<RawImage>> {
        let device = self.device(name)?;
        self.service.scan_to_buffer(device.as_ref())
    }

    /// Close all devices and shut the backend down.
    pub fn shutdown(self) -> ScanResult<()> {
        self.service.shutdown()
    }
}
