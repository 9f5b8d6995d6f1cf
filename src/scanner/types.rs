//! Scanner Types
//!
//! Typed records exchanged with callers. Serialised field names follow the
//! host-facing record layout (`fromX`, `resolutionInDPI`, ...).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::backend::NativeDevice;

/// An enumerated device.
///
/// Identity is the descriptor string `"{name} ({vendor} / {model})"`; the
/// native name is kept alongside it for opening the device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDescriptor {
    descriptor: String,
    #[serde(skip)]
    native_name: String,
}

impl DeviceDescriptor {
    pub fn new(descriptor: impl Into<String>, native_name: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            native_name: native_name.into(),
        }
    }

    /// Build the descriptor of a device as reported by the backend.
    pub fn from_native(device: &NativeDevice) -> Self {
        Self::new(
            format!("{} ({} / {})", device.name, device.vendor, device.model),
            device.name.clone(),
        )
    }

    /// Descriptor string; the device's identity and cache key.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Identifier the backend opens the device with.
    pub fn native_name(&self) -> &str {
        &self.native_name
    }
}

impl PartialEq for DeviceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl Eq for DeviceDescriptor {}

impl Hash for DeviceDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// What a device supports. Geometry is in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    #[serde(rename = "possibleResolutionsInDPI")]
    pub possible_resolutions_in_dpi: Vec<i32>,
    pub possible_sources: Vec<String>,
    pub possible_modes: Vec<String>,
}

/// Current (or desired) settings of a device. Geometry is in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub from_x: f64,
    pub from_y: f64,
    pub to_x: f64,
    pub to_y: f64,
    #[serde(rename = "resolutionInDPI")]
    pub resolution_in_dpi: i32,
    pub source: String,
    pub mode: String,
}

/// A partial configuration; absent fields keep the device's current value.
///
/// Unknown keys are ignored when deserialising.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_y: Option<f64>,
    #[serde(rename = "resolutionInDPI", skip_serializing_if = "Option::is_none")]
    pub resolution_in_dpi: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ConfigurationPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields over `base`.
    pub fn apply(&self, base: &Configuration) -> Configuration {
        Configuration {
            from_x: self.from_x.unwrap_or(base.from_x),
            from_y: self.from_y.unwrap_or(base.from_y),
            to_x: self.to_x.unwrap_or(base.to_x),
            to_y: self.to_y.unwrap_or(base.to_y),
            resolution_in_dpi: self.resolution_in_dpi.unwrap_or(base.resolution_in_dpi),
            source: self.source.clone().unwrap_or_else(|| base.source.clone()),
            mode: self.mode.clone().unwrap_or_else(|| base.mode.clone()),
        }
    }
}

/// An acquired image, row-major, `bytes_per_pixel` interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Zero-filled image, `None` if the pixel buffer size overflows.
    pub fn blank(width: u32, height: u32, bytes_per_pixel: u32) -> Option<Self> {
        let length = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(bytes_per_pixel as usize)?;
        Some(Self {
            width,
            height,
            bytes_per_pixel,
            pixels: vec![0; length],
        })
    }

    /// Channel bytes of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.bytes_per_pixel as usize;
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        self.pixels.get(offset..offset + bpp)
    }
}
