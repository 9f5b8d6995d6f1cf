//! Option Index Cache
//!
//! Native options are numbered and the numbering differs between devices.
//! The cache discovers, once per device, which slot holds each of the
//! options the scanner core reads and writes.

use std::collections::HashMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::backend::ScanBackend;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::session::SessionManager;
use crate::scanner::types::DeviceDescriptor;

/// Number of options every supported device must expose.
pub const REQUIRED_OPTIONS: usize = 7;

/// The options the scanner core depends on, by their native names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, IntoStaticStr,
)]
pub enum OptionKind {
    #[strum(serialize = "tl-x")]
    TopLeftX,
    #[strum(serialize = "tl-y")]
    TopLeftY,
    #[strum(serialize = "br-x")]
    BottomRightX,
    #[strum(serialize = "br-y")]
    BottomRightY,
    #[strum(serialize = "resolution")]
    Resolution,
    #[strum(serialize = "source")]
    Source,
    #[strum(serialize = "mode")]
    Mode,
}

impl OptionKind {
    pub fn native_name(self) -> &'static str {
        self.into()
    }
}

/// Slot index of each required option on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionIndexMap {
    slots: [usize; REQUIRED_OPTIONS],
}

impl OptionIndexMap {
    /// Project `(slot, name)` pairs onto the required options.
    ///
    /// Unnamed slots and unknown names are ignored. When a name repeats the
    /// last slot wins. Fails listing every required option that never
    /// appeared.
    pub fn discover<'a, I>(device: &str, names: I) -> ScanResult<Self>
    where
        I: IntoIterator<Item = (usize, Option<&'a str>)>,
    {
        let mut found: [Option<usize>; REQUIRED_OPTIONS] = [None; REQUIRED_OPTIONS];
        for (slot, name) in names {
            if let Some(kind) = name.and_then(|name| name.parse::<OptionKind>().ok()) {
                found[kind as usize] = Some(slot);
            }
        }

        let missing: Vec<String> = OptionKind::iter()
            .filter(|kind| found[*kind as usize].is_none())
            .map(|kind| kind.native_name().to_string())
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "Device '{}' lacks required options: {}",
                device,
                missing.join(", ")
            );
            return Err(ScanError::UnsupportedDevice {
                device: device.to_string(),
                missing,
            });
        }

        let mut slots = [0; REQUIRED_OPTIONS];
        for kind in OptionKind::iter() {
            slots[kind as usize] = found[kind as usize].unwrap_or_default();
        }
        Ok(Self { slots })
    }

    pub fn slot(&self, kind: OptionKind) -> usize {
        self.slots[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKind, usize)> + '_ {
        OptionKind::iter().map(move |kind| (kind, self.slot(kind)))
    }
}

/// Memoised option maps, keyed by device descriptor.
///
/// Only complete maps are stored; a device that failed discovery is
/// probed again on the next request.
#[derive(Debug, Default)]
pub struct OptionIndexCache {
    maps: HashMap<String, Arc<OptionIndexMap>>,
}

impl OptionIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for `device`, opening it and scanning its option slots on first use.
    pub fn resolve(
        &mut self,
        backend: &mut dyn ScanBackend,
        sessions: &mut SessionManager,
        device: &DeviceDescriptor,
    ) -> ScanResult<Arc<OptionIndexMap>> {
        if let Some(map) = self.maps.get(device.descriptor()) {
            return Ok(Arc::clone(map));
        }

        let handle = sessions.open(backend, device)?;
        let count = backend
            .option_count(handle)
            .map_err(|e| ScanError::native("get option count", device.descriptor(), e))?;

        let mut names = Vec::with_capacity(count);
        for slot in 0..count {
            let descriptor = backend
                .option_descriptor(handle, slot)
                .map_err(|e| ScanError::native("get option descriptor", device.descriptor(), e))?;
            names.push((slot, descriptor.and_then(|descriptor| descriptor.name)));
        }

        let map = Arc::new(OptionIndexMap::discover(
            device.descriptor(),
            names.iter().map(|(slot, name)| (*slot, name.as_deref())),
        )?);
        log::debug!("Option slots for '{}': {:?}", device, map);
        self.maps.insert(device.descriptor().to_string(), Arc::clone(&map));
        Ok(map)
    }

    pub fn get(&self, descriptor: &str) -> Option<Arc<OptionIndexMap>> {
        self.maps.get(descriptor).cloned()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
