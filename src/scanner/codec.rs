//! Capability / Configuration Codec
//!
//! Translates between the typed [`Capabilities`] / [`Configuration`] records
//! and the device's numbered native options:
//!
//! - geometry travels as 16.16 fixed-point millimetres
//! - resolution is an integer (or fixed-point on some devices, rounded)
//! - `source` and `mode` are null-padded string buffers
//! - word lists carry their entry count in the first element

use crate::backend::{
    Fixed, NativeHandle, OptionConstraint, OptionDescriptor, OptionValue, ScanBackend, ValueKind,
};
use crate::core::validation::validate_string_capacity;
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::options::{OptionIndexMap, OptionKind};
use crate::scanner::types::{Capabilities, Configuration};

/// Millimetres to native fixed-point, rounded to the nearest step.
pub fn fix(value: f64) -> Fixed {
    Fixed::from_f64(value)
}

pub fn unfix(value: Fixed) -> f64 {
    value.to_f64()
}

/// Null-padded buffer of `capacity` bytes holding `value`.
pub fn encode_string(field: &str, value: &str, capacity: usize) -> ScanResult<Vec<u8>> {
    validate_string_capacity(field, value, capacity).map_err(ScanError::precondition)?;
    let mut buffer = value.as_bytes().to_vec();
    buffer.resize(capacity, 0);
    Ok(buffer)
}

/// Text up to the first NUL byte.
pub fn decode_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Entries of a count-prefixed native word list.
pub fn word_list_entries(list: &[i32]) -> &[i32] {
    let Some((count, entries)) = list.split_first() else {
        return &[];
    };
    let count = usize::try_from(*count).unwrap_or(0).min(entries.len());
    &entries[..count]
}

/// Longest list a quantised range is expanded into.
pub const MAX_RANGE_ENTRIES: usize = 1024;

/// Every value a quantised range admits; `[min, max]` when unquantised or
/// when the steps would exceed [`MAX_RANGE_ENTRIES`].
pub fn expand_range(min: i32, max: i32, quant: i32) -> Vec<i32> {
    if max < min {
        return Vec::new();
    }
    let steps = (i64::from(max) - i64::from(min)) / i64::from(quant.max(1));
    if quant <= 0 || steps >= MAX_RANGE_ENTRIES as i64 {
        return if min == max { vec![min] } else { vec![min, max] };
    }
    (0..=steps)
        .map(|step| (i64::from(min) + step * i64::from(quant)) as i32)
        .collect()
}

/// Option access for one open device.
pub struct OptionCodec<'a> {
    backend: &'a mut dyn ScanBackend,
    handle: NativeHandle,
    map: &'a OptionIndexMap,
    device: &'a str,
    string_capacity: usize,
}

impl<'a> OptionCodec<'a> {
    pub fn new(
        backend: &'a mut dyn ScanBackend,
        handle: NativeHandle,
        map: &'a OptionIndexMap,
        device: &'a str,
        string_capacity: usize,
    ) -> Self {
        Self {
            backend,
            handle,
            map,
            device,
            string_capacity,
        }
    }

    /// Read geometry bounds, resolutions, sources and modes.
    pub fn capabilities(&mut self) -> ScanResult<Capabilities> {
        let min_x = self.range_bound(OptionKind::TopLeftX, Bound::Min)?;
        let min_y = self.range_bound(OptionKind::TopLeftY, Bound::Min)?;
        let max_x = self.range_bound(OptionKind::BottomRightX, Bound::Max)?;
        let max_y = self.range_bound(OptionKind::BottomRightY, Bound::Max)?;

        let resolution = self.descriptor(OptionKind::Resolution)?;
        let possible_resolutions_in_dpi = resolutions(&resolution);

        let possible_sources = string_choices(&self.descriptor(OptionKind::Source)?);
        let possible_modes = string_choices(&self.descriptor(OptionKind::Mode)?);

        Ok(Capabilities {
            min_x,
            min_y,
            max_x,
            max_y,
            possible_resolutions_in_dpi,
            possible_sources,
            possible_modes,
        })
    }

    /// Read the current value of every configuration field.
    pub fn configuration(&mut self) -> ScanResult<Configuration> {
        Ok(Configuration {
            from_x: self.read_millimetres(OptionKind::TopLeftX)?,
            from_y: self.read_millimetres(OptionKind::TopLeftY)?,
            to_x: self.read_millimetres(OptionKind::BottomRightX)?,
            to_y: self.read_millimetres(OptionKind::BottomRightY)?,
            resolution_in_dpi: self.read_integer(OptionKind::Resolution)?,
            source: self.read_string(OptionKind::Source)?,
            mode: self.read_string(OptionKind::Mode)?,
        })
    }

    /// Write every configuration field.
    ///
    /// Every value is encoded for its option's declared type before
    /// anything is written, so a bad string or an unreadable descriptor
    /// leaves the device untouched. Writes then go out in a fixed order and
    /// stop at the first failure; fields already written keep their new
    /// values.
    pub fn apply(&mut self, configuration: &Configuration) -> ScanResult<()> {
        let source = encode_string("source", &configuration.source, self.string_capacity)?;
        let mode = encode_string("mode", &configuration.mode, self.string_capacity)?;

        let dpi = f64::from(configuration.resolution_in_dpi);
        let writes = [
            (OptionKind::TopLeftX, configuration.from_x),
            (OptionKind::BottomRightX, configuration.to_x),
            (OptionKind::TopLeftY, configuration.from_y),
            (OptionKind::BottomRightY, configuration.to_y),
            (OptionKind::Resolution, dpi),
        ]
        .into_iter()
        .map(|(kind, value)| {
            self.encode_number(kind, value)
                .map(|encoded| (kind, encoded))
        })
        .chain([
            Ok((OptionKind::Source, OptionValue::Bytes(source))),
            Ok((OptionKind::Mode, OptionValue::Bytes(mode))),
        ])
        .collect::<ScanResult<Vec<_>>>()?;

        for (kind, value) in writes {
            self.write(kind, value)?;
        }
        Ok(())
    }

    /// `value` in the representation the option declares.
    fn encode_number(&mut self, kind: OptionKind, value: f64) -> ScanResult<OptionValue> {
        match self.descriptor(kind)?.kind {
            ValueKind::Fixed => Ok(OptionValue::Fixed(fix(value))),
            ValueKind::Int => Ok(OptionValue::Int(value.round() as i32)),
            other => Err(ScanError::native(
                format!("set option {}", kind.native_name()),
                self.device,
                crate::backend::BackendError::ValueKind {
                    message: format!("cannot store a number in a {:?} option", other),
                },
            )),
        }
    }

    fn descriptor(&mut self, kind: OptionKind) -> ScanResult<OptionDescriptor> {
        let slot = self.map.slot(kind);
        self.backend
            .option_descriptor(self.handle, slot)
            .map_err(|e| ScanError::native("get option descriptor", self.device, e))?
            .ok_or_else(|| ScanError::UnsupportedDevice {
                device: self.device.to_string(),
                missing: vec![kind.native_name().to_string()],
            })
    }

    fn range_bound(&mut self, kind: OptionKind, bound: Bound) -> ScanResult<f64> {
        let descriptor = self.descriptor(kind)?;
        let OptionConstraint::Range { min, max, .. } = descriptor.constraint else {
            return Err(ScanError::UnsupportedDevice {
                device: self.device.to_string(),
                missing: vec![format!("{} range", kind.native_name())],
            });
        };
        let word = match bound {
            Bound::Min => min,
            Bound::Max => max,
        };
        Ok(match descriptor.kind {
            ValueKind::Fixed => unfix(Fixed::from_raw(word)),
            _ => f64::from(word),
        })
    }

    fn read(&mut self, kind: OptionKind) -> ScanResult<OptionValue> {
        self.backend
            .read_option(self.handle, self.map.slot(kind))
            .map_err(|e| ScanError::native(format!("get option {}", kind.native_name()), self.device, e))
    }

    fn read_millimetres(&mut self, kind: OptionKind) -> ScanResult<f64> {
        match self.read(kind)? {
            OptionValue::Fixed(value) => Ok(unfix(value)),
            OptionValue::Int(value) => Ok(f64::from(value)),
            OptionValue::Bytes(_) => Err(self.unexpected_value(kind, "a number")),
        }
    }

    fn read_integer(&mut self, kind: OptionKind) -> ScanResult<i32> {
        match self.read(kind)? {
            OptionValue::Int(value) => Ok(value),
            OptionValue::Fixed(value) => Ok(unfix(value).round() as i32),
            OptionValue::Bytes(_) => Err(self.unexpected_value(kind, "a number")),
        }
    }

    fn read_string(&mut self, kind: OptionKind) -> ScanResult<String> {
        match self.read(kind)? {
            OptionValue::Bytes(bytes) => Ok(decode_string(&bytes)),
            _ => Err(self.unexpected_value(kind, "a string")),
        }
    }

    fn unexpected_value(&self, kind: OptionKind, expected: &str) -> ScanError {
        ScanError::native(
            format!("get option {}", kind.native_name()),
            self.device,
            crate::backend::BackendError::ValueKind {
                message: format!("expected {}", expected),
            },
        )
    }

    fn write(&mut self, kind: OptionKind, value: OptionValue) -> ScanResult<()> {
        log::trace!("Setting '{}' on '{}' to {:?}", kind.native_name(), self.device, value);
        self.backend
            .write_option(self.handle, self.map.slot(kind), &value)
            .map_err(|e| ScanError::native(format!("set option {}", kind.native_name()), self.device, e))
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
}

fn resolutions(descriptor: &OptionDescriptor) -> Vec<i32> {
    let words = match &descriptor.constraint {
        OptionConstraint::WordList(list) => word_list_entries(list).to_vec(),
        OptionConstraint::Range { min, max, quant } => expand_range(*min, *max, *quant),
        _ => Vec::new(),
    };
    match descriptor.kind {
        ValueKind::Fixed => words
            .into_iter()
            .map(|word| unfix(Fixed::from_raw(word)).round() as i32)
            .collect(),
        _ => words,
    }
}

fn string_choices(descriptor: &OptionDescriptor) -> Vec<String> {
    match &descriptor.constraint {
        OptionConstraint::StringList(choices) => choices.clone(),
        _ => Vec::new(),
    }
}
