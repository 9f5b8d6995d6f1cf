//! In-memory capture backend
//!
//! Simulated devices with a realistic, heterogeneous option layout. Used by
//! the test suites and by the command line front end when no hardware is
//! available. Clones share state, so a test can keep one clone for
//! inspection while the service owns another.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::error::{BackendError, BackendResult, Status};
use crate::backend::traits::ScanBackend;
use crate::backend::types::{
    Fixed, FrameFormat, FrameParameters, NativeDevice, NativeHandle, OptionConstraint,
    OptionDescriptor, OptionValue, ValueKind,
};

/// Buffer size of the simulated string options.
const STRING_OPTION_SIZE: usize = 128;

const MM_PER_INCH: f64 = 25.4;

/// Call accounting for a [`MemoryBackend`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub init_calls: usize,
    pub shutdown_calls: usize,
    pub list_calls: usize,
    pub open_calls: usize,
    pub close_calls: usize,
    pub option_count_calls: usize,
    pub write_calls: usize,
    pub start_calls: usize,
    pub read_calls: usize,
    pub cancel_calls: usize,
}

#[derive(Debug, Clone)]
struct MemoryOption {
    descriptor: OptionDescriptor,
    value: Option<OptionValue>,
}

#[derive(Debug, Clone)]
enum ImageSource {
    /// Fixed frame parameters and the exact chunks each read returns
    Scripted {
        frame: FrameParameters,
        chunks: Vec<Vec<u8>>,
        trailing: Status,
    },
    /// Test pattern sized from the geometry, resolution and mode options
    Pattern,
}

/// A simulated device and its option table.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    info: NativeDevice,
    options: Vec<MemoryOption>,
    source: ImageSource,
    fail_open: Option<Status>,
    fail_start: Option<Status>,
    fail_write: Option<(String, Status)>,
}

fn padded(value: &str, size: usize) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    bytes.resize(size.max(bytes.len()), 0);
    bytes
}

fn unpadded(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl MemoryDevice {
    /// A device exposing only the leading option-count slot.
    pub fn new(name: &str, vendor: &str, model: &str) -> Self {
        Self {
            info: NativeDevice::new(name, vendor, model),
            options: Vec::new(),
            source: ImageSource::Pattern,
            fail_open: None,
            fail_start: None,
            fail_write: None,
        }
    }

    /// A letter/A4 flatbed with feeder, four resolutions and two modes.
    ///
    /// Option slots are interleaved with group separators and options the
    /// scanner core ignores, the way real drivers lay them out.
    pub fn flatbed(name: &str) -> Self {
        let resolutions = vec![4, 75, 150, 300, 600];
        Self::new(name, "Carbonpaper", "Virtual Flatbed")
            .with_option(
                OptionDescriptor::new(None, ValueKind::Group, 0, OptionConstraint::None),
                None,
            )
            .with_option(
                OptionDescriptor::new(
                    Some("mode"),
                    ValueKind::String,
                    STRING_OPTION_SIZE,
                    OptionConstraint::StringList(vec!["Color".to_string(), "Gray".to_string()]),
                ),
                Some(OptionValue::Bytes(padded("Color", STRING_OPTION_SIZE))),
            )
            .with_option(
                OptionDescriptor::new(
                    Some("source"),
                    ValueKind::String,
                    STRING_OPTION_SIZE,
                    OptionConstraint::StringList(vec!["Flatbed".to_string(), "ADF".to_string()]),
                ),
                Some(OptionValue::Bytes(padded("Flatbed", STRING_OPTION_SIZE))),
            )
            .with_option(
                OptionDescriptor::new(
                    Some("resolution"),
                    ValueKind::Int,
                    4,
                    OptionConstraint::WordList(resolutions),
                ),
                Some(OptionValue::Int(150)),
            )
            .with_option(
                OptionDescriptor::new(Some("preview"), ValueKind::Bool, 4, OptionConstraint::None),
                Some(OptionValue::Int(0)),
            )
            .with_option(
                OptionDescriptor::new(None, ValueKind::Group, 0, OptionConstraint::None),
                None,
            )
            .with_geometry_option("tl-x", 215.9, 0.0)
            .with_geometry_option("tl-y", 297.0, 0.0)
            .with_geometry_option("br-x", 215.9, 215.9)
            .with_geometry_option("br-y", 297.0, 297.0)
    }

    fn with_geometry_option(self, name: &str, max_mm: f64, value_mm: f64) -> Self {
        self.with_option(
            OptionDescriptor::new(
                Some(name),
                ValueKind::Fixed,
                4,
                OptionConstraint::Range {
                    min: 0,
                    max: Fixed::from_f64(max_mm).raw(),
                    quant: 0,
                },
            ),
            Some(OptionValue::Fixed(Fixed::from_f64(value_mm))),
        )
    }

    /// Append an option slot.
    pub fn with_option(mut self, descriptor: OptionDescriptor, value: Option<OptionValue>) -> Self {
        self.options.push(MemoryOption { descriptor, value });
        self
    }

    /// Remove every slot carrying `name`; later slots move down.
    pub fn without_option(mut self, name: &str) -> Self {
        self.options
            .retain(|option| option.descriptor.name.as_deref() != Some(name));
        self
    }

    /// Replace the test pattern with fixed frame parameters and chunks.
    pub fn with_frame(mut self, frame: FrameParameters, chunks: Vec<Vec<u8>>) -> Self {
        self.source = ImageSource::Scripted {
            frame,
            chunks,
            trailing: Status::Eof,
        };
        self
    }

    /// Status returned once the scripted chunks are exhausted (default EOF).
    pub fn with_read_status(mut self, status: Status) -> Self {
        if let ImageSource::Scripted { trailing, .. } = &mut self.source {
            *trailing = status;
        }
        self
    }

    pub fn failing_open(mut self, status: Status) -> Self {
        self.fail_open = Some(status);
        self
    }

    pub fn failing_start(mut self, status: Status) -> Self {
        self.fail_start = Some(status);
        self
    }

    /// Reject writes to the named option with `status`.
    pub fn failing_write(mut self, option_name: &str, status: Status) -> Self {
        self.fail_write = Some((option_name.to_string(), status));
        self
    }

    fn find(&self, name: &str) -> Option<&MemoryOption> {
        self.options
            .iter()
            .find(|option| option.descriptor.name.as_deref() == Some(name))
    }

    fn geometry_mm(&self, name: &str) -> Option<f64> {
        match self.find(name)?.value.as_ref()? {
            OptionValue::Fixed(value) => Some(value.to_f64()),
            OptionValue::Int(value) => Some(f64::from(*value)),
            OptionValue::Bytes(_) => None,
        }
    }

    fn int_value(&self, name: &str) -> Option<i32> {
        match self.find(name)?.value.as_ref()? {
            OptionValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    fn string_value(&self, name: &str) -> Option<String> {
        match self.find(name)?.value.as_ref()? {
            OptionValue::Bytes(bytes) => Some(unpadded(bytes)),
            _ => None,
        }
    }

    fn pattern_frame(&self) -> FrameParameters {
        let dpi = f64::from(self.int_value("resolution").unwrap_or(75));
        let extent = |from: &str, to: &str| {
            let span = self.geometry_mm(to).unwrap_or(0.0) - self.geometry_mm(from).unwrap_or(0.0);
            (span.max(0.0) / MM_PER_INCH * dpi).round() as i32
        };
        let width = extent("tl-x", "br-x");
        let height = extent("tl-y", "br-y");
        match self.string_value("mode").as_deref() {
            Some("Gray") => FrameParameters::gray(width, height),
            _ => FrameParameters::rgb(width, height),
        }
    }

    fn pattern_bytes(frame: &FrameParameters) -> Vec<u8> {
        let width = frame.pixels_per_line.max(0) as usize;
        let height = frame.lines.max(0) as usize;
        let channels = if frame.format == FrameFormat::Gray { 1 } else { 3 };
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                if channels == 1 {
                    data.push(r / 2 + g / 2);
                } else {
                    data.extend_from_slice(&[r, g, 255 - r / 2 - g / 2]);
                }
            }
        }
        data
    }
}

#[derive(Debug)]
struct Acquisition {
    frame: FrameParameters,
    pending: VecDeque<Vec<u8>>,
    trailing: Status,
}

#[derive(Debug, Default)]
struct MemoryState {
    devices: Vec<MemoryDevice>,
    init_error: Option<Status>,
    shutdown_error: Option<Status>,
    initialised: bool,
    handles: HashMap<u64, usize>,
    next_handle: u64,
    acquisitions: HashMap<u64, Acquisition>,
    stats: MemoryStats,
}

impl MemoryState {
    fn device_index(&self, handle: NativeHandle) -> BackendResult<usize> {
        self.handles
            .get(&handle.raw())
            .copied()
            .ok_or(BackendError::UnknownHandle {
                handle: handle.raw(),
            })
    }

    fn device(&self, handle: NativeHandle) -> BackendResult<&MemoryDevice> {
        let index = self.device_index(handle)?;
        Ok(&self.devices[index])
    }
}

/// Shared-state in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with a single simulated flatbed, used by the front end.
    pub fn simulated() -> Self {
        Self::new().with_device(MemoryDevice::flatbed("memory:flatbed0"))
    }

    pub fn with_device(self, device: MemoryDevice) -> Self {
        self.add_device(device);
        self
    }

    /// Make `init` fail with `status`.
    pub fn failing_init(self, status: Status) -> Self {
        self.lock().init_error = Some(status);
        self
    }

    /// Make `shutdown` fail with `status`.
    pub fn failing_shutdown(self, status: Status) -> Self {
        self.lock().shutdown_error = Some(status);
        self
    }

    pub fn add_device(&self, device: MemoryDevice) {
        self.lock().devices.push(device);
    }

    /// Append an option slot to an attached device, changing its option count.
    pub fn add_option(&self, device_name: &str, descriptor: OptionDescriptor, value: Option<OptionValue>) {
        let mut state = self.lock();
        if let Some(device) = state
            .devices
            .iter_mut()
            .find(|device| device.info.name == device_name)
        {
            device.options.push(MemoryOption { descriptor, value });
        }
    }

    /// Current value of a named option on an attached device.
    pub fn option_value(&self, device_name: &str, option_name: &str) -> Option<OptionValue> {
        let state = self.lock();
        state
            .devices
            .iter()
            .find(|device| device.info.name == device_name)?
            .find(option_name)?
            .value
            .clone()
    }

    pub fn stats(&self) -> MemoryStats {
        self.lock().stats.clone()
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.lock().handles.len()
    }

    pub fn is_initialised(&self) -> bool {
        self.lock().initialised
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn check_value(descriptor: &OptionDescriptor, value: &OptionValue) -> BackendResult<OptionValue> {
    let mismatch = || BackendError::ValueKind {
        message: format!(
            "option '{}' is {:?}, got {:?}",
            descriptor.title, descriptor.kind, value
        ),
    };
    match (descriptor.kind, value) {
        (ValueKind::Fixed, OptionValue::Fixed(fixed)) => {
            let raw = match descriptor.constraint {
                OptionConstraint::Range { min, max, .. } => fixed.raw().clamp(min, max),
                _ => fixed.raw(),
            };
            Ok(OptionValue::Fixed(Fixed::from_raw(raw)))
        }
        (ValueKind::Int, OptionValue::Int(word)) | (ValueKind::Bool, OptionValue::Int(word)) => {
            match &descriptor.constraint {
                OptionConstraint::WordList(list) => {
                    let count = list.first().copied().unwrap_or(0).max(0) as usize;
                    if list.iter().skip(1).take(count).any(|entry| entry == word) {
                        Ok(OptionValue::Int(*word))
                    } else {
                        Err(Status::Invalid.into())
                    }
                }
                OptionConstraint::Range { min, max, .. } => {
                    Ok(OptionValue::Int((*word).clamp(*min, *max)))
                }
                _ => Ok(OptionValue::Int(*word)),
            }
        }
        (ValueKind::String, OptionValue::Bytes(bytes)) => {
            if bytes.len() > descriptor.size {
                return Err(Status::Invalid.into());
            }
            let text = unpadded(bytes);
            if let OptionConstraint::StringList(choices) = &descriptor.constraint {
                if !choices.iter().any(|choice| *choice == text) {
                    return Err(Status::Invalid.into());
                }
            }
            Ok(OptionValue::Bytes(padded(&text, descriptor.size)))
        }
        _ => Err(mismatch()),
    }
}

impl ScanBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn init(&mut self) -> BackendResult<()> {
        let mut state = self.lock();
        state.stats.init_calls += 1;
        if let Some(status) = state.init_error {
            return Err(status.into());
        }
        state.initialised = true;
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        let mut state = self.lock();
        state.stats.shutdown_calls += 1;
        state.initialised = false;
        state.acquisitions.clear();
        match state.shutdown_error {
            Some(status) => Err(status.into()),
            None => Ok(()),
        }
    }

    fn list_devices(&mut self) -> BackendResult<Vec<NativeDevice>> {
        let mut state = self.lock();
        state.stats.list_calls += 1;
        if !state.initialised {
            return Err(BackendError::NotInitialised);
        }
        Ok(state.devices.iter().map(|device| device.info.clone()).collect())
    }

    fn open(&mut self, device_name: &str) -> BackendResult<NativeHandle> {
        let mut state = self.lock();
        state.stats.open_calls += 1;
        if !state.initialised {
            return Err(BackendError::NotInitialised);
        }
        let index = state
            .devices
            .iter()
            .position(|device| device.info.name == device_name)
            .ok_or(BackendError::Status(Status::Invalid))?;
        if let Some(status) = state.devices[index].fail_open {
            return Err(status.into());
        }
        state.next_handle += 1;
        let raw = state.next_handle;
        state.handles.insert(raw, index);
        Ok(NativeHandle::new(raw))
    }

    fn close(&mut self, handle: NativeHandle) {
        let mut state = self.lock();
        state.stats.close_calls += 1;
        state.handles.remove(&handle.raw());
        state.acquisitions.remove(&handle.raw());
    }

    fn option_count(&mut self, handle: NativeHandle) -> BackendResult<usize> {
        let mut state = self.lock();
        state.stats.option_count_calls += 1;
        Ok(state.device(handle)?.options.len() + 1)
    }

    fn option_descriptor(
        &mut self,
        handle: NativeHandle,
        index: usize,
    ) -> BackendResult<Option<OptionDescriptor>> {
        let state = self.lock();
        let device = state.device(handle)?;
        if index == 0 {
            return Ok(Some(OptionDescriptor::new(
                None,
                ValueKind::Int,
                4,
                OptionConstraint::None,
            )));
        }
        Ok(device
            .options
            .get(index - 1)
            .map(|option| option.descriptor.clone()))
    }

    fn read_option(&mut self, handle: NativeHandle, index: usize) -> BackendResult<OptionValue> {
        let state = self.lock();
        let device = state.device(handle)?;
        if index == 0 {
            return Ok(OptionValue::Int(device.options.len() as i32 + 1));
        }
        let option = device
            .options
            .get(index - 1)
            .ok_or(BackendError::OptionIndex { index })?;
        option
            .value
            .clone()
            .ok_or(BackendError::Status(Status::Invalid))
    }

    fn write_option(
        &mut self,
        handle: NativeHandle,
        index: usize,
        value: &OptionValue,
    ) -> BackendResult<()> {
        let mut state = self.lock();
        state.stats.write_calls += 1;
        let device_index = state.device_index(handle)?;
        let device = &mut state.devices[device_index];
        if index == 0 {
            return Err(Status::Invalid.into());
        }
        let option = device
            .options
            .get_mut(index - 1)
            .ok_or(BackendError::OptionIndex { index })?;
        if let Some((name, status)) = &device.fail_write {
            if option.descriptor.name.as_deref() == Some(name.as_str()) {
                return Err((*status).into());
            }
        }
        if option.value.is_none() {
            return Err(Status::Invalid.into());
        }
        option.value = Some(check_value(&option.descriptor, value)?);
        Ok(())
    }

    fn start(&mut self, handle: NativeHandle) -> BackendResult<()> {
        let mut state = self.lock();
        state.stats.start_calls += 1;
        let device = state.device(handle)?;
        if let Some(status) = device.fail_start {
            return Err(status.into());
        }
        let acquisition = match &device.source {
            ImageSource::Scripted {
                frame,
                chunks,
                trailing,
            } => Acquisition {
                frame: *frame,
                pending: chunks.iter().cloned().collect(),
                trailing: *trailing,
            },
            ImageSource::Pattern => {
                let frame = device.pattern_frame();
                let mut pending = VecDeque::new();
                pending.push_back(MemoryDevice::pattern_bytes(&frame));
                Acquisition {
                    frame,
                    pending,
                    trailing: Status::Eof,
                }
            }
        };
        state.acquisitions.insert(handle.raw(), acquisition);
        Ok(())
    }

    fn frame_parameters(&mut self, handle: NativeHandle) -> BackendResult<FrameParameters> {
        let state = self.lock();
        if let Some(acquisition) = state.acquisitions.get(&handle.raw()) {
            return Ok(acquisition.frame);
        }
        let device = state.device(handle)?;
        Ok(match &device.source {
            ImageSource::Scripted { frame, .. } => *frame,
            ImageSource::Pattern => device.pattern_frame(),
        })
    }

    fn read(&mut self, handle: NativeHandle, buf: &mut [u8]) -> BackendResult<usize> {
        let mut state = self.lock();
        state.stats.read_calls += 1;
        let acquisition = state
            .acquisitions
            .get_mut(&handle.raw())
            .ok_or(BackendError::Status(Status::Cancelled))?;
        let Some(mut chunk) = acquisition.pending.pop_front() else {
            return Err(acquisition.trailing.into());
        };
        let length = chunk.len().min(buf.len());
        buf[..length].copy_from_slice(&chunk[..length]);
        if length < chunk.len() {
            acquisition.pending.push_front(chunk.split_off(length));
        }
        Ok(length)
    }

    fn cancel(&mut self, handle: NativeHandle) {
        let mut state = self.lock();
        state.stats.cancel_calls += 1;
        state.acquisitions.remove(&handle.raw());
    }
}
