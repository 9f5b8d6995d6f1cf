//! libsane adapter
//!
//! Binds the SANE C API directly. Native lists (devices, string lists, word
//! lists) are copied into owned values at this boundary so nothing borrowed
//! from the library outlives the call that produced it.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;

use libc::{c_char, c_int, c_void};

use crate::backend::error::{BackendError, BackendResult, Status};
use crate::backend::traits::ScanBackend;
use crate::backend::types::{
    Fixed, FrameFormat, FrameParameters, NativeDevice, NativeHandle, OptionConstraint,
    OptionDescriptor, OptionValue, ValueKind,
};

mod sys {
    use libc::{c_char, c_int, c_void};

    pub type Word = c_int;
    pub type Status = c_int;
    pub type Handle = *mut c_void;

    pub const STATUS_GOOD: Status = 0;

    pub const TYPE_BOOL: c_int = 0;
    pub const TYPE_INT: c_int = 1;
    pub const TYPE_FIXED: c_int = 2;
    pub const TYPE_STRING: c_int = 3;
    pub const TYPE_BUTTON: c_int = 4;

    pub const CONSTRAINT_RANGE: c_int = 1;
    pub const CONSTRAINT_WORD_LIST: c_int = 2;
    pub const CONSTRAINT_STRING_LIST: c_int = 3;

    pub const ACTION_GET_VALUE: c_int = 0;
    pub const ACTION_SET_VALUE: c_int = 1;

    pub const FRAME_GRAY: c_int = 0;
    pub const FRAME_RGB: c_int = 1;
    pub const FRAME_RED: c_int = 2;
    pub const FRAME_GREEN: c_int = 3;

    #[repr(C)]
    pub struct Device {
        pub name: *const c_char,
        pub vendor: *const c_char,
        pub model: *const c_char,
        pub kind: *const c_char,
    }

    #[repr(C)]
    pub struct Range {
        pub min: Word,
        pub max: Word,
        pub quant: Word,
    }

    #[repr(C)]
    pub union Constraint {
        pub string_list: *const *const c_char,
        pub word_list: *const Word,
        pub range: *const Range,
    }

    #[repr(C)]
    pub struct OptionDescriptor {
        pub name: *const c_char,
        pub title: *const c_char,
        pub desc: *const c_char,
        pub kind: c_int,
        pub unit: c_int,
        pub size: c_int,
        pub cap: c_int,
        pub constraint_type: c_int,
        pub constraint: Constraint,
    }

    #[repr(C)]
    pub struct Parameters {
        pub format: c_int,
        pub last_frame: c_int,
        pub bytes_per_line: c_int,
        pub pixels_per_line: c_int,
        pub lines: c_int,
        pub depth: c_int,
    }

    pub type AuthCallback =
        Option<unsafe extern "C" fn(resource: *const c_char, username: *mut c_char, password: *mut c_char)>;

    #[link(name = "sane")]
    extern "C" {
        pub fn sane_init(version_code: *mut Word, authorize: AuthCallback) -> Status;
        pub fn sane_exit();
        pub fn sane_get_devices(device_list: *mut *mut *const Device, local_only: c_int) -> Status;
        pub fn sane_open(name: *const c_char, handle: *mut Handle) -> Status;
        pub fn sane_close(handle: Handle);
        pub fn sane_get_option_descriptor(handle: Handle, option: c_int) -> *const OptionDescriptor;
        pub fn sane_control_option(
            handle: Handle,
            option: c_int,
            action: c_int,
            value: *mut c_void,
            info: *mut c_int,
        ) -> Status;
        pub fn sane_get_parameters(handle: Handle, params: *mut Parameters) -> Status;
        pub fn sane_start(handle: Handle) -> Status;
        pub fn sane_read(handle: Handle, data: *mut u8, max_length: c_int, length: *mut c_int) -> Status;
        pub fn sane_cancel(handle: Handle);
    }
}

fn check(status: sys::Status) -> BackendResult<()> {
    if status == sys::STATUS_GOOD {
        Ok(())
    } else {
        Err(BackendError::Status(
            Status::from_code(status).unwrap_or(Status::IoError),
        ))
    }
}

/// Copy a possibly-null C string into an owned `String`.
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string.
unsafe fn owned(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Adapter over the system libsane.
#[derive(Debug, Default)]
pub struct SaneBackend {
    handles: HashMap<u64, sys::Handle>,
    next_handle: u64,
    initialised: bool,
}

impl SaneBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn raw(&self, handle: NativeHandle) -> BackendResult<sys::Handle> {
        self.handles
            .get(&handle.raw())
            .copied()
            .ok_or(BackendError::UnknownHandle {
                handle: handle.raw(),
            })
    }

    fn descriptor_ptr(
        &self,
        handle: NativeHandle,
        index: usize,
    ) -> BackendResult<*const sys::OptionDescriptor> {
        let raw = self.raw(handle)?;
        let option = c_int::try_from(index).map_err(|_| BackendError::OptionIndex { index })?;
        // SAFETY: the handle is open; the library owns the returned descriptor.
        Ok(unsafe { sys::sane_get_option_descriptor(raw, option) })
    }
}

/// Convert a native descriptor into an owned one.
///
/// # Safety
/// `descriptor` must be a valid pointer returned by `sane_get_option_descriptor`.
unsafe fn convert_descriptor(descriptor: &sys::OptionDescriptor) -> OptionDescriptor {
    let kind = match descriptor.kind {
        sys::TYPE_BOOL => ValueKind::Bool,
        sys::TYPE_INT => ValueKind::Int,
        sys::TYPE_FIXED => ValueKind::Fixed,
        sys::TYPE_STRING => ValueKind::String,
        sys::TYPE_BUTTON => ValueKind::Button,
        _ => ValueKind::Group,
    };
    let constraint = match descriptor.constraint_type {
        sys::CONSTRAINT_RANGE if !descriptor.constraint.range.is_null() => {
            let range = &*descriptor.constraint.range;
            OptionConstraint::Range {
                min: range.min,
                max: range.max,
                quant: range.quant,
            }
        }
        sys::CONSTRAINT_WORD_LIST if !descriptor.constraint.word_list.is_null() => {
            let list = descriptor.constraint.word_list;
            let count = (*list).max(0) as usize;
            OptionConstraint::WordList(std::slice::from_raw_parts(list, count + 1).to_vec())
        }
        sys::CONSTRAINT_STRING_LIST if !descriptor.constraint.string_list.is_null() => {
            let mut entries = Vec::new();
            let mut cursor = descriptor.constraint.string_list;
            while !(*cursor).is_null() {
                if let Some(entry) = owned(*cursor) {
                    entries.push(entry);
                }
                cursor = cursor.add(1);
            }
            OptionConstraint::StringList(entries)
        }
        _ => OptionConstraint::None,
    };
    OptionDescriptor {
        name: owned(descriptor.name).filter(|name| !name.is_empty()),
        title: owned(descriptor.title).unwrap_or_default(),
        kind,
        size: descriptor.size.max(0) as usize,
        constraint,
    }
}

impl ScanBackend for SaneBackend {
    fn name(&self) -> &str {
        "sane"
    }

    fn init(&mut self) -> BackendResult<()> {
        let mut version_code: sys::Word = 0;
        // SAFETY: no authorisation callback is installed.
        check(unsafe { sys::sane_init(&mut version_code, None) })?;
        log::debug!(
            "libsane initialised (version {}.{}.{})",
            (version_code >> 24) & 0xff,
            (version_code >> 16) & 0xff,
            version_code & 0xffff
        );
        self.initialised = true;
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        for (_, handle) in self.handles.drain() {
            // SAFETY: every stored handle came from sane_open and is closed once.
            unsafe { sys::sane_close(handle) };
        }
        if self.initialised {
            // SAFETY: paired with the successful sane_init above.
            unsafe { sys::sane_exit() };
            self.initialised = false;
        }
        Ok(())
    }

    fn list_devices(&mut self) -> BackendResult<Vec<NativeDevice>> {
        if !self.initialised {
            return Err(BackendError::NotInitialised);
        }
        let mut list: *mut *const sys::Device = ptr::null_mut();
        // SAFETY: the library fills `list` with a null-terminated array it owns.
        check(unsafe { sys::sane_get_devices(&mut list, 0) })?;
        let mut devices = Vec::new();
        if list.is_null() {
            return Ok(devices);
        }
        let mut cursor = list;
        // SAFETY: walk until the terminating null entry; strings are copied.
        unsafe {
            while !(*cursor).is_null() {
                let device = &**cursor;
                devices.push(NativeDevice {
                    name: owned(device.name).unwrap_or_default(),
                    vendor: owned(device.vendor).unwrap_or_default(),
                    model: owned(device.model).unwrap_or_default(),
                });
                cursor = cursor.add(1);
            }
        }
        Ok(devices)
    }

    fn open(&mut self, device_name: &str) -> BackendResult<NativeHandle> {
        let name = CString::new(device_name).map_err(|e| BackendError::Other {
            message: format!("device name contains a null byte: {}", e),
        })?;
        let mut raw: sys::Handle = ptr::null_mut();
        // SAFETY: `name` is a valid C string for the duration of the call.
        check(unsafe { sys::sane_open(name.as_ptr(), &mut raw) })?;
        self.next_handle += 1;
        self.handles.insert(self.next_handle, raw);
        Ok(NativeHandle::new(self.next_handle))
    }

    fn close(&mut self, handle: NativeHandle) {
        if let Some(raw) = self.handles.remove(&handle.raw()) {
            // SAFETY: removed from the table, so closed exactly once.
            unsafe { sys::sane_close(raw) };
        }
    }

    fn option_count(&mut self, handle: NativeHandle) -> BackendResult<usize> {
        match self.read_option(handle, 0)? {
            OptionValue::Int(count) => Ok(count.max(0) as usize),
            other => Err(BackendError::ValueKind {
                message: format!("option count slot holds {:?}", other),
            }),
        }
    }

    fn option_descriptor(
        &mut self,
        handle: NativeHandle,
        index: usize,
    ) -> BackendResult<Option<OptionDescriptor>> {
        let descriptor = self.descriptor_ptr(handle, index)?;
        if descriptor.is_null() {
            return Ok(None);
        }
        // SAFETY: non-null descriptors stay valid until the options reload.
        Ok(Some(unsafe { convert_descriptor(&*descriptor) }))
    }

    fn read_option(&mut self, handle: NativeHandle, index: usize) -> BackendResult<OptionValue> {
        let raw = self.raw(handle)?;
        let option = c_int::try_from(index).map_err(|_| BackendError::OptionIndex { index })?;
        let descriptor = self.descriptor_ptr(handle, index)?;
        // SAFETY: checked for null before dereferencing.
        let (kind, size) = match unsafe { descriptor.as_ref() } {
            Some(descriptor) => (descriptor.kind, descriptor.size.max(0) as usize),
            None => return Err(BackendError::OptionIndex { index }),
        };
        if kind == sys::TYPE_STRING {
            let mut buffer = vec![0u8; size.max(1)];
            // SAFETY: buffer holds `size` bytes as required for string options.
            check(unsafe {
                sys::sane_control_option(
                    raw,
                    option,
                    sys::ACTION_GET_VALUE,
                    buffer.as_mut_ptr() as *mut c_void,
                    ptr::null_mut(),
                )
            })?;
            return Ok(OptionValue::Bytes(buffer));
        }
        let mut word: sys::Word = 0;
        // SAFETY: scalar options hold a single word.
        check(unsafe {
            sys::sane_control_option(
                raw,
                option,
                sys::ACTION_GET_VALUE,
                &mut word as *mut sys::Word as *mut c_void,
                ptr::null_mut(),
            )
        })?;
        Ok(if kind == sys::TYPE_FIXED {
            OptionValue::Fixed(Fixed::from_raw(word))
        } else {
            OptionValue::Int(word)
        })
    }

    fn write_option(
        &mut self,
        handle: NativeHandle,
        index: usize,
        value: &OptionValue,
    ) -> BackendResult<()> {
        let raw = self.raw(handle)?;
        let option = c_int::try_from(index).map_err(|_| BackendError::OptionIndex { index })?;
        let mut info: c_int = 0;
        let word = match value {
            OptionValue::Int(word) => Some(*word),
            OptionValue::Fixed(fixed) => Some(fixed.raw()),
            OptionValue::Bytes(_) => None,
        };
        if let Some(word) = word {
            let mut word: sys::Word = word;
            // SAFETY: scalar options take a single word.
            return check(unsafe {
                sys::sane_control_option(
                    raw,
                    option,
                    sys::ACTION_SET_VALUE,
                    &mut word as *mut sys::Word as *mut c_void,
                    &mut info,
                )
            });
        }
        let OptionValue::Bytes(bytes) = value else {
            return Err(BackendError::ValueKind {
                message: format!("unsupported value {:?}", value),
            });
        };
        let descriptor = self.descriptor_ptr(handle, index)?;
        // SAFETY: checked for null before dereferencing.
        let size = unsafe { descriptor.as_ref() }
            .map(|descriptor| descriptor.size.max(0) as usize)
            .unwrap_or(0);
        let mut buffer = bytes.clone();
        buffer.resize(size.max(bytes.len() + 1), 0);
        // SAFETY: buffer is at least the declared option size and null terminated.
        check(unsafe {
            sys::sane_control_option(
                raw,
                option,
                sys::ACTION_SET_VALUE,
                buffer.as_mut_ptr() as *mut c_void,
                &mut info,
            )
        })
    }

    fn start(&mut self, handle: NativeHandle) -> BackendResult<()> {
        let raw = self.raw(handle)?;
        // SAFETY: the handle is open.
        check(unsafe { sys::sane_start(raw) })
    }

    fn frame_parameters(&mut self, handle: NativeHandle) -> BackendResult<FrameParameters> {
        let raw = self.raw(handle)?;
        let mut params = sys::Parameters {
            format: 0,
            last_frame: 0,
            bytes_per_line: 0,
            pixels_per_line: 0,
            lines: 0,
            depth: 0,
        };
        // SAFETY: `params` is a valid out pointer.
        check(unsafe { sys::sane_get_parameters(raw, &mut params) })?;
        let format = match params.format {
            sys::FRAME_GRAY => FrameFormat::Gray,
            sys::FRAME_RGB => FrameFormat::Rgb,
            sys::FRAME_RED => FrameFormat::Red,
            sys::FRAME_GREEN => FrameFormat::Green,
            _ => FrameFormat::Blue,
        };
        Ok(FrameParameters {
            format,
            last_frame: params.last_frame != 0,
            bytes_per_line: params.bytes_per_line,
            pixels_per_line: params.pixels_per_line,
            lines: params.lines,
            depth: params.depth,
        })
    }

    fn read(&mut self, handle: NativeHandle, buf: &mut [u8]) -> BackendResult<usize> {
        let raw = self.raw(handle)?;
        let max_length = c_int::try_from(buf.len()).unwrap_or(c_int::MAX);
        let mut length: c_int = 0;
        // SAFETY: the library writes at most `max_length` bytes into `buf`.
        check(unsafe { sys::sane_read(raw, buf.as_mut_ptr(), max_length, &mut length) })?;
        Ok(length.max(0) as usize)
    }

    fn cancel(&mut self, handle: NativeHandle) {
        if let Ok(raw) = self.raw(handle) {
            // SAFETY: the handle is open.
            unsafe { sys::sane_cancel(raw) };
        }
    }
}

impl Drop for SaneBackend {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
