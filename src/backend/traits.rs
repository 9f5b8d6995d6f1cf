//! Capture backend trait
//!
//! The only path to scanning hardware. Every operation is synchronous and
//! blocks until the native layer answers.

use crate::backend::error::BackendResult;
use crate::backend::types::{
    FrameParameters, NativeDevice, NativeHandle, OptionDescriptor, OptionValue,
};

/// Interface implemented by each native capture backend adapter.
///
/// The groups are: lifecycle (`init`/`shutdown`), enumeration and handles
/// (`list_devices`/`open`/`close`), numbered options
/// (`option_count`/`option_descriptor`/`read_option`/`write_option`) and
/// acquisition (`start`/`frame_parameters`/`read`/`cancel`).
pub trait ScanBackend {
    /// Short backend name used in log lines.
    fn name(&self) -> &str;

    /// Initialise the native library. Must succeed before any other call.
    fn init(&mut self) -> BackendResult<()>;

    /// Release the native library. Handles must be closed beforehand.
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Enumerate the devices currently attached.
    fn list_devices(&mut self) -> BackendResult<Vec<NativeDevice>>;

    /// Open the device with the given backend identifier.
    fn open(&mut self, device_name: &str) -> BackendResult<NativeHandle>;

    /// Close a handle returned by [`ScanBackend::open`].
    fn close(&mut self, handle: NativeHandle);

    /// Number of option slots exposed by the device (including slot 0).
    fn option_count(&mut self, handle: NativeHandle) -> BackendResult<usize>;

    /// Descriptor of one option slot, `None` if the slot is empty.
    fn option_descriptor(
        &mut self,
        handle: NativeHandle,
        index: usize,
    ) -> BackendResult<Option<OptionDescriptor>>;

    /// Read the current value of an option slot.
    fn read_option(&mut self, handle: NativeHandle, index: usize) -> BackendResult<OptionValue>;

    /// Write a new value into an option slot.
    fn write_option(
        &mut self,
        handle: NativeHandle,
        index: usize,
        value: &OptionValue,
    ) -> BackendResult<()>;

    /// Start an acquisition with the current option values.
    fn start(&mut self, handle: NativeHandle) -> BackendResult<()>;

    /// Parameters of the frame being acquired.
    fn frame_parameters(&mut self, handle: NativeHandle) -> BackendResult<FrameParameters>;

    /// Read the next chunk of image data into `buf`, returning the number of
    /// bytes written. End of data is reported as `Status::Eof`.
    fn read(&mut self, handle: NativeHandle, buf: &mut [u8]) -> BackendResult<usize>;

    /// Finish or abort the current acquisition.
    fn cancel(&mut self, handle: NativeHandle);
}
