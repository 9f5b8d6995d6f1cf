//! Native value types exchanged with a capture backend.
//!
//! These types model the backend's own representation (numbered options,
//! raw fixed-point words, null-padded string buffers). Translation into the
//! typed records used by callers happens in [`crate::scanner::codec`].

/// Opaque handle of an opened native device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A device as reported by the backend's enumeration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDevice {
    /// Stable backend identifier, used to open the device
    pub name: String,
    pub vendor: String,
    pub model: String,
}

impl NativeDevice {
    pub fn new(name: impl Into<String>, vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: vendor.into(),
            model: model.into(),
        }
    }
}

/// Native fixed-point word (16.16) as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i32);

impl Fixed {
    /// Number of fractional bits in a native fixed-point word.
    pub const SCALE_SHIFT: u32 = 16;

    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    /// Nearest fixed-point word to `value`.
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::SCALE).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / Self::SCALE
    }

    const SCALE: f64 = (1u32 << Self::SCALE_SHIFT) as f64;
}

/// Declared type of a native option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Fixed,
    String,
    Button,
    Group,
}

/// Constraint attached to a native option descriptor.
///
/// Word lists keep the native layout: the first element is the number of
/// entries that follow.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionConstraint {
    None,
    Range { min: i32, max: i32, quant: i32 },
    WordList(Vec<i32>),
    StringList(Vec<String>),
}

/// Descriptor of one numbered option slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Option name; group separators and the leading count slot have none
    pub name: Option<String>,
    pub title: String,
    pub kind: ValueKind,
    /// Size of the value in bytes (buffer capacity for string options)
    pub size: usize,
    pub constraint: OptionConstraint,
}

impl OptionDescriptor {
    pub fn new(name: Option<&str>, kind: ValueKind, size: usize, constraint: OptionConstraint) -> Self {
        Self {
            name: name.map(str::to_string),
            title: name.unwrap_or_default().to_string(),
            kind,
            size,
            constraint,
        }
    }
}

/// Value read from or written to an option slot.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Int(i32),
    Fixed(Fixed),
    /// Null-padded byte buffer of a string option
    Bytes(Vec<u8>),
}

/// Layout of the frame that the current acquisition delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Gray,
    Rgb,
    Red,
    Green,
    Blue,
}

/// Frame parameters reported after an acquisition has started.
///
/// Dimensions are signed because backends report `-1` when the number of
/// lines is not known in advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParameters {
    pub format: FrameFormat,
    pub last_frame: bool,
    pub bytes_per_line: i32,
    pub pixels_per_line: i32,
    pub lines: i32,
    pub depth: i32,
}

impl FrameParameters {
    /// Single-frame 8-bit RGB parameters.
    pub fn rgb(width: i32, height: i32) -> Self {
        Self {
            format: FrameFormat::Rgb,
            last_frame: true,
            bytes_per_line: width.saturating_mul(3),
            pixels_per_line: width,
            lines: height,
            depth: 8,
        }
    }

    /// Single-frame 8-bit gray parameters.
    pub fn gray(width: i32, height: i32) -> Self {
        Self {
            format: FrameFormat::Gray,
            last_frame: true,
            bytes_per_line: width,
            pixels_per_line: width,
            lines: height,
            depth: 8,
        }
    }
}
