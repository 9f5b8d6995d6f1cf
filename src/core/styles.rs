//! Terminal colours for tables and `--help`
//!
//! Each role maps to one ANSI colour. Tables take the colour as a
//! prettytable style spec, clap takes it through [`palette_to_clap`].
//!
//! ```
//! use carbonpaper::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.to_prettytable_spec().as_deref(), Some("bFy"));
//! assert_eq!(StyleRole::Value.to_prettytable_spec(), None);
//! ```

use clap::builder::styling::{AnsiColor, Color, Style, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRole {
    /// Table titles and help section headers
    Header,
    /// Field names, flags
    Key,
    /// Device descriptors, placeholders
    Device,
    /// Rejected values in usage errors
    Error,
    /// Plain values
    Value,
}

impl StyleRole {
    pub fn color(self) -> Option<AnsiColor> {
        match self {
            StyleRole::Header => Some(AnsiColor::Yellow),
            StyleRole::Key => Some(AnsiColor::BrightGreen),
            StyleRole::Device => Some(AnsiColor::Blue),
            StyleRole::Error => Some(AnsiColor::BrightRed),
            StyleRole::Value => None,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, StyleRole::Header | StyleRole::Error)
    }

    /// Cell style spec, e.g. `"bFy"` for a bold yellow header.
    pub fn to_prettytable_spec(self) -> Option<String> {
        let colour = match self.color()? {
            AnsiColor::Black => "k",
            AnsiColor::Red => "r",
            AnsiColor::Green => "g",
            AnsiColor::Yellow => "y",
            AnsiColor::Blue => "b",
            AnsiColor::Magenta => "m",
            AnsiColor::Cyan => "c",
            AnsiColor::White => "w",
            AnsiColor::BrightBlack => "K",
            AnsiColor::BrightRed => "R",
            AnsiColor::BrightGreen => "G",
            AnsiColor::BrightYellow => "Y",
            AnsiColor::BrightBlue => "B",
            AnsiColor::BrightMagenta => "M",
            AnsiColor::BrightCyan => "C",
            AnsiColor::BrightWhite => "W",
        };
        let bold = if self.is_bold() { "b" } else { "" };
        Some(format!("{}F{}", bold, colour))
    }

    fn clap_style(self) -> Style {
        let style = Style::new().fg_color(self.color().map(Color::Ansi));
        if self.is_bold() {
            style.bold()
        } else {
            style
        }
    }
}

/// Help and usage-error colours; plain when colour is off.
pub fn palette_to_clap(enabled: bool) -> Styles {
    if !enabled {
        return Styles::plain();
    }
    Styles::styled()
        .header(StyleRole::Header.clap_style())
        .usage(StyleRole::Header.clap_style())
        .literal(StyleRole::Key.clap_style())
        .placeholder(StyleRole::Device.clap_style())
        .valid(StyleRole::Key.clap_style())
        .invalid(StyleRole::Error.clap_style())
        .error(StyleRole::Error.clap_style())
}
