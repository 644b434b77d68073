//! Terminal styling and color utilities.
//!
//! This module provides ANSI escape code definitions and color detection
//! for terminal output formatting.

use starlane_lib::RouteColor;

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    // Tag colors (bold reverse video for high visibility badges)
    /// Bold reverse green for STRT tags.
    pub const TAG_START: &str = "\x1b[1;7;32m";
    /// Bold reverse yellow for JUMP tags.
    pub const TAG_JUMP: &str = "\x1b[1;7;33m";
    /// Bold reverse magenta for GOAL tags.
    pub const TAG_GOAL: &str = "\x1b[1;7;35m";

    /// Bright bold white for emphasis (star names).
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary elements (jump lengths, decorations).
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for route headings.
    pub const CYAN: &str = "\x1b[36m";
    /// Red for failures.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_start: &'static str,
    pub tag_jump: &'static str,
    pub tag_goal: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub red: &'static str,
    /// Whether 24-bit swatches for route colours are drawn.
    pub swatches: bool,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_start: colors::TAG_START,
            tag_jump: colors::TAG_JUMP,
            tag_goal: colors::TAG_GOAL,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            red: colors::RED,
            swatches: true,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_start: "",
            tag_jump: "",
            tag_goal: "",
            white_bold: "",
            gray: "",
            cyan: "",
            red: "",
            swatches: false,
        }
    }

    /// Pick [`colored`](Self::colored) or [`plain`](Self::plain) based on the
    /// environment.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Two-cell block in the route colour followed by its hex code. Without
    /// colour support only the hex code is returned.
    #[must_use]
    pub fn swatch(&self, color: RouteColor) -> String {
        if !self.swatches {
            return color.to_hex();
        }
        let channel = |value: f64| (value * 255.0).round() as u8;
        format!(
            "\x1b[48;2;{};{};{}m  {} {}",
            channel(color.red),
            channel(color.green),
            channel(color.blue),
            self.reset,
            color.to_hex()
        )
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether the terminal should receive ANSI color codes.
///
/// Honors the `NO_COLOR` and `TERM=dumb` conventions.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}
