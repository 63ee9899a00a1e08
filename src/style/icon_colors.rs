//! Icon colors
//!
//! Symbolic icons are recolored from a small group of style properties:
//! the foreground color plus warning/error/success status colors. All
//! four inherit down the node tree.

use crate::style::color::Color;
use crate::style::node::ThemeNode;

/// The color group handed to symbolic icon rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconColors {
    pub foreground: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
}

impl Default for IconColors {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            warning: Color::rgb(0xf5, 0x79, 0x00),
            error: Color::rgb(0xcc, 0x00, 0x00),
            success: Color::rgb(0x4e, 0x9a, 0x06),
        }
    }
}

/// Resolves the icon color group for a node, falling back to the stock
/// palette for colors the cascade does not provide.
pub(crate) fn resolve_icon_colors(node: &ThemeNode) -> IconColors {
    let defaults = IconColors::default();
    IconColors {
        foreground: node
            .lookup_color("color", true)
            .unwrap_or(defaults.foreground),
        warning: node
            .lookup_color("warning-color", true)
            .unwrap_or(defaults.warning),
        error: node
            .lookup_color("error-color", true)
            .unwrap_or(defaults.error),
        success: node
            .lookup_color("success-color", true)
            .unwrap_or(defaults.success),
    }
}
