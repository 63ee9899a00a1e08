//! Style cascade resolution for desktop-shell widget toolkits.
//!
//! The engine resolves a CSS subset against a tree of theme nodes:
//! stylesheets are gathered into a [`Theme`], global parameters live in a
//! [`ThemeContext`], and each [`ThemeNode`] lazily computes and caches
//! its matched declarations and typed property values (colors, lengths,
//! fonts, shadows, border images, backgrounds).
//!
//! ```
//! use shellstyle::{Theme, ThemeContext, ThemeNode};
//!
//! let theme = Theme::new();
//! theme.set_theme_stylesheet_source("Label { color: #204a87; padding: 4px; }");
//!
//! let context = ThemeContext::new();
//! context.set_theme(Some(theme));
//!
//! let root = context.root_node();
//! let label = ThemeNode::new(
//!     &context, Some(&root), None, "Label", None, None, None, None, false,
//! );
//! assert_eq!(label.get_color("color").to_string(), "#204a87");
//! assert_eq!(label.get_padding(shellstyle::Side::Top), 4.0);
//! ```

pub mod css;
pub mod error;
pub mod style;

pub use error::{Error, Result};
pub use style::{
    BackgroundGradient, BorderImage, Color, Corner, FontDescription, FontStyle, FontVariant,
    FontWeight, GradientType, HandlerId, IconColors, Shadow, Side, Theme, ThemeContext, ThemeNode,
};
