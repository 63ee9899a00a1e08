//! Background resolution
//!
//! The background feature group: color, image, and the toolkit's gradient
//! extension properties. The bare `background` shorthand resets every
//! sub-property to its default before applying whatever terms it carries;
//! it is not additive over lower-priority declarations.

use crate::css::Term;
use crate::style::color::{color_from_term, color_from_terms, Color};
use crate::style::node::ThemeNode;
use crate::style::values::resolve_url;
use crate::style::TermResult;
use std::path::PathBuf;

/// Gradient shape for the `background-gradient-*` extension properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientType {
    #[default]
    None,
    Vertical,
    Horizontal,
    Radial,
}

/// A resolved background gradient.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundGradient {
    pub kind: GradientType,
    pub start: Color,
    pub end: Color,
}

/// Resolved background state for one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Background {
    pub color: Color,
    pub image: Option<PathBuf>,
    pub gradient: BackgroundGradient,
}

fn gradient_type_from_terms(terms: &[Term]) -> Option<GradientType> {
    match terms.first() {
        Some(Term::Ident(name)) => match name.to_ascii_lowercase().as_str() {
            "none" => Some(GradientType::None),
            "vertical" => Some(GradientType::Vertical),
            "horizontal" => Some(GradientType::Horizontal),
            "radial" => Some(GradientType::Radial),
            _ => None,
        },
        _ => None,
    }
}

/// Computes the node's background by walking its matched declarations in
/// cascade order, lowest priority first.
pub(crate) fn resolve_background(node: &ThemeNode) -> Background {
    let mut background = Background::default();

    for matched in node.declarations() {
        let declaration = &matched.declaration;
        let terms = &declaration.terms;
        let inherit = declaration.is_inherit();
        let base_dir = matched.base_dir.as_ref().map(|dir| dir.as_path());
        match declaration.property.as_str() {
            "background" => {
                // the shorthand resets everything it covers
                background = Background::default();
                if inherit {
                    if let Some(parent) = node.parent() {
                        background = parent.background().clone();
                    }
                    continue;
                }
                for term in terms {
                    match term {
                        Term::Url(href) => background.image = resolve_url(href, base_dir),
                        Term::Ident(name) if name.eq_ignore_ascii_case("none") => {
                            background.image = None;
                        }
                        other => {
                            if let Some(color) = color_from_term(other) {
                                background.color = color;
                            }
                        }
                    }
                }
            }
            "background-color" => match color_from_terms(terms) {
                TermResult::Found(color) => background.color = color,
                TermResult::Inherit => {
                    if let Some(parent) = node.parent() {
                        background.color = parent.background().color;
                    }
                }
                TermResult::NotFound => {}
            },
            "background-image" => {
                if inherit {
                    if let Some(parent) = node.parent() {
                        background.image = parent.background().image.clone();
                    }
                    continue;
                }
                match terms.first() {
                    Some(Term::Url(href)) => background.image = resolve_url(href, base_dir),
                    Some(Term::Ident(name)) if name.eq_ignore_ascii_case("none") => {
                        background.image = None;
                    }
                    _ => {}
                }
            }
            "background-gradient-direction" => {
                if inherit {
                    if let Some(parent) = node.parent() {
                        background.gradient.kind = parent.background().gradient.kind;
                    }
                } else if let Some(kind) = gradient_type_from_terms(terms) {
                    background.gradient.kind = kind;
                }
            }
            "background-gradient-start" => match color_from_terms(terms) {
                TermResult::Found(color) => background.gradient.start = color,
                TermResult::Inherit => {
                    if let Some(parent) = node.parent() {
                        background.gradient.start = parent.background().gradient.start;
                    }
                }
                TermResult::NotFound => {}
            },
            "background-gradient-end" => match color_from_terms(terms) {
                TermResult::Found(color) => background.gradient.end = color,
                TermResult::Inherit => {
                    if let Some(parent) = node.parent() {
                        background.gradient.end = parent.background().gradient.end;
                    }
                }
                TermResult::NotFound => {}
            },
            _ => {}
        }
    }

    background
}
