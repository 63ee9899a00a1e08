//! Font resolution
//!
//! `FontDescription` stands in for the host toolkit's font handle: the
//! engine resolves the cascade down to a family list, style, variant,
//! weight, and size, and rendering collaborators interpret it from there.
//!
//! The `font` shorthand follows the CSS grammar: optional style /
//! variant / weight terms in any order, a mandatory size, an optional
//! `/line-height` (parsed and ignored), then a mandatory comma-separated
//! family list.

use crate::css::Term;
use crate::style::node::ThemeNode;
use crate::style::values::{length_from_term, LengthMetrics};
use crate::style::TermResult;

/// Keyword sizes in points: xx-small through xx-large.
const FONT_SIZES: [f64; 7] = [6.0, 8.0, 10.0, 12.0, 16.0, 20.0, 24.0];

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Oblique,
    Italic,
}

/// Font variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontVariant {
    #[default]
    Normal,
    SmallCaps,
}

/// Numeric font weight, 100–900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);

    fn clamped(value: i32) -> Self {
        Self(value.clamp(100, 900) as u16)
    }

    /// One step bolder: +200, clamped to 900.
    pub fn bolder(self) -> Self {
        Self::clamped(self.0 as i32 + 200)
    }

    /// One step lighter: -200, clamped to 100.
    pub fn lighter(self) -> Self {
        Self::clamped(self.0 as i32 - 200)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A resolved font: family list plus style attributes and a point size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescription {
    pub family: Vec<String>,
    pub style: FontStyle,
    pub variant: FontVariant,
    pub weight: FontWeight,
    /// Size in typographic points (1/72 inch).
    pub size_points: f64,
}

impl FontDescription {
    pub fn new(family: &str, size_points: f64) -> Self {
        Self {
            family: vec![family.to_string()],
            size_points,
            ..Self::default()
        }
    }
}

impl Default for FontDescription {
    fn default() -> Self {
        Self {
            family: vec!["sans-serif".to_string()],
            style: FontStyle::Normal,
            variant: FontVariant::Normal,
            weight: FontWeight::NORMAL,
            size_points: 10.0,
        }
    }
}

// ============================================================================
// Term helpers
// ============================================================================

fn style_from_ident(name: &str) -> Option<FontStyle> {
    match name.to_ascii_lowercase().as_str() {
        "normal" => Some(FontStyle::Normal),
        "oblique" => Some(FontStyle::Oblique),
        "italic" => Some(FontStyle::Italic),
        _ => None,
    }
}

fn variant_from_ident(name: &str) -> Option<FontVariant> {
    match name.to_ascii_lowercase().as_str() {
        "normal" => Some(FontVariant::Normal),
        "small-caps" => Some(FontVariant::SmallCaps),
        _ => None,
    }
}

/// Weight from a term, relative keywords applied against `current`.
fn weight_from_term(term: &Term, current: FontWeight) -> Option<FontWeight> {
    match term {
        Term::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "normal" => Some(FontWeight::NORMAL),
            "bold" => Some(FontWeight::BOLD),
            "bolder" => Some(current.bolder()),
            "lighter" => Some(current.lighter()),
            _ => None,
        },
        Term::Number { value, int: true } => {
            let value = *value as i32;
            if (100..=900).contains(&value) {
                Some(FontWeight(value as u16))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Size in points from a keyword, percentage, or length term.
///
/// `larger` and `smaller` step through the keyword size table relative to
/// the parent size; percentages are relative to the parent size; lengths
/// convert from device pixels to points through the resolution.
fn size_from_term(term: &Term, parent_points: f64, metrics: &LengthMetrics) -> Option<f64> {
    match term {
        Term::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "xx-small" => Some(FONT_SIZES[0]),
            "x-small" => Some(FONT_SIZES[1]),
            "small" => Some(FONT_SIZES[2]),
            "medium" => Some(FONT_SIZES[3]),
            "large" => Some(FONT_SIZES[4]),
            "x-large" => Some(FONT_SIZES[5]),
            "xx-large" => Some(FONT_SIZES[6]),
            "larger" => Some(
                FONT_SIZES
                    .iter()
                    .copied()
                    .find(|&size| size > parent_points)
                    .unwrap_or(parent_points),
            ),
            "smaller" => Some(
                FONT_SIZES
                    .iter()
                    .copied()
                    .rev()
                    .find(|&size| size < parent_points)
                    .unwrap_or(parent_points),
            ),
            _ => None,
        },
        Term::Percentage(pct) => Some(parent_points * *pct as f64 / 100.0),
        // point sizes are already in the font's own unit
        Term::Dimension { value, unit } if unit == "pt" => Some(*value as f64),
        _ => match length_from_term(term, metrics) {
            TermResult::Found(px) => Some(px * 72.0 / metrics.resolution),
            _ => None,
        },
    }
}

/// A comma-separated family list; adjacent identifiers join with spaces.
fn family_from_terms(terms: &[Term]) -> Option<Vec<String>> {
    let mut families = Vec::new();
    let mut current = String::new();
    for term in terms {
        match term {
            Term::Comma => {
                if current.is_empty() {
                    return None;
                }
                families.push(std::mem::take(&mut current));
            }
            Term::Ident(name) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(name);
            }
            Term::Str(name) => {
                if !current.is_empty() {
                    return None;
                }
                current = name.clone();
            }
            _ => return None,
        }
    }
    if current.is_empty() {
        return None;
    }
    families.push(current);
    Some(families)
}

/// Parses the `font` shorthand. Unspecified style/variant/weight reset to
/// their defaults, as the shorthand demands.
fn shorthand_from_terms(
    terms: &[Term],
    parent: &FontDescription,
    metrics: &LengthMetrics,
) -> Option<FontDescription> {
    let mut style = FontStyle::Normal;
    let mut variant = FontVariant::Normal;
    let mut weight = FontWeight::NORMAL;

    let mut index = 0;
    while index < terms.len() {
        let term = &terms[index];
        let consumed = match term {
            Term::Ident(name) => {
                if name.eq_ignore_ascii_case("normal") {
                    true
                } else if let Some(parsed) = style_from_ident(name) {
                    style = parsed;
                    true
                } else if let Some(parsed) = variant_from_ident(name) {
                    variant = parsed;
                    true
                } else if matches!(
                    name.to_ascii_lowercase().as_str(),
                    "bold" | "bolder" | "lighter"
                ) {
                    weight = weight_from_term(term, weight)?;
                    true
                } else {
                    false
                }
            }
            Term::Number { int: true, .. } => match weight_from_term(term, weight) {
                Some(parsed) => {
                    weight = parsed;
                    true
                }
                None => false,
            },
            _ => false,
        };
        if !consumed {
            break;
        }
        index += 1;
    }

    let size_points = size_from_term(terms.get(index)?, parent.size_points, metrics)?;
    index += 1;

    if matches!(terms.get(index), Some(Term::Slash)) {
        // line-height is not part of the font model here
        terms.get(index + 1)?;
        index += 2;
    }

    let family = family_from_terms(&terms[index..])?;

    Some(FontDescription {
        family,
        style,
        variant,
        weight,
        size_points,
    })
}

// ============================================================================
// Cascade walk
// ============================================================================

/// Computes the node's font: the parent font (or the context default)
/// with matched font declarations applied in cascade order.
pub(crate) fn resolve_font(node: &ThemeNode) -> FontDescription {
    let parent_font = match node.parent() {
        Some(parent) => parent.get_font().clone(),
        None => node
            .context()
            .map(|ctx| ctx.font())
            .unwrap_or_default(),
    };
    let metrics = LengthMetrics {
        resolution: node.resolution(),
        scale_factor: node.scale_factor(),
        // em in a font-size refers to the inherited size
        font_size_px: parent_font.size_points * node.resolution() / 72.0,
    };

    let mut font = parent_font.clone();
    for matched in node.declarations() {
        let declaration = &matched.declaration;
        let terms = &declaration.terms;
        let inherit = declaration.is_inherit();
        match declaration.property.as_str() {
            "font" => {
                if inherit {
                    font = parent_font.clone();
                } else if let Some(parsed) = shorthand_from_terms(terms, &parent_font, &metrics) {
                    font = parsed;
                }
            }
            "font-family" => {
                if inherit {
                    font.family = parent_font.family.clone();
                } else if let Some(family) = family_from_terms(terms) {
                    font.family = family;
                }
            }
            "font-size" => {
                if inherit {
                    font.size_points = parent_font.size_points;
                } else if let Some(size) = terms
                    .first()
                    .and_then(|t| size_from_term(t, parent_font.size_points, &metrics))
                {
                    font.size_points = size;
                }
            }
            "font-style" => {
                if inherit {
                    font.style = parent_font.style;
                } else if let Some(style) = terms.first().and_then(|t| match t {
                    Term::Ident(name) => style_from_ident(name),
                    _ => None,
                }) {
                    font.style = style;
                }
            }
            "font-variant" => {
                if inherit {
                    font.variant = parent_font.variant;
                } else if let Some(variant) = terms.first().and_then(|t| match t {
                    Term::Ident(name) => variant_from_ident(name),
                    _ => None,
                }) {
                    font.variant = variant;
                }
            }
            "font-weight" => {
                if inherit {
                    font.weight = parent_font.weight;
                } else if let Some(weight) = terms
                    .first()
                    .and_then(|t| weight_from_term(t, font.weight))
                {
                    font.weight = weight;
                }
            }
            _ => {}
        }
    }
    font
}
