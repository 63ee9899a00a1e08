//! Length and numeric values
//!
//! Resolves declaration terms to device pixels and plain numbers, and
//! provides the 1/2/3/4-value box expansion shared by the shorthand
//! properties.
//!
//! # Units
//!
//! - `px` scales by the context scale factor
//! - `pt`, `in`, `cm`, `mm`, `pc` convert through the context resolution
//!   (dots per inch, `resolution / 72` px per point)
//! - `em` is the node's resolved font size; `ex` approximates the
//!   x-height as half an em
//! - percentages are not supported for generic lengths

use crate::css::Term;
use crate::style::TermResult;

/// Length units understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Pt,
    In,
    Cm,
    Mm,
    Pc,
    Em,
    Ex,
}

impl LengthUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "px" => Some(Self::Px),
            "pt" => Some(Self::Pt),
            "in" => Some(Self::In),
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            "pc" => Some(Self::Pc),
            "em" => Some(Self::Em),
            "ex" => Some(Self::Ex),
            _ => None,
        }
    }

    /// True for physical units resolved through the output resolution.
    pub fn is_physical(self) -> bool {
        matches!(self, Self::Pt | Self::In | Self::Cm | Self::Mm | Self::Pc)
    }

    /// True for units relative to the resolved font size.
    pub fn is_font_relative(self) -> bool {
        matches!(self, Self::Em | Self::Ex)
    }
}

/// Inputs needed to resolve a length term to device pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LengthMetrics {
    /// Dots per inch.
    pub resolution: f64,
    /// Device pixels per logical pixel.
    pub scale_factor: f64,
    /// The node's resolved font size in device pixels (for em/ex).
    pub font_size_px: f64,
}

/// Resolves one term to device pixels.
pub(crate) fn length_from_term(term: &Term, metrics: &LengthMetrics) -> TermResult<f64> {
    match term {
        Term::Ident(name) if name.eq_ignore_ascii_case("inherit") => TermResult::Inherit,
        // bare 0 is the only unitless length
        Term::Number { value, .. } if *value == 0.0 => TermResult::Found(0.0),
        Term::Dimension { value, unit } => match LengthUnit::parse(unit) {
            Some(unit) => TermResult::Found(resolve_unit(*value as f64, unit, metrics)),
            None => {
                tracing::debug!(unit, "unknown length unit");
                TermResult::NotFound
            }
        },
        Term::Percentage(_) => {
            tracing::warn!("percentage lengths are not supported here");
            TermResult::NotFound
        }
        _ => TermResult::NotFound,
    }
}

fn resolve_unit(value: f64, unit: LengthUnit, metrics: &LengthMetrics) -> f64 {
    match unit {
        LengthUnit::Px => value * metrics.scale_factor,
        LengthUnit::Pt => value * metrics.resolution / 72.0,
        LengthUnit::In => value * metrics.resolution,
        LengthUnit::Cm => value * metrics.resolution / 2.54,
        LengthUnit::Mm => value * metrics.resolution / 25.4,
        LengthUnit::Pc => value * metrics.resolution / 6.0,
        LengthUnit::Em => value * metrics.font_size_px,
        // x-height approximated without font metrics
        LengthUnit::Ex => value * metrics.font_size_px * 0.5,
    }
}

/// Resolves a declaration's terms as a single length.
pub(crate) fn length_from_terms(terms: &[Term], metrics: &LengthMetrics) -> TermResult<f64> {
    match terms.first() {
        Some(term) => length_from_term(term, metrics),
        None => TermResult::NotFound,
    }
}

/// Resolves one term to a plain number.
pub(crate) fn double_from_term(term: &Term) -> TermResult<f64> {
    match term {
        Term::Ident(name) if name.eq_ignore_ascii_case("inherit") => TermResult::Inherit,
        Term::Number { value, .. } => TermResult::Found(*value as f64),
        _ => TermResult::NotFound,
    }
}

/// Resolves a declaration's terms as a single number.
pub(crate) fn double_from_terms(terms: &[Term]) -> TermResult<f64> {
    match terms.first() {
        Some(term) => double_from_term(term),
        None => TermResult::NotFound,
    }
}

/// Resolves a `url(...)` reference against the directory of the
/// stylesheet that declared it. Remote schemes are rejected.
pub(crate) fn resolve_url(href: &str, base_dir: Option<&std::path::Path>) -> Option<std::path::PathBuf> {
    if href.contains("://") || href.starts_with("http:") || href.starts_with("https:") {
        tracing::warn!(href, "remote asset URLs are not supported");
        return None;
    }
    let path = std::path::Path::new(href);
    if path.is_absolute() {
        return Some(path.to_path_buf());
    }
    match base_dir {
        Some(dir) => Some(dir.join(path)),
        None => Some(path.to_path_buf()),
    }
}

/// Standard CSS box expansion: 1 value applies to all sides; 2 to
/// (top/bottom, left/right); 3 to (top, left/right, bottom); 4 to
/// (top, right, bottom, left). Result order is CSS side order.
pub(crate) fn expand_box_values<T: Copy>(values: &[T]) -> Option<[T; 4]> {
    match values {
        [all] => Some([*all; 4]),
        [vertical, horizontal] => Some([*vertical, *horizontal, *vertical, *horizontal]),
        [top, horizontal, bottom] => Some([*top, *horizontal, *bottom, *horizontal]),
        [top, right, bottom, left] => Some([*top, *right, *bottom, *left]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: LengthMetrics = LengthMetrics {
        resolution: 96.0,
        scale_factor: 1.0,
        font_size_px: 16.0,
    };

    fn dim(value: f32, unit: &str) -> Term {
        Term::Dimension {
            value,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn px_scales_with_scale_factor() {
        let metrics = LengthMetrics {
            scale_factor: 2.0,
            ..METRICS
        };
        assert_eq!(
            length_from_term(&dim(10.0, "px"), &metrics),
            TermResult::Found(20.0)
        );
    }

    #[test]
    fn physical_units_resolve_through_resolution() {
        assert_eq!(
            length_from_term(&dim(72.0, "pt"), &METRICS),
            TermResult::Found(96.0)
        );
        assert_eq!(
            length_from_term(&dim(1.0, "in"), &METRICS),
            TermResult::Found(96.0)
        );
        assert_eq!(
            length_from_term(&dim(6.0, "pc"), &METRICS),
            TermResult::Found(96.0)
        );
    }

    #[test]
    fn em_and_ex_use_font_size() {
        assert_eq!(
            length_from_term(&dim(2.0, "em"), &METRICS),
            TermResult::Found(32.0)
        );
        assert_eq!(
            length_from_term(&dim(2.0, "ex"), &METRICS),
            TermResult::Found(16.0)
        );
    }

    #[test]
    fn bare_zero_is_a_length_but_other_numbers_are_not() {
        assert_eq!(
            length_from_term(&Term::Number { value: 0.0, int: true }, &METRICS),
            TermResult::Found(0.0)
        );
        assert_eq!(
            length_from_term(&Term::Number { value: 5.0, int: true }, &METRICS),
            TermResult::NotFound
        );
    }

    #[test]
    fn percentages_are_not_generic_lengths() {
        assert_eq!(
            length_from_term(&Term::Percentage(50.0), &METRICS),
            TermResult::NotFound
        );
    }

    #[test]
    fn inherit_is_reported() {
        assert_eq!(
            length_from_term(&Term::Ident("inherit".to_string()), &METRICS),
            TermResult::Inherit
        );
    }

    #[test]
    fn box_expansion() {
        assert_eq!(expand_box_values(&[1]), Some([1, 1, 1, 1]));
        assert_eq!(expand_box_values(&[1, 2]), Some([1, 2, 1, 2]));
        assert_eq!(expand_box_values(&[1, 2, 3]), Some([1, 2, 3, 2]));
        assert_eq!(expand_box_values(&[1, 2, 3, 4]), Some([1, 2, 3, 4]));
        assert_eq!(expand_box_values::<i32>(&[]), None);
        assert_eq!(expand_box_values(&[1, 2, 3, 4, 5]), None);
    }
}
