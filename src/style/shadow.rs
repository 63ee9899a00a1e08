//! Shadow values
//!
//! Resolves `box-shadow` / `text-shadow` style declarations: a color
//! anywhere in the term list, two mandatory offsets, optional blur and
//! spread, and the `inset` keyword.

use crate::css::Term;
use crate::style::color::{color_from_term, Color};
use crate::style::values::{length_from_term, LengthMetrics};
use crate::style::TermResult;

/// A resolved shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub xoffset: f64,
    pub yoffset: f64,
    pub blur: f64,
    pub spread: f64,
    pub inset: bool,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            xoffset: 0.0,
            yoffset: 0.0,
            blur: 0.0,
            spread: 0.0,
            inset: false,
        }
    }
}

/// Interprets a declaration's terms as a shadow.
///
/// Fails (`NotFound`) when fewer than two offsets are present or the
/// value is `none`. Without an explicit color the shadow is black.
pub(crate) fn shadow_from_terms(terms: &[Term], metrics: &LengthMetrics) -> TermResult<Shadow> {
    let Some(first) = terms.first() else {
        return TermResult::NotFound;
    };
    if first.is_inherit() {
        return TermResult::Inherit;
    }
    if matches!(first, Term::Ident(name) if name.eq_ignore_ascii_case("none")) {
        return TermResult::NotFound;
    }

    let mut color: Option<Color> = None;
    let mut inset = false;
    let mut lengths: Vec<f64> = Vec::new();

    for term in terms {
        match term {
            // only the first shadow of a comma-separated list is used
            Term::Comma => break,
            Term::Ident(name) if name.eq_ignore_ascii_case("inset") => inset = true,
            // bare numbers are tolerated as pixel offsets
            Term::Number { value, .. } if lengths.len() < 4 => {
                lengths.push(*value as f64 * metrics.scale_factor);
            }
            Term::Dimension { .. } if lengths.len() < 4 => {
                match length_from_term(term, metrics) {
                    TermResult::Found(px) => lengths.push(px),
                    _ => return TermResult::NotFound,
                }
            }
            other => {
                if color.is_none() {
                    if let Some(parsed) = color_from_term(other) {
                        color = Some(parsed);
                        continue;
                    }
                }
                tracing::debug!(term = ?other, "unexpected term in shadow value");
            }
        }
    }

    if lengths.len() < 2 {
        return TermResult::NotFound;
    }

    TermResult::Found(Shadow {
        color: color.unwrap_or(Color::BLACK),
        xoffset: lengths[0],
        yoffset: lengths[1],
        blur: lengths.get(2).copied().unwrap_or(0.0).max(0.0),
        spread: lengths.get(3).copied().unwrap_or(0.0).max(0.0),
        inset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: LengthMetrics = LengthMetrics {
        resolution: 96.0,
        scale_factor: 1.0,
        font_size_px: 16.0,
    };

    fn px(value: f32) -> Term {
        Term::Dimension {
            value,
            unit: "px".to_string(),
        }
    }

    fn ident(name: &str) -> Term {
        Term::Ident(name.to_string())
    }

    #[test]
    fn full_shadow() {
        let terms = vec![ident("black"), px(1.0), px(2.0), px(3.0), px(4.0), ident("inset")];
        let shadow = match shadow_from_terms(&terms, &METRICS) {
            TermResult::Found(shadow) => shadow,
            other => panic!("expected shadow, got {:?}", other),
        };
        assert_eq!(shadow.color, Color::BLACK);
        assert_eq!(shadow.xoffset, 1.0);
        assert_eq!(shadow.yoffset, 2.0);
        assert_eq!(shadow.blur, 3.0);
        assert_eq!(shadow.spread, 4.0);
        assert!(shadow.inset);
    }

    #[test]
    fn color_may_trail_the_offsets() {
        let terms = vec![px(1.0), px(2.0), Term::HexColor("f00".to_string())];
        let shadow = match shadow_from_terms(&terms, &METRICS) {
            TermResult::Found(shadow) => shadow,
            other => panic!("expected shadow, got {:?}", other),
        };
        assert_eq!(shadow.color, Color::rgb(255, 0, 0));
        assert!(!shadow.inset);
    }

    #[test]
    fn missing_offset_fails() {
        assert_eq!(
            shadow_from_terms(&[ident("black"), px(1.0)], &METRICS),
            TermResult::NotFound
        );
        assert_eq!(shadow_from_terms(&[], &METRICS), TermResult::NotFound);
    }

    #[test]
    fn none_and_inherit() {
        assert_eq!(
            shadow_from_terms(&[ident("none")], &METRICS),
            TermResult::NotFound
        );
        assert_eq!(
            shadow_from_terms(&[ident("inherit")], &METRICS),
            TermResult::Inherit
        );
    }

    #[test]
    fn bare_zero_offsets_and_negative_blur_clamp() {
        let terms = vec![
            Term::Number { value: 0.0, int: true },
            Term::Number { value: 1.0, int: true },
            px(-4.0),
        ];
        let shadow = match shadow_from_terms(&terms, &METRICS) {
            TermResult::Found(shadow) => shadow,
            other => panic!("expected shadow, got {:?}", other),
        };
        assert_eq!(shadow.xoffset, 0.0);
        assert_eq!(shadow.yoffset, 1.0);
        assert_eq!(shadow.blur, 0.0);
        assert_eq!(shadow.color, Color::BLACK);
    }

    #[test]
    fn only_first_comma_separated_shadow_is_used() {
        let terms = vec![
            px(1.0),
            px(1.0),
            Term::Comma,
            px(9.0),
            px(9.0),
            ident("red"),
        ];
        let shadow = match shadow_from_terms(&terms, &METRICS) {
            TermResult::Found(shadow) => shadow,
            other => panic!("expected shadow, got {:?}", other),
        };
        assert_eq!(shadow.xoffset, 1.0);
        assert_eq!(shadow.color, Color::BLACK);
    }
}
