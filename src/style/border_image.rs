//! Border images
//!
//! The `border-image` shorthand as the toolkit uses it: an image URL plus
//! up to four slice widths with the standard box expansion.

use crate::css::Term;
use crate::style::values::{expand_box_values, resolve_url};
use crate::style::TermResult;
use std::path::{Path, PathBuf};

/// A 9-slice border image: source file plus slice widths in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderImage {
    pub source: PathBuf,
    pub border_top: i32,
    pub border_right: i32,
    pub border_bottom: i32,
    pub border_left: i32,
}

/// Interprets a declaration's terms as a border image.
pub(crate) fn border_image_from_terms(
    terms: &[Term],
    base_dir: Option<&Path>,
) -> TermResult<BorderImage> {
    let Some(first) = terms.first() else {
        return TermResult::NotFound;
    };
    if first.is_inherit() {
        return TermResult::Inherit;
    }
    if matches!(first, Term::Ident(name) if name.eq_ignore_ascii_case("none")) {
        return TermResult::NotFound;
    }

    let mut source: Option<PathBuf> = None;
    let mut widths: Vec<i32> = Vec::new();
    for term in terms {
        match term {
            Term::Url(href) => {
                if source.is_none() {
                    source = resolve_url(href, base_dir);
                }
            }
            Term::Number { value, .. } => widths.push((value.round() as i32).max(0)),
            other => {
                tracing::debug!(term = ?other, "unexpected term in border-image value");
            }
        }
    }

    let Some(source) = source else {
        return TermResult::NotFound;
    };
    let [border_top, border_right, border_bottom, border_left] = if widths.is_empty() {
        [0; 4]
    } else {
        match expand_box_values(&widths) {
            Some(widths) => widths,
            None => return TermResult::NotFound,
        }
    };

    TermResult::Found(BorderImage {
        source,
        border_top,
        border_right,
        border_bottom,
        border_left,
    })
}
