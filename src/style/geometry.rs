//! Box geometry resolution
//!
//! The geometry feature group: widths and heights, paddings, margins,
//! borders, and corner radii, with the standard 1/2/3/4-value shorthand
//! expansion. Negative paddings, border widths, and radii clamp to zero.

use crate::css::Term;
use crate::style::color::{color_from_term, color_from_terms, Color};
use crate::style::node::ThemeNode;
use crate::style::values::{expand_box_values, length_from_term, LengthMetrics};
use crate::style::TermResult;

/// Resolved box geometry for one node, in device pixels.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Geometry {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    /// CSS side order: top, right, bottom, left.
    pub padding: [f64; 4],
    pub margin: [f64; 4],
    pub border_width: [f64; 4],
    pub border_color: [Color; 4],
    /// Clockwise from top-left.
    pub border_radius: [f64; 4],
}

/// Keywords of the `border` shorthand that carry no information here.
fn is_border_style_keyword(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "solid" | "dashed" | "dotted" | "double" | "groove" | "ridge" | "inset" | "outset"
    )
}

/// Every term resolved as a length, or nothing.
fn lengths_from_terms(terms: &[Term], metrics: &LengthMetrics) -> Option<Vec<f64>> {
    let mut lengths = Vec::with_capacity(terms.len());
    for term in terms {
        match length_from_term(term, metrics) {
            TermResult::Found(px) => lengths.push(px),
            _ => return None,
        }
    }
    if lengths.is_empty() { None } else { Some(lengths) }
}

fn expanded_lengths(
    terms: &[Term],
    metrics: &LengthMetrics,
    clamp: bool,
) -> Option<[f64; 4]> {
    let mut lengths = lengths_from_terms(terms, metrics)?;
    if clamp {
        for length in &mut lengths {
            if *length < 0.0 {
                tracing::warn!("negative length clamped to 0");
                *length = 0.0;
            }
        }
    }
    expand_box_values(&lengths)
}

fn single_length(terms: &[Term], metrics: &LengthMetrics, clamp: bool) -> Option<f64> {
    match terms {
        [term] => match length_from_term(term, metrics) {
            TermResult::Found(px) => {
                if clamp && px < 0.0 {
                    tracing::warn!("negative length clamped to 0");
                    Some(0.0)
                } else {
                    Some(px)
                }
            }
            _ => None,
        },
        _ => None,
    }
}

/// The `border` shorthand value: optional width, optional color, style
/// keywords skipped. `none` zeroes the width.
fn parse_border_shorthand(
    terms: &[Term],
    metrics: &LengthMetrics,
) -> (Option<f64>, Option<Color>) {
    let mut width = None;
    let mut color = None;
    for term in terms {
        match term {
            Term::Ident(name) if is_border_style_keyword(name) => {}
            Term::Ident(name)
                if name.eq_ignore_ascii_case("none") || name.eq_ignore_ascii_case("hidden") =>
            {
                width = Some(0.0);
            }
            term => {
                if let TermResult::Found(px) = length_from_term(term, metrics) {
                    width = Some(px.max(0.0));
                } else if let Some(parsed) = color_from_term(term) {
                    color = Some(parsed);
                } else {
                    tracing::debug!(term = ?term, "unexpected term in border value");
                }
            }
        }
    }
    (width, color)
}

fn side_index(property: &str) -> Option<usize> {
    match property {
        "top" => Some(0),
        "right" => Some(1),
        "bottom" => Some(2),
        "left" => Some(3),
        _ => None,
    }
}

/// Computes the node's geometry by walking its matched declarations in
/// cascade order, lowest priority first.
pub(crate) fn resolve_geometry(node: &ThemeNode) -> Geometry {
    let metrics = node.length_metrics();
    let mut geometry = Geometry::default();
    let parent_geometry = node.parent().map(|parent| parent.geometry().clone());

    for matched in node.declarations() {
        let declaration = &matched.declaration;
        let property = declaration.property.as_str();
        let terms = &declaration.terms;
        let inherit = declaration.is_inherit();

        match property {
            "width" | "height" | "min-width" | "min-height" | "max-width" | "max-height" => {
                let slot = match property {
                    "width" => &mut geometry.width,
                    "height" => &mut geometry.height,
                    "min-width" => &mut geometry.min_width,
                    "min-height" => &mut geometry.min_height,
                    "max-width" => &mut geometry.max_width,
                    _ => &mut geometry.max_height,
                };
                if inherit {
                    if let Some(parent) = &parent_geometry {
                        *slot = match property {
                            "width" => parent.width,
                            "height" => parent.height,
                            "min-width" => parent.min_width,
                            "min-height" => parent.min_height,
                            "max-width" => parent.max_width,
                            _ => parent.max_height,
                        };
                    }
                } else if matches!(terms.first(), Some(Term::Ident(name)) if name.eq_ignore_ascii_case("auto"))
                {
                    *slot = None;
                } else if let Some(px) = single_length(terms, &metrics, true) {
                    *slot = Some(px);
                }
            }
            "padding" => {
                if inherit {
                    if let Some(parent) = &parent_geometry {
                        geometry.padding = parent.padding;
                    }
                } else if let Some(sides) = expanded_lengths(terms, &metrics, true) {
                    geometry.padding = sides;
                }
            }
            "margin" => {
                if inherit {
                    if let Some(parent) = &parent_geometry {
                        geometry.margin = parent.margin;
                    }
                } else if let Some(sides) = expanded_lengths(terms, &metrics, false) {
                    geometry.margin = sides;
                }
            }
            "border-width" => {
                if let Some(sides) = expanded_lengths(terms, &metrics, true) {
                    geometry.border_width = sides;
                }
            }
            "border-color" => {
                let colors: Vec<Color> = terms
                    .iter()
                    .filter_map(color_from_term)
                    .collect();
                if colors.len() == terms.len() {
                    if let Some(sides) = expand_box_values(&colors) {
                        geometry.border_color = sides;
                    }
                }
            }
            "border" => {
                if inherit {
                    if let Some(parent) = &parent_geometry {
                        geometry.border_width = parent.border_width;
                        geometry.border_color = parent.border_color;
                    }
                    continue;
                }
                let (width, color) = parse_border_shorthand(terms, &metrics);
                if let Some(width) = width {
                    geometry.border_width = [width; 4];
                }
                if let Some(color) = color {
                    geometry.border_color = [color; 4];
                }
            }
            "border-radius" => {
                if inherit {
                    if let Some(parent) = &parent_geometry {
                        geometry.border_radius = parent.border_radius;
                    }
                } else if let Some(corners) = expanded_lengths(terms, &metrics, true) {
                    geometry.border_radius = corners;
                }
            }
            _ => {
                // longhand side and corner properties
                if let Some(rest) = property.strip_prefix("padding-") {
                    if let (Some(index), Some(px)) =
                        (side_index(rest), single_length(terms, &metrics, true))
                    {
                        geometry.padding[index] = px;
                    }
                } else if let Some(rest) = property.strip_prefix("margin-") {
                    if let (Some(index), Some(px)) =
                        (side_index(rest), single_length(terms, &metrics, false))
                    {
                        geometry.margin[index] = px;
                    }
                } else if let Some(rest) = property.strip_prefix("border-") {
                    apply_border_longhand(&mut geometry, rest, terms, &metrics);
                }
            }
        }
    }

    geometry
}

fn corner_index(rest: &str) -> Option<usize> {
    match rest {
        "top-left-radius" => Some(0),
        "top-right-radius" => Some(1),
        "bottom-right-radius" => Some(2),
        "bottom-left-radius" => Some(3),
        _ => None,
    }
}

fn apply_border_longhand(
    geometry: &mut Geometry,
    rest: &str,
    terms: &[Term],
    metrics: &LengthMetrics,
) {
    if let Some(index) = corner_index(rest) {
        if let Some(px) = single_length(terms, metrics, true) {
            geometry.border_radius[index] = px;
        }
        return;
    }
    // border-<side> shorthand
    if let Some(index) = side_index(rest) {
        let (width, color) = parse_border_shorthand(terms, metrics);
        if let Some(width) = width {
            geometry.border_width[index] = width;
        }
        if let Some(color) = color {
            geometry.border_color[index] = color;
        }
        return;
    }
    // border-<side>-width / border-<side>-color
    if let Some(side) = rest.strip_suffix("-width") {
        if let (Some(index), Some(px)) = (side_index(side), single_length(terms, metrics, true)) {
            geometry.border_width[index] = px;
        }
    } else if let Some(side) = rest.strip_suffix("-color") {
        if let (Some(index), TermResult::Found(color)) = (side_index(side), color_from_terms(terms))
        {
            geometry.border_color[index] = color;
        }
    }
}
