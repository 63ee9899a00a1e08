//! Cascade resolution
//!
//! Gathers every declaration that matches a node across the theme's
//! stylesheets, orders the result by (origin, specificity), and answers
//! generic property lookups over the ordered list.
//!
//! Ordering: the matched list is stable-sorted ascending by effective
//! origin — the stylesheet tier, bumped one tier by `!important` — then
//! specificity. Document order breaks remaining ties through sort
//! stability. Inline style declarations are appended after the sort, so
//! they outrank every stylesheet declaration. Lookups scan from the end.

use crate::css::{parse_declaration_list, Declaration, Stylesheet};
use crate::style::color::{color_from_terms, Color};
use crate::style::matching::selector_matches;
use crate::style::node::ThemeNode;
use crate::style::shadow::{shadow_from_terms, Shadow};
use crate::style::values::{double_from_terms, length_from_terms};
use crate::style::TermResult;
use std::path::PathBuf;
use std::rc::Rc;

/// Stylesheet priority tier, lowest first. Runtime-loaded custom
/// stylesheets cascade in the application tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Origin {
    /// Built-in defaults.
    Default = 0,
    /// The user's theme.
    Theme = 1,
    /// Application-provided styling, including custom stylesheets.
    Application = 2,
}

/// One declaration matched for a node, tagged for cascade ordering.
#[derive(Debug, Clone)]
pub(crate) struct MatchedDeclaration {
    pub declaration: Rc<Declaration>,
    pub origin: Origin,
    pub important: bool,
    /// Highest specificity among the rule's matching selectors.
    pub specificity: u32,
    /// Directory of the declaring stylesheet, for `url(...)` terms.
    pub base_dir: Option<Rc<PathBuf>>,
}

impl MatchedDeclaration {
    /// `!important` bumps a declaration one tier above its origin.
    fn sort_key(&self) -> (u8, u32) {
        (self.origin as u8 + self.important as u8, self.specificity)
    }
}

/// Computes the node's matched, sorted declaration list.
///
/// Walks the fixed tiers lowest-priority first, then the custom
/// stylesheets. If nothing matched and the node carries the important
/// flag, the theme's fallback stylesheet is consulted instead in a
/// separate non-cascading pass. Inline style comes last, after the sort.
pub(crate) fn matched_declarations(node: &ThemeNode) -> Vec<MatchedDeclaration> {
    let mut matched = Vec::new();

    if let Some(theme) = node.theme() {
        for (origin, stylesheet) in theme.cascade_stylesheets() {
            collect_matched(node, origin, &stylesheet, &mut matched);
        }

        if matched.is_empty() && node.important() {
            if let Some(fallback) = theme.fallback_stylesheet() {
                collect_matched(node, Origin::Default, &fallback, &mut matched);
            }
        }
    }

    matched.sort_by_key(MatchedDeclaration::sort_key);

    if let Some(inline) = node.inline_style() {
        for declaration in parse_declaration_list(inline) {
            let important = declaration.important;
            matched.push(MatchedDeclaration {
                declaration,
                origin: Origin::Application,
                important,
                specificity: 0,
                base_dir: None,
            });
        }
    }

    matched
}

fn collect_matched(
    node: &ThemeNode,
    origin: Origin,
    stylesheet: &Stylesheet,
    out: &mut Vec<MatchedDeclaration>,
) {
    stylesheet.walk_style_rules(&mut |rule, base_dir| {
        let mut best: Option<u32> = None;
        for selector in &rule.selectors {
            if selector_matches(node, selector) {
                let specificity = selector.specificity();
                best = Some(best.map_or(specificity, |b| b.max(specificity)));
            }
        }
        if let Some(specificity) = best {
            for declaration in &rule.declarations {
                out.push(MatchedDeclaration {
                    declaration: declaration.clone(),
                    origin,
                    important: declaration.important,
                    specificity,
                    base_dir: base_dir.cloned(),
                });
            }
        }
    });
}

// ============================================================================
// Generic lookups
// ============================================================================

// Each lookup scans the matched list from the end (highest priority
// first). A declaration whose terms fail conversion is skipped and the
// scan continues; an `inherit` term stops the scan and redirects to the
// parent. With `inherit` set, a property absent everywhere falls back to
// the parent's resolved value.

pub(crate) fn lookup_color(node: &ThemeNode, property: &str, inherit: bool) -> Option<Color> {
    let mut inherit = inherit;
    for matched in node.declarations().iter().rev() {
        if matched.declaration.property != property {
            continue;
        }
        match color_from_terms(&matched.declaration.terms) {
            TermResult::Found(color) => return Some(color),
            TermResult::Inherit => {
                inherit = true;
                break;
            }
            TermResult::NotFound => continue,
        }
    }
    if inherit {
        node.parent()?.lookup_color(property, true)
    } else {
        None
    }
}

pub(crate) fn lookup_length(node: &ThemeNode, property: &str, inherit: bool) -> Option<f64> {
    let mut inherit = inherit;
    let mut metrics = None;
    for matched in node.declarations().iter().rev() {
        if matched.declaration.property != property {
            continue;
        }
        let metrics = metrics.get_or_insert_with(|| node.length_metrics());
        match length_from_terms(&matched.declaration.terms, metrics) {
            TermResult::Found(px) => return Some(px),
            TermResult::Inherit => {
                inherit = true;
                break;
            }
            TermResult::NotFound => continue,
        }
    }
    if inherit {
        node.parent()?.lookup_length(property, true)
    } else {
        None
    }
}

pub(crate) fn lookup_double(node: &ThemeNode, property: &str, inherit: bool) -> Option<f64> {
    let mut inherit = inherit;
    for matched in node.declarations().iter().rev() {
        if matched.declaration.property != property {
            continue;
        }
        match double_from_terms(&matched.declaration.terms) {
            TermResult::Found(value) => return Some(value),
            TermResult::Inherit => {
                inherit = true;
                break;
            }
            TermResult::NotFound => continue,
        }
    }
    if inherit {
        node.parent()?.lookup_double(property, true)
    } else {
        None
    }
}

pub(crate) fn lookup_shadow(node: &ThemeNode, property: &str, inherit: bool) -> Option<Shadow> {
    let mut inherit = inherit;
    let mut metrics = None;
    for matched in node.declarations().iter().rev() {
        if matched.declaration.property != property {
            continue;
        }
        let metrics = metrics.get_or_insert_with(|| node.length_metrics());
        match shadow_from_terms(&matched.declaration.terms, metrics) {
            TermResult::Found(shadow) => return Some(shadow),
            TermResult::Inherit => {
                inherit = true;
                break;
            }
            TermResult::NotFound => continue,
        }
    }
    if inherit {
        node.parent()?.lookup_shadow(property, true)
    } else {
        None
    }
}
