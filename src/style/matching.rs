//! Selector matching
//!
//! Matches compound selectors against a theme node and its ancestor
//! chain, right-to-left: the right-most simple selector must match the
//! node itself, then each combinator steers where the next one is tried.
//! The descendant combinator scans upward and commits to the first
//! ancestor that matches; there is no backtracking. Sibling combinators
//! and attribute components parse but never match — nodes only know
//! their parents.

use crate::css::{Combinator, Selector, SelectorComponent, SelectorPart, SimpleElement};
use crate::style::node::ThemeNode;

/// Tests a compound selector against a node.
pub(crate) fn selector_matches(node: &ThemeNode, selector: &Selector) -> bool {
    #[cfg(test)]
    probe::record_call();

    if selector.parts.is_empty() {
        return false;
    }
    match_suffix(node, &selector.parts)
}

fn match_suffix(node: &ThemeNode, parts: &[SelectorPart]) -> bool {
    let Some((part, rest)) = parts.split_last() else {
        return true;
    };
    if !part_matches(node, part) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match part.combinator {
        // a chain break; nothing further to require
        Combinator::None => true,
        Combinator::Child => match node.parent() {
            Some(parent) => match_suffix(parent, rest),
            None => false,
        },
        Combinator::Descendant => {
            let Some(previous) = rest.last() else {
                return true;
            };
            let mut ancestor = node.parent();
            while let Some(candidate) = ancestor {
                if part_matches(candidate, previous) {
                    return match_suffix(candidate, rest);
                }
                ancestor = candidate.parent();
            }
            false
        }
        Combinator::Sibling => {
            tracing::debug!("sibling combinators are not supported and never match");
            false
        }
    }
}

fn part_matches(node: &ThemeNode, part: &SelectorPart) -> bool {
    match &part.element {
        SimpleElement::Universal => {}
        SimpleElement::Named(name) => {
            if !node.element_type_matches(name) {
                return false;
            }
        }
    }
    part.components
        .iter()
        .all(|component| component_matches(node, component))
}

fn component_matches(node: &ThemeNode, component: &SelectorComponent) -> bool {
    match component {
        SelectorComponent::Id(id) => node.element_id() == Some(id.as_str()),
        SelectorComponent::Class(class) => {
            node.element_classes().iter().any(|c| c == class)
        }
        SelectorComponent::PseudoClass(pseudo) => {
            node.pseudo_classes().iter().any(|p| p == pseudo)
        }
        SelectorComponent::Unsupported(text) => {
            tracing::debug!(component = %text, "unsupported selector component never matches");
            false
        }
    }
}

/// Call-count probe for cache tests.
#[cfg(test)]
pub(crate) mod probe {
    use std::cell::Cell;

    thread_local! {
        static MATCH_CALLS: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn record_call() {
        MATCH_CALLS.with(|calls| calls.set(calls.get() + 1));
    }

    pub(crate) fn call_count() -> usize {
        MATCH_CALLS.with(|calls| calls.get())
    }

    pub(crate) fn reset() {
        MATCH_CALLS.with(|calls| calls.set(0));
    }
}
