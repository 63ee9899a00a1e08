//! CSS parsing and types
//!
//! This module handles parsing the stylesheet subset understood by the
//! engine and provides types for representing rules, selectors, and
//! declaration terms.

pub mod parser;
pub mod types;

pub use parser::{parse_declaration_list, parse_stylesheet};
pub use types::{
    Combinator, CssParseResult, Declaration, Rule, Selector, SelectorComponent, SelectorPart,
    SimpleElement, StyleRule, Stylesheet, Term,
};
