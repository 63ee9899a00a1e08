//! CSS type definitions
//!
//! Core types for representing parsed stylesheets, rules, selectors, and
//! declaration terms.
//!
//! Declarations keep their values as untyped term lists: the cascade
//! interprets terms lazily for whichever type a lookup requests, so the
//! same declaration can be read as a color, a length, or a shadow input
//! without reparsing text.

use crate::error::{Error, ImportError, ParseError};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

// ============================================================================
// Selectors
// ============================================================================

/// Relationship between a simple selector and the one to its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// First simple selector of a chain.
    None,
    /// Whitespace: matches any ancestor.
    Descendant,
    /// `>`: matches the immediate parent only.
    Child,
    /// `+` / `~`: parsed but never matches (nodes have no sibling links).
    Sibling,
}

/// The element-type portion of a simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleElement {
    /// `*`, or an omitted type (`.foo` is `*.foo`).
    Universal,
    /// A named element type, matched through the type hierarchy.
    Named(String),
}

/// An additional constraint on a simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorComponent {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `:pseudo`
    PseudoClass(String),
    /// A construct the engine parses past but never matches
    /// (attribute selectors, functional pseudo-classes, pseudo-elements).
    Unsupported(String),
}

/// One simple selector in a compound chain: element type plus components,
/// linked to the previous simple selector by a combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPart {
    pub combinator: Combinator,
    pub element: SimpleElement,
    pub components: Vec<SelectorComponent>,
}

/// A compound selector: simple selectors stored left-to-right.
///
/// Matching proceeds from the right-most part; see `style::matching`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// Specificity packed as `(ids, classes + pseudo-classes, types)`,
    /// each field wide enough that realistic selectors cannot carry
    /// between fields.
    pub fn specificity(&self) -> u32 {
        let mut ids = 0u32;
        let mut classes = 0u32;
        let mut types = 0u32;
        for part in &self.parts {
            if let SimpleElement::Named(_) = part.element {
                types += 1;
            }
            for component in &part.components {
                match component {
                    SelectorComponent::Id(_) => ids += 1,
                    SelectorComponent::Class(_) | SelectorComponent::PseudoClass(_) => classes += 1,
                    SelectorComponent::Unsupported(_) => {}
                }
            }
        }
        (ids << 20) | (classes.min(0x3ff) << 10) | types.min(0x3ff)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part.combinator {
                Combinator::None => {}
                Combinator::Descendant => write!(f, " ")?,
                Combinator::Child => write!(f, " > ")?,
                Combinator::Sibling => write!(f, " + ")?,
            }
            match &part.element {
                SimpleElement::Universal => write!(f, "*")?,
                SimpleElement::Named(name) => write!(f, "{}", name)?,
            }
            for component in &part.components {
                match component {
                    SelectorComponent::Id(id) => write!(f, "#{}", id)?,
                    SelectorComponent::Class(class) => write!(f, ".{}", class)?,
                    SelectorComponent::PseudoClass(pseudo) => write!(f, ":{}", pseudo)?,
                    SelectorComponent::Unsupported(text) => write!(f, "{}", text)?,
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Declarations and terms
// ============================================================================

/// A single parsed value token within a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Bare identifier (`bold`, `inherit`, `transparent`, ...)
    Ident(String),
    /// Quoted string
    Str(String),
    /// Unitless number; `int` records whether the source wrote an integer
    Number { value: f32, int: bool },
    /// Percentage, stored in percent units (50% → 50.0)
    Percentage(f32),
    /// Number with a unit; the unit is kept raw and interpreted per lookup
    Dimension { value: f32, unit: String },
    /// `#rgb` / `#rrggbb`, digits only
    HexColor(String),
    /// `url(...)`, unresolved
    Url(String),
    /// Function call such as `rgb(...)` with its argument terms
    Function { name: String, args: Vec<Term> },
    /// `,` separator
    Comma,
    /// `/` separator
    Slash,
}

impl Term {
    /// Returns true for the `inherit` keyword.
    pub fn is_inherit(&self) -> bool {
        matches!(self, Term::Ident(name) if name.eq_ignore_ascii_case("inherit"))
    }
}

/// A `property: terms [!important]` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub terms: Vec<Term>,
    pub important: bool,
}

impl Declaration {
    /// True when the declaration's whole value is the `inherit` keyword.
    pub fn is_inherit(&self) -> bool {
        self.terms.first().is_some_and(Term::is_inherit)
    }
}

// ============================================================================
// Rules and stylesheets
// ============================================================================

/// A selector list with its declaration block.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Rc<Declaration>>,
}

/// Load state of one `@import`, resolved at most once.
#[derive(Debug)]
enum ImportState {
    Pending,
    Loaded(Rc<Stylesheet>),
    Failed,
}

/// An `@import url(...)` rule.
///
/// The target is resolved and parsed lazily on the first cascade walk;
/// success or failure is cached so a broken import is never retried.
#[derive(Debug)]
pub struct ImportRule {
    pub href: String,
    state: RefCell<ImportState>,
}

impl ImportRule {
    pub(crate) fn new(href: String) -> Self {
        Self {
            href,
            state: RefCell::new(ImportState::Pending),
        }
    }

    /// Resolves and parses the imported stylesheet, caching the outcome.
    ///
    /// Returns `None` when the import failed (unsupported scheme,
    /// unresolvable path, unreadable file).
    fn ensure_loaded(&self, base_dir: Option<&Rc<PathBuf>>) -> Option<Rc<Stylesheet>> {
        {
            let state = self.state.borrow();
            match &*state {
                ImportState::Loaded(sheet) => return Some(sheet.clone()),
                ImportState::Failed => return None,
                ImportState::Pending => {}
            }
        }
        // Marked failed up front so a load error cannot leave the rule
        // pending and retried on every walk.
        *self.state.borrow_mut() = ImportState::Failed;

        match load_import(&self.href, base_dir) {
            Ok(sheet) => {
                let sheet = Rc::new(sheet);
                *self.state.borrow_mut() = ImportState::Loaded(sheet.clone());
                Some(sheet)
            }
            Err(err) => {
                tracing::warn!(href = %self.href, error = %err, "dropping @import");
                None
            }
        }
    }
}

fn load_import(href: &str, base_dir: Option<&Rc<PathBuf>>) -> Result<Stylesheet, Error> {
    if href.contains("://") || href.starts_with("http:") || href.starts_with("https:") {
        return Err(ImportError::UnsupportedScheme {
            url: href.to_string(),
        }
        .into());
    }
    let href_path = Path::new(href);
    let path = if href_path.is_absolute() {
        href_path.to_path_buf()
    } else {
        match base_dir {
            Some(dir) => dir.join(href_path),
            None => {
                return Err(ImportError::Unresolved {
                    url: href.to_string(),
                    reason: "importing stylesheet has no base directory".to_string(),
                }
                .into());
            }
        }
    };
    let css = std::fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let base = path.parent().map(|p| Rc::new(p.to_path_buf()));
    let result = crate::css::parser::parse_stylesheet(&css, base);
    for error in &result.errors {
        tracing::warn!(path = %path.display(), error = %error, "error in imported stylesheet");
    }
    Ok(result.stylesheet)
}

/// A rule in document order.
#[derive(Debug)]
pub enum Rule {
    Style(StyleRule),
    Import(ImportRule),
}

/// A parsed stylesheet: rules in document order plus the directory its
/// source was read from, for resolving `url(...)` terms and `@import`
/// targets.
#[derive(Debug)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub base_dir: Option<Rc<PathBuf>>,
}

impl Stylesheet {
    /// Creates an empty stylesheet.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            base_dir: None,
        }
    }

    /// Visits every style rule in cascade document order, resolving
    /// `@import`s in place. The callback receives each rule together with
    /// the base directory of the sheet it came from.
    pub fn walk_style_rules(&self, visit: &mut dyn FnMut(&StyleRule, Option<&Rc<PathBuf>>)) {
        self.walk_style_rules_at(visit, 0);
    }

    fn walk_style_rules_at(
        &self,
        visit: &mut dyn FnMut(&StyleRule, Option<&Rc<PathBuf>>),
        import_depth: usize,
    ) {
        // Imports resolve to freshly parsed sheets, so a circular chain
        // cannot be detected by instance; the nesting cap ends it.
        const MAX_IMPORT_DEPTH: usize = 16;

        for rule in &self.rules {
            match rule {
                Rule::Style(style_rule) => visit(style_rule, self.base_dir.as_ref()),
                Rule::Import(import) => {
                    if import_depth >= MAX_IMPORT_DEPTH {
                        tracing::warn!(href = %import.href, "import nesting too deep; skipping");
                        continue;
                    }
                    if let Some(nested) = import.ensure_loaded(self.base_dir.as_ref()) {
                        nested.walk_style_rules_at(visit, import_depth + 1);
                    }
                }
            }
        }
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing stylesheet text
///
/// The parser recovers from errors, so the stylesheet may contain valid
/// rules even when errors are present.
#[derive(Debug)]
pub struct CssParseResult {
    pub stylesheet: Stylesheet,
    pub errors: Vec<ParseError>,
}

impl CssParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
