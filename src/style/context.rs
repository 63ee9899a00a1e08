//! Theme context
//!
//! Tree-wide styling state: the current theme, default font, output
//! resolution and scale factor, the synthetic root node, the structural
//! interning table, and the element-type hierarchy used by type-selector
//! matching.
//!
//! Any change to the theme, font, resolution, or scale factor is a
//! single coarse invalidation: the interning table is cleared, the root
//! node dropped, and the "changed" event fired so collaborators rebuild
//! their nodes.

use crate::style::font::FontDescription;
use crate::style::node::ThemeNode;
use crate::style::theme::Theme;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

const DEFAULT_RESOLUTION: f64 = 96.0;

/// Identifies a connected event callback, for disconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(pub(crate) u64);

/// Interning key: hashes and compares nodes structurally.
struct InternKey(Rc<ThemeNode>);

impl PartialEq for InternKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.structural_eq(&other.0)
    }
}

impl Eq for InternKey {}

impl Hash for InternKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.structural_hash());
    }
}

/// Process-wide styling state shared by every node of one tree.
pub struct ThemeContext {
    theme: RefCell<Option<Rc<Theme>>>,
    font: RefCell<FontDescription>,
    resolution: Cell<f64>,
    scale_factor: Cell<f64>,
    root_node: RefCell<Option<Rc<ThemeNode>>>,
    intern_table: RefCell<FxHashSet<InternKey>>,
    /// element type name → parent type name
    element_types: RefCell<FxHashMap<String, Option<String>>>,
    listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_handler: Cell<u64>,
}

impl ThemeContext {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            theme: RefCell::new(None),
            font: RefCell::new(FontDescription::default()),
            resolution: Cell::new(DEFAULT_RESOLUTION),
            scale_factor: Cell::new(1.0),
            root_node: RefCell::new(None),
            intern_table: RefCell::new(FxHashSet::default()),
            element_types: RefCell::new(FxHashMap::default()),
            listeners: RefCell::new(Vec::new()),
            next_handler: Cell::new(1),
        })
    }

    // ------------------------------------------------------------------
    // Global parameters
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Option<Rc<Theme>> {
        self.theme.borrow().clone()
    }

    pub fn set_theme(&self, theme: Option<Rc<Theme>>) {
        let changed = {
            let current = self.theme.borrow();
            !matches!(
                (current.as_ref(), theme.as_ref()),
                (Some(a), Some(b)) if Rc::ptr_eq(a, b)
            ) && !(current.is_none() && theme.is_none())
        };
        if changed {
            *self.theme.borrow_mut() = theme;
            self.invalidate();
        }
    }

    pub fn font(&self) -> FontDescription {
        self.font.borrow().clone()
    }

    pub fn set_font(&self, font: FontDescription) {
        if *self.font.borrow() == font {
            return;
        }
        *self.font.borrow_mut() = font;
        self.invalidate();
    }

    /// Output resolution in dots per inch.
    pub fn resolution(&self) -> f64 {
        self.resolution.get()
    }

    pub fn set_resolution(&self, resolution: f64) {
        if self.resolution.get() == resolution {
            return;
        }
        self.resolution.set(resolution);
        self.invalidate();
    }

    /// Device pixels per logical pixel.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor.get()
    }

    pub fn set_scale_factor(&self, scale_factor: f64) {
        if self.scale_factor.get() == scale_factor {
            return;
        }
        self.scale_factor.set(scale_factor);
        self.invalidate();
    }

    // ------------------------------------------------------------------
    // Root node and interning
    // ------------------------------------------------------------------

    /// The synthetic root of the node tree, created lazily. Its element
    /// type is the literal `stage`.
    pub fn root_node(self: &Rc<Self>) -> Rc<ThemeNode> {
        if let Some(root) = self.root_node.borrow().as_ref() {
            return root.clone();
        }
        let root = ThemeNode::new(self, None, None, "stage", None, None, None, None, false);
        *self.root_node.borrow_mut() = Some(root.clone());
        root
    }

    /// Returns the canonical instance for a structurally-equal node,
    /// registering the given node if there is none yet. Interned nodes
    /// share their resolved-style caches.
    pub fn intern(&self, node: Rc<ThemeNode>) -> Rc<ThemeNode> {
        let mut table = self.intern_table.borrow_mut();
        let key = InternKey(node);
        match table.get(&key) {
            Some(existing) => existing.0.clone(),
            None => {
                let node = key.0.clone();
                table.insert(key);
                node
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn intern_table_len(&self) -> usize {
        self.intern_table.borrow().len()
    }

    // ------------------------------------------------------------------
    // Element type hierarchy
    // ------------------------------------------------------------------

    /// Registers an element type and its parent type, so a type selector
    /// naming an ancestor matches nodes of this type.
    pub fn register_element_type(&self, name: &str, parent: Option<&str>) {
        self.element_types
            .borrow_mut()
            .insert(name.to_string(), parent.map(str::to_string));
    }

    /// True when `ancestor` is `child` or one of its registered
    /// ancestors.
    pub fn element_is_a(&self, child: &str, ancestor: &str) -> bool {
        if child == ancestor {
            return true;
        }
        let types = self.element_types.borrow();
        let mut current = child;
        // bounded by the registry size; registration loops stop here
        for _ in 0..=types.len() {
            match types.get(current).and_then(|parent| parent.as_deref()) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------

    /// Registers a callback fired after every coarse invalidation.
    pub fn connect_changed(&self, callback: impl Fn() + 'static) -> HandlerId {
        let id = self.next_handler.get();
        self.next_handler.set(id + 1);
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        self.listeners.borrow_mut().push((id, callback));
        HandlerId(id)
    }

    pub fn disconnect(&self, handler: HandlerId) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != handler.0);
    }

    /// Drops every derived structure and notifies collaborators. Nodes
    /// handed out earlier keep their already-computed state; the next
    /// tree rebuild starts fresh.
    fn invalidate(&self) {
        self.intern_table.borrow_mut().clear();
        *self.root_node.borrow_mut() = None;
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_node_is_created_once_and_typed_stage() {
        let context = ThemeContext::new();
        let root = context.root_node();
        assert_eq!(root.element_type(), "stage");
        assert!(Rc::ptr_eq(&root, &context.root_node()));
    }

    #[test]
    fn intern_returns_canonical_instance() {
        let context = ThemeContext::new();
        let a = ThemeNode::new(
            &context, None, None, "Widget", None, Some("big"), None, None, false,
        );
        let b = ThemeNode::new(
            &context, None, None, "Widget", None, Some("big"), None, None, false,
        );
        assert!(!Rc::ptr_eq(&a, &b));
        let canonical_a = context.intern(a.clone());
        let canonical_b = context.intern(b);
        assert!(Rc::ptr_eq(&canonical_a, &a));
        assert!(Rc::ptr_eq(&canonical_a, &canonical_b));
        assert_eq!(context.intern_table_len(), 1);
    }

    #[test]
    fn set_resolution_invalidates_and_notifies() {
        let context = ThemeContext::new();
        let root = context.root_node();
        let _ = context.intern(ThemeNode::new(
            &context, None, None, "Widget", None, None, None, None, false,
        ));

        let fired = Rc::new(Cell::new(0));
        let fired_in_callback = fired.clone();
        context.connect_changed(move || fired_in_callback.set(fired_in_callback.get() + 1));

        context.set_resolution(144.0);
        assert_eq!(fired.get(), 1);
        assert_eq!(context.intern_table_len(), 0);
        assert!(!Rc::ptr_eq(&root, &context.root_node()));

        // no actual change, no event
        context.set_resolution(144.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn set_font_invalidates_only_on_change() {
        let context = ThemeContext::new();
        let fired = Rc::new(Cell::new(0));
        let fired_in_callback = fired.clone();
        context.connect_changed(move || fired_in_callback.set(fired_in_callback.get() + 1));

        context.set_font(context.font());
        assert_eq!(fired.get(), 0);

        context.set_font(FontDescription::new("serif", 12.0));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn element_hierarchy_walks_ancestors() {
        let context = ThemeContext::new();
        context.register_element_type("Widget", None);
        context.register_element_type("Bin", Some("Widget"));
        context.register_element_type("Button", Some("Bin"));

        assert!(context.element_is_a("Button", "Button"));
        assert!(context.element_is_a("Button", "Bin"));
        assert!(context.element_is_a("Button", "Widget"));
        assert!(!context.element_is_a("Widget", "Button"));
        assert!(!context.element_is_a("Unregistered", "Widget"));
    }

    #[test]
    fn disconnect_stops_notifications() {
        let context = ThemeContext::new();
        let fired = Rc::new(Cell::new(0));
        let fired_in_callback = fired.clone();
        let handler =
            context.connect_changed(move || fired_in_callback.set(fired_in_callback.get() + 1));
        context.disconnect(handler);
        context.set_resolution(120.0);
        assert_eq!(fired.get(), 0);
    }
}
