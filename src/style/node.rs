//! Theme nodes
//!
//! A theme node is an immutable styling identity — parent link, element
//! type, id, classes, pseudo-classes, inline style, important flag —
//! plus lazily-computed resolved style state. Identity never changes
//! after construction; restyling means building a new node. Each derived
//! feature group (matched declarations, geometry, background, font,
//! border image, shadows, icon colors) is computed at most once, in a
//! single-assignment cell, the first time something asks for it.
//!
//! Nodes form a tree through parent links only. The parent of a node is
//! always a fully-constructed node, so the chain is finite and acyclic
//! by construction.

use crate::style::background::{self, Background, BackgroundGradient};
use crate::style::border_image::{border_image_from_terms, BorderImage};
use crate::style::cascade::{self, MatchedDeclaration};
use crate::style::color::Color;
use crate::style::context::ThemeContext;
use crate::style::font::{self, FontDescription};
use crate::style::geometry::{self, Geometry};
use crate::style::icon_colors::{self, IconColors};
use crate::style::shadow::Shadow;
use crate::style::theme::Theme;
use crate::style::values::LengthMetrics;
use crate::style::{Corner, Side, TermResult};
use rustc_hash::FxHasher;
use std::cell::OnceCell;
use std::hash::Hasher;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

const FALLBACK_RESOLUTION: f64 = 96.0;

/// One node of the styling tree. See the module docs.
pub struct ThemeNode {
    context: Weak<ThemeContext>,
    parent: Option<Rc<ThemeNode>>,
    theme_override: Option<Rc<Theme>>,
    element_type: String,
    element_id: Option<String>,
    element_classes: Vec<String>,
    pseudo_classes: Vec<String>,
    inline_style: Option<String>,
    important: bool,

    structural_hash: OnceCell<u64>,
    declarations: OnceCell<Vec<MatchedDeclaration>>,
    geometry: OnceCell<Geometry>,
    background: OnceCell<Background>,
    font: OnceCell<FontDescription>,
    border_image: OnceCell<Option<BorderImage>>,
    box_shadow: OnceCell<Option<Shadow>>,
    text_shadow: OnceCell<Option<Shadow>>,
    background_image_shadow: OnceCell<Option<Shadow>>,
    icon_colors: OnceCell<IconColors>,
}

impl ThemeNode {
    /// Creates a node.
    ///
    /// `element_classes` and `pseudo_classes` are whitespace-separated
    /// lists. The important flag is inherited: a node is important when
    /// either the argument or its parent says so.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: &Rc<ThemeContext>,
        parent: Option<&Rc<ThemeNode>>,
        theme_override: Option<&Rc<Theme>>,
        element_type: &str,
        element_id: Option<&str>,
        element_classes: Option<&str>,
        pseudo_classes: Option<&str>,
        inline_style: Option<&str>,
        important: bool,
    ) -> Rc<ThemeNode> {
        let split = |list: Option<&str>| -> Vec<String> {
            list.map(|text| text.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        };
        Rc::new(ThemeNode {
            context: Rc::downgrade(context),
            parent: parent.cloned(),
            theme_override: theme_override.cloned(),
            element_type: element_type.to_string(),
            element_id: element_id.map(str::to_string),
            element_classes: split(element_classes),
            pseudo_classes: split(pseudo_classes),
            inline_style: inline_style.map(str::to_string),
            important: important || parent.is_some_and(|parent| parent.important),
            structural_hash: OnceCell::new(),
            declarations: OnceCell::new(),
            geometry: OnceCell::new(),
            background: OnceCell::new(),
            font: OnceCell::new(),
            border_image: OnceCell::new(),
            box_shadow: OnceCell::new(),
            text_shadow: OnceCell::new(),
            background_image_shadow: OnceCell::new(),
            icon_colors: OnceCell::new(),
        })
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<&Rc<ThemeNode>> {
        self.parent.as_ref()
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn element_classes(&self) -> &[String] {
        &self.element_classes
    }

    pub fn pseudo_classes(&self) -> &[String] {
        &self.pseudo_classes
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.inline_style.as_deref()
    }

    pub fn important(&self) -> bool {
        self.important
    }

    /// The context this node styles under, if it is still alive.
    pub fn context(&self) -> Option<Rc<ThemeContext>> {
        self.context.upgrade()
    }

    /// The theme this node resolves against: its override, or the
    /// context's current theme.
    pub fn theme(&self) -> Option<Rc<Theme>> {
        match &self.theme_override {
            Some(theme) => Some(theme.clone()),
            None => self.context()?.theme(),
        }
    }

    /// Structural equality over every identity attribute. Parents and
    /// themes compare by instance, the rest by value.
    pub fn structural_eq(&self, other: &ThemeNode) -> bool {
        Weak::ptr_eq(&self.context, &other.context)
            && match (&self.parent, &other.parent) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
            && match (&self.theme_override, &other.theme_override) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
            && self.element_type == other.element_type
            && self.important == other.important
            && self.element_id == other.element_id
            && self.inline_style == other.inline_style
            && self.element_classes == other.element_classes
            && self.pseudo_classes == other.pseudo_classes
    }

    /// Rolling hash over the same attributes `structural_eq` compares.
    pub fn structural_hash(&self) -> u64 {
        *self.structural_hash.get_or_init(|| {
            let mut hasher = FxHasher::default();
            hasher.write_usize(self.context.as_ptr() as usize);
            hasher.write_usize(
                self.parent
                    .as_ref()
                    .map_or(0, |parent| Rc::as_ptr(parent) as usize),
            );
            hasher.write_usize(
                self.theme_override
                    .as_ref()
                    .map_or(0, |theme| Rc::as_ptr(theme) as *const u8 as usize),
            );
            hasher.write(self.element_type.as_bytes());
            hasher.write_u8(self.important as u8);
            hasher.write(self.element_id.as_deref().unwrap_or("").as_bytes());
            hasher.write(self.inline_style.as_deref().unwrap_or("").as_bytes());
            for class in &self.element_classes {
                hasher.write(class.as_bytes());
            }
            for pseudo in &self.pseudo_classes {
                hasher.write(pseudo.as_bytes());
            }
            hasher.finish()
        })
    }

    /// Type-selector matching: exact element type, or an ancestor in the
    /// context's element hierarchy.
    pub(crate) fn element_type_matches(&self, selector_type: &str) -> bool {
        if self.element_type == selector_type {
            return true;
        }
        match self.context() {
            Some(context) => context.element_is_a(&self.element_type, selector_type),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Resolution parameters
    // ------------------------------------------------------------------

    pub(crate) fn resolution(&self) -> f64 {
        match self.context() {
            Some(context) => context.resolution(),
            None => {
                tracing::debug!("theme context dropped; using fallback resolution");
                FALLBACK_RESOLUTION
            }
        }
    }

    pub(crate) fn scale_factor(&self) -> f64 {
        self.context().map_or(1.0, |context| context.scale_factor())
    }

    /// The node's font size in device pixels.
    pub fn font_size_px(&self) -> f64 {
        self.get_font().size_points * self.resolution() / 72.0
    }

    pub(crate) fn length_metrics(&self) -> LengthMetrics {
        LengthMetrics {
            resolution: self.resolution(),
            scale_factor: self.scale_factor(),
            font_size_px: self.font_size_px(),
        }
    }

    // ------------------------------------------------------------------
    // Cascade state
    // ------------------------------------------------------------------

    /// The matched, sorted declaration list; computed on first use.
    pub(crate) fn declarations(&self) -> &[MatchedDeclaration] {
        self.declarations
            .get_or_init(|| cascade::matched_declarations(self))
    }

    pub(crate) fn geometry(&self) -> &Geometry {
        self.geometry.get_or_init(|| geometry::resolve_geometry(self))
    }

    pub(crate) fn background(&self) -> &Background {
        self.background
            .get_or_init(|| background::resolve_background(self))
    }

    // ------------------------------------------------------------------
    // Generic lookups
    // ------------------------------------------------------------------

    /// Looks up a color property. With `inherit`, an absent property
    /// falls back to the parent's resolved value.
    pub fn lookup_color(&self, property: &str, inherit: bool) -> Option<Color> {
        cascade::lookup_color(self, property, inherit)
    }

    /// Looks up a length property, resolved to device pixels.
    pub fn lookup_length(&self, property: &str, inherit: bool) -> Option<f64> {
        cascade::lookup_length(self, property, inherit)
    }

    /// Looks up a plain numeric property.
    pub fn lookup_double(&self, property: &str, inherit: bool) -> Option<f64> {
        cascade::lookup_double(self, property, inherit)
    }

    /// Looks up a shadow property.
    pub fn lookup_shadow(&self, property: &str, inherit: bool) -> Option<Shadow> {
        cascade::lookup_shadow(self, property, inherit)
    }

    /// Like `lookup_color`, but warns and returns transparent when the
    /// property is absent.
    pub fn get_color(&self, property: &str) -> Color {
        self.lookup_color(property, false).unwrap_or_else(|| {
            tracing::warn!(property, "color property not found, using transparent");
            Color::TRANSPARENT
        })
    }

    /// Like `lookup_length`, but warns and returns 0 when absent.
    pub fn get_length(&self, property: &str) -> f64 {
        self.lookup_length(property, false).unwrap_or_else(|| {
            tracing::warn!(property, "length property not found, using 0");
            0.0
        })
    }

    /// Like `lookup_double`, but warns and returns 0 when absent.
    pub fn get_double(&self, property: &str) -> f64 {
        self.lookup_double(property, false).unwrap_or_else(|| {
            tracing::warn!(property, "numeric property not found, using 0");
            0.0
        })
    }

    /// Like `lookup_shadow`, but warns and returns an empty shadow when
    /// absent.
    pub fn get_shadow(&self, property: &str) -> Shadow {
        self.lookup_shadow(property, false).unwrap_or_else(|| {
            tracing::warn!(property, "shadow property not found, using none");
            Shadow::default()
        })
    }

    // ------------------------------------------------------------------
    // Feature groups
    // ------------------------------------------------------------------

    /// The resolved font: parent font (or context default) with this
    /// node's font declarations applied.
    pub fn get_font(&self) -> &FontDescription {
        self.font.get_or_init(|| font::resolve_font(self))
    }

    /// The foreground color. Inherits; defaults to opaque black.
    pub fn get_foreground_color(&self) -> Color {
        self.lookup_color("color", true).unwrap_or(Color::BLACK)
    }

    pub fn get_background_color(&self) -> Color {
        self.background().color
    }

    pub fn get_background_image(&self) -> Option<&PathBuf> {
        self.background().image.as_ref()
    }

    pub fn get_background_gradient(&self) -> BackgroundGradient {
        self.background().gradient
    }

    /// The node's border image, if any.
    pub fn get_border_image(&self) -> Option<&BorderImage> {
        self.border_image
            .get_or_init(|| {
                for matched in self.declarations().iter().rev() {
                    if matched.declaration.property != "border-image" {
                        continue;
                    }
                    let base_dir = matched.base_dir.as_ref().map(|dir| dir.as_path());
                    match border_image_from_terms(&matched.declaration.terms, base_dir) {
                        TermResult::Found(image) => return Some(image),
                        TermResult::Inherit => {
                            return self
                                .parent()
                                .and_then(|parent| parent.get_border_image().cloned());
                        }
                        TermResult::NotFound => continue,
                    }
                }
                None
            })
            .as_ref()
    }

    pub fn get_box_shadow(&self) -> Option<Shadow> {
        *self
            .box_shadow
            .get_or_init(|| self.lookup_shadow("box-shadow", false))
    }

    /// Text shadows inherit: absent here, the parent's applies.
    pub fn get_text_shadow(&self) -> Option<Shadow> {
        *self.text_shadow.get_or_init(|| {
            self.lookup_shadow("text-shadow", false)
                .or_else(|| self.parent().and_then(|parent| parent.get_text_shadow()))
        })
    }

    pub fn get_background_image_shadow(&self) -> Option<Shadow> {
        *self
            .background_image_shadow
            .get_or_init(|| self.lookup_shadow("background-image-shadow", false))
    }

    /// The icon color group (foreground plus status colors).
    pub fn get_icon_colors(&self) -> IconColors {
        *self
            .icon_colors
            .get_or_init(|| icon_colors::resolve_icon_colors(self))
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn get_width(&self) -> Option<f64> {
        self.geometry().width
    }

    pub fn get_height(&self) -> Option<f64> {
        self.geometry().height
    }

    pub fn get_min_width(&self) -> Option<f64> {
        self.geometry().min_width
    }

    pub fn get_min_height(&self) -> Option<f64> {
        self.geometry().min_height
    }

    pub fn get_max_width(&self) -> Option<f64> {
        self.geometry().max_width
    }

    pub fn get_max_height(&self) -> Option<f64> {
        self.geometry().max_height
    }

    pub fn get_padding(&self, side: Side) -> f64 {
        self.geometry().padding[side as usize]
    }

    pub fn get_margin(&self, side: Side) -> f64 {
        self.geometry().margin[side as usize]
    }

    pub fn get_border_width(&self, side: Side) -> f64 {
        self.geometry().border_width[side as usize]
    }

    pub fn get_border_color(&self, side: Side) -> Color {
        self.geometry().border_color[side as usize]
    }

    pub fn get_border_radius(&self, corner: Corner) -> f64 {
        self.geometry().border_radius[corner as usize]
    }
}

impl std::fmt::Debug for ThemeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeNode")
            .field("element_type", &self.element_type)
            .field("element_id", &self.element_id)
            .field("element_classes", &self.element_classes)
            .field("pseudo_classes", &self.pseudo_classes)
            .field("important", &self.important)
            .finish_non_exhaustive()
    }
}
