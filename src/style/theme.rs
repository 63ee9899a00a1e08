//! Theme: the stylesheet set
//!
//! A theme holds up to three fixed-priority stylesheets (defaults, the
//! user's theme, application styling), a runtime-managed list of custom
//! stylesheets keyed by path, and one fallback stylesheet consulted only
//! when a node with the important flag matched nothing at all.
//!
//! Stylesheet loading is non-fatal: a sheet that cannot be read is
//! reported and simply absent from the cascade; recoverable parse errors
//! inside a sheet drop the offending rule only.

use crate::css::parser::parse_stylesheet;
use crate::css::Stylesheet;
use crate::error::{Error, Result};
use crate::style::cascade::Origin;
use crate::style::context::HandlerId;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

struct CustomStylesheet {
    path: PathBuf,
    stylesheet: Rc<Stylesheet>,
}

/// An ordered set of stylesheets. Shared, interior-mutable; nodes keep a
/// reference to the theme they were resolved against.
pub struct Theme {
    default_stylesheet: RefCell<Option<Rc<Stylesheet>>>,
    theme_stylesheet: RefCell<Option<Rc<Stylesheet>>>,
    application_stylesheet: RefCell<Option<Rc<Stylesheet>>>,
    fallback_stylesheet: RefCell<Option<Rc<Stylesheet>>>,
    /// Walk order; a newly loaded sheet goes in front, making it the
    /// lowest-priority custom sheet.
    custom_stylesheets: RefCell<Vec<CustomStylesheet>>,
    listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_handler: Cell<u64>,
}

impl Theme {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            default_stylesheet: RefCell::new(None),
            theme_stylesheet: RefCell::new(None),
            application_stylesheet: RefCell::new(None),
            fallback_stylesheet: RefCell::new(None),
            custom_stylesheets: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_handler: Cell::new(1),
        })
    }

    // ------------------------------------------------------------------
    // Fixed-tier stylesheets
    // ------------------------------------------------------------------

    pub fn set_default_stylesheet(&self, path: &Path) -> Result<()> {
        *self.default_stylesheet.borrow_mut() = Some(load_stylesheet_file(path)?);
        Ok(())
    }

    pub fn set_theme_stylesheet(&self, path: &Path) -> Result<()> {
        *self.theme_stylesheet.borrow_mut() = Some(load_stylesheet_file(path)?);
        Ok(())
    }

    pub fn set_application_stylesheet(&self, path: &Path) -> Result<()> {
        *self.application_stylesheet.borrow_mut() = Some(load_stylesheet_file(path)?);
        Ok(())
    }

    pub fn set_fallback_stylesheet(&self, path: &Path) -> Result<()> {
        *self.fallback_stylesheet.borrow_mut() = Some(load_stylesheet_file(path)?);
        Ok(())
    }

    // Source-text variants, for stylesheets embedded in the binary.

    pub fn set_default_stylesheet_source(&self, css: &str) {
        *self.default_stylesheet.borrow_mut() = Some(parse_stylesheet_source(css));
    }

    pub fn set_theme_stylesheet_source(&self, css: &str) {
        *self.theme_stylesheet.borrow_mut() = Some(parse_stylesheet_source(css));
    }

    pub fn set_application_stylesheet_source(&self, css: &str) {
        *self.application_stylesheet.borrow_mut() = Some(parse_stylesheet_source(css));
    }

    pub fn set_fallback_stylesheet_source(&self, css: &str) {
        *self.fallback_stylesheet.borrow_mut() = Some(parse_stylesheet_source(css));
    }

    // ------------------------------------------------------------------
    // Custom stylesheets
    // ------------------------------------------------------------------

    /// Loads a custom stylesheet. The new sheet enters at the lowest
    /// priority position of the custom list; all custom sheets cascade in
    /// the application tier. Fires the change event on success.
    pub fn load_stylesheet(&self, path: &Path) -> Result<()> {
        let stylesheet = load_stylesheet_file(path)?;
        self.custom_stylesheets.borrow_mut().insert(
            0,
            CustomStylesheet {
                path: path.to_path_buf(),
                stylesheet,
            },
        );
        self.emit_custom_stylesheets_changed();
        Ok(())
    }

    /// Unloads a custom stylesheet by path. Returns whether anything was
    /// removed; fires the change event only then.
    pub fn unload_stylesheet(&self, path: &Path) -> bool {
        let removed = {
            let mut custom = self.custom_stylesheets.borrow_mut();
            let before = custom.len();
            custom.retain(|entry| entry.path != path);
            custom.len() != before
        };
        if removed {
            self.emit_custom_stylesheets_changed();
        }
        removed
    }

    /// Paths of the loaded custom stylesheets, lowest priority first.
    pub fn custom_stylesheet_paths(&self) -> Vec<PathBuf> {
        self.custom_stylesheets
            .borrow()
            .iter()
            .map(|entry| entry.path.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Cascade access
    // ------------------------------------------------------------------

    /// The stylesheets participating in the normal cascade, walk order:
    /// fixed tiers lowest priority first, then custom sheets.
    pub(crate) fn cascade_stylesheets(&self) -> Vec<(Origin, Rc<Stylesheet>)> {
        let mut stylesheets = Vec::new();
        if let Some(sheet) = self.default_stylesheet.borrow().as_ref() {
            stylesheets.push((Origin::Default, sheet.clone()));
        }
        if let Some(sheet) = self.theme_stylesheet.borrow().as_ref() {
            stylesheets.push((Origin::Theme, sheet.clone()));
        }
        if let Some(sheet) = self.application_stylesheet.borrow().as_ref() {
            stylesheets.push((Origin::Application, sheet.clone()));
        }
        for entry in self.custom_stylesheets.borrow().iter() {
            stylesheets.push((Origin::Application, entry.stylesheet.clone()));
        }
        stylesheets
    }

    pub(crate) fn fallback_stylesheet(&self) -> Option<Rc<Stylesheet>> {
        self.fallback_stylesheet.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------

    /// Registers a callback fired whenever the custom stylesheet list
    /// changes. Collaborators discard their derived caches in response.
    pub fn connect_custom_stylesheets_changed(
        &self,
        callback: impl Fn() + 'static,
    ) -> HandlerId {
        let id = self.next_handler.get();
        self.next_handler.set(id + 1);
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        self.listeners.borrow_mut().push((id, callback));
        HandlerId(id)
    }

    pub fn disconnect(&self, handler: HandlerId) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != handler.0);
    }

    fn emit_custom_stylesheets_changed(&self) {
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

fn parse_stylesheet_source(css: &str) -> Rc<Stylesheet> {
    let result = parse_stylesheet(css, None);
    for error in &result.errors {
        tracing::warn!(error = %error, "stylesheet parse error");
    }
    Rc::new(result.stylesheet)
}

fn load_stylesheet_file(path: &Path) -> Result<Rc<Stylesheet>> {
    let css = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().map(|dir| Rc::new(dir.to_path_buf()));
    let result = parse_stylesheet(&css, base_dir);
    for error in &result.errors {
        tracing::warn!(path = %path.display(), error = %error, "stylesheet parse error");
    }
    Ok(Rc::new(result.stylesheet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    fn write_css(dir: &Path, name: &str, css: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).expect("create stylesheet");
        write!(file, "{}", css).expect("write stylesheet");
        path
    }

    #[test]
    fn load_and_unload_fire_change_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_css(dir.path(), "a.css", "A { color: red; }");

        let theme = Theme::new();
        let fired = Rc::new(Cell::new(0));
        let fired_in_callback = fired.clone();
        theme.connect_custom_stylesheets_changed(move || {
            fired_in_callback.set(fired_in_callback.get() + 1);
        });

        theme.load_stylesheet(&path).expect("load");
        assert_eq!(fired.get(), 1);
        assert_eq!(theme.custom_stylesheet_paths(), vec![path.clone()]);

        assert!(theme.unload_stylesheet(&path));
        assert_eq!(fired.get(), 2);
        assert!(theme.custom_stylesheet_paths().is_empty());

        // unloading again is a no-op and stays silent
        assert!(!theme.unload_stylesheet(&path));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn newest_custom_stylesheet_has_lowest_priority() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = write_css(dir.path(), "first.css", "A { color: red; }");
        let second = write_css(dir.path(), "second.css", "A { color: blue; }");

        let theme = Theme::new();
        theme.load_stylesheet(&first).expect("load first");
        theme.load_stylesheet(&second).expect("load second");
        assert_eq!(theme.custom_stylesheet_paths(), vec![second, first]);
    }

    #[test]
    fn missing_file_errors_and_leaves_theme_unchanged() {
        let theme = Theme::new();
        let result = theme.load_stylesheet(Path::new("/nonexistent/missing.css"));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(theme.custom_stylesheet_paths().is_empty());
        assert!(theme.cascade_stylesheets().is_empty());
    }

    #[test]
    fn disconnect_stops_callbacks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_css(dir.path(), "a.css", "A { color: red; }");

        let theme = Theme::new();
        let fired = Rc::new(Cell::new(0));
        let fired_in_callback = fired.clone();
        let handler = theme.connect_custom_stylesheets_changed(move || {
            fired_in_callback.set(fired_in_callback.get() + 1);
        });
        theme.disconnect(handler);
        theme.load_stylesheet(&path).expect("load");
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn tier_setters_populate_cascade_order() {
        let theme = Theme::new();
        theme.set_application_stylesheet_source("A { color: red; }");
        theme.set_default_stylesheet_source("A { color: blue; }");
        theme.set_theme_stylesheet_source("A { color: green; }");
        let origins: Vec<Origin> = theme
            .cascade_stylesheets()
            .iter()
            .map(|(origin, _)| *origin)
            .collect();
        assert_eq!(
            origins,
            vec![Origin::Default, Origin::Theme, Origin::Application]
        );
    }
}
