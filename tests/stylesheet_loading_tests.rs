use shellstyle::{Color, Error, Theme, ThemeContext, ThemeNode};
use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn write_css(dir: &Path, name: &str, css: &str) -> PathBuf {
  let path = dir.join(name);
  let mut file = std::fs::File::create(&path).expect("create stylesheet");
  write!(file, "{}", css).expect("write stylesheet");
  path
}

fn node_for(theme: &Rc<Theme>, element_type: &str) -> Rc<ThemeNode> {
  let context = ThemeContext::new();
  context.set_theme(Some(theme.clone()));
  ThemeNode::new(&context, None, None, element_type, None, None, None, None, false)
}

#[test]
fn loaded_stylesheet_joins_the_cascade() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = write_css(dir.path(), "custom.css", "A { color: red; }");

  let theme = Theme::new();
  theme.load_stylesheet(&path).expect("load");
  assert_eq!(node_for(&theme, "A").get_color("color"), Color::rgb(255, 0, 0));
}

#[test]
fn unloaded_stylesheet_leaves_the_cascade() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = write_css(dir.path(), "custom.css", "A { color: red; }");

  let theme = Theme::new();
  theme.load_stylesheet(&path).expect("load");
  assert!(theme.unload_stylesheet(&path));

  // nodes are rebuilt after the change event; a fresh node sees the
  // reduced stylesheet set
  assert_eq!(node_for(&theme, "A").lookup_color("color", false), None);
}

#[test]
fn earlier_loaded_custom_sheet_wins_ties() {
  let dir = tempfile::tempdir().expect("tempdir");
  let first = write_css(dir.path(), "first.css", "A { color: red; }");
  let second = write_css(dir.path(), "second.css", "A { color: blue; }");

  let theme = Theme::new();
  theme.load_stylesheet(&first).expect("load first");
  theme.load_stylesheet(&second).expect("load second");

  // the newest sheet sits at the lowest-priority end of the custom list
  assert_eq!(node_for(&theme, "A").get_color("color"), Color::rgb(255, 0, 0));
}

#[test]
fn broken_stylesheet_does_not_disturb_loaded_ones() {
  let dir = tempfile::tempdir().expect("tempdir");
  let good = write_css(dir.path(), "good.css", "A { color: red; }");

  let theme = Theme::new();
  theme.load_stylesheet(&good).expect("load");
  let missing = dir.path().join("missing.css");
  assert!(matches!(
    theme.load_stylesheet(&missing),
    Err(Error::Io { .. })
  ));

  assert_eq!(theme.custom_stylesheet_paths(), vec![good.clone()]);
  assert_eq!(node_for(&theme, "A").get_color("color"), Color::rgb(255, 0, 0));
}

#[test]
fn change_event_fires_on_load_and_unload() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = write_css(dir.path(), "custom.css", "A { color: red; }");

  let theme = Theme::new();
  let events = Rc::new(Cell::new(0));
  let events_in_callback = events.clone();
  theme.connect_custom_stylesheets_changed(move || {
    events_in_callback.set(events_in_callback.get() + 1);
  });

  theme.load_stylesheet(&path).expect("load");
  assert!(theme.unload_stylesheet(&path));
  assert!(!theme.unload_stylesheet(&path));
  assert_eq!(events.get(), 2);
}

#[test]
fn import_resolves_relative_to_importing_sheet() {
  let dir = tempfile::tempdir().expect("tempdir");
  let sub = dir.path().join("shared");
  std::fs::create_dir(&sub).expect("mkdir");
  write_css(&sub, "colors.css", "A { color: red; }");
  let main = write_css(
    dir.path(),
    "main.css",
    "@import url(\"shared/colors.css\");\nB { color: blue; }",
  );

  let theme = Theme::new();
  theme.set_theme_stylesheet(&main).expect("load");
  assert_eq!(node_for(&theme, "A").get_color("color"), Color::rgb(255, 0, 0));
  assert_eq!(node_for(&theme, "B").get_color("color"), Color::rgb(0, 0, 255));
}

#[test]
fn failing_import_drops_only_that_import() {
  let dir = tempfile::tempdir().expect("tempdir");
  let main = write_css(
    dir.path(),
    "main.css",
    "@import url(\"missing.css\");\n@import url(\"http://example.com/remote.css\");\nB { color: blue; }",
  );

  let theme = Theme::new();
  theme.set_theme_stylesheet(&main).expect("load");
  let styled = node_for(&theme, "B");
  assert_eq!(styled.get_color("color"), Color::rgb(0, 0, 255));

  // resolution is repeatable; cached import failures are not retried
  let again = node_for(&theme, "B");
  assert_eq!(again.get_color("color"), Color::rgb(0, 0, 255));
}

#[test]
fn circular_imports_terminate() {
  let dir = tempfile::tempdir().expect("tempdir");
  write_css(dir.path(), "b.css", "@import url(\"a.css\");\nB { color: blue; }");
  let a = write_css(dir.path(), "a.css", "@import url(\"b.css\");\nA { color: red; }");

  let theme = Theme::new();
  theme.set_theme_stylesheet(&a).expect("load");
  let styled = node_for(&theme, "B");
  assert_eq!(styled.get_color("color"), Color::rgb(0, 0, 255));
}

#[test]
fn bad_rules_inside_a_sheet_do_not_block_the_rest() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = write_css(
    dir.path(),
    "partial.css",
    "A %% { color: red; }\nB { color: blue; }\nC { color red }\nD { color: green; }",
  );

  let theme = Theme::new();
  theme.load_stylesheet(&path).expect("load");
  assert_eq!(node_for(&theme, "B").get_color("color"), Color::rgb(0, 0, 255));
  assert_eq!(node_for(&theme, "D").get_color("color"), Color::rgb(0, 128, 0));
}

#[test]
fn context_theme_change_invalidates_and_notifies() {
  let first = Theme::new();
  first.set_theme_stylesheet_source("A { color: red; }");
  let second = Theme::new();
  second.set_theme_stylesheet_source("A { color: blue; }");

  let context = ThemeContext::new();
  context.set_theme(Some(first));

  let events = Rc::new(Cell::new(0));
  let events_in_callback = events.clone();
  context.connect_changed(move || events_in_callback.set(events_in_callback.get() + 1));

  let before = ThemeNode::new(&context, None, None, "A", None, None, None, None, false);
  assert_eq!(before.get_color("color"), Color::rgb(255, 0, 0));

  context.set_theme(Some(second));
  assert_eq!(events.get(), 1);

  let after = ThemeNode::new(&context, None, None, "A", None, None, None, None, false);
  assert_eq!(after.get_color("color"), Color::rgb(0, 0, 255));
}
