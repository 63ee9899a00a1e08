//! Error types for the style engine
//!
//! Only the fallible loading surface (stylesheet files, `@import`
//! resolution) returns errors. Everything downstream of parsing —
//! malformed declarations, unsupported selectors, failed typed-value
//! conversions — is reported as a diagnostic and degrades to a
//! best-effort value instead.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for style engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for stylesheet loading
#[derive(Error, Debug)]
pub enum Error {
  /// CSS parsing error
  #[error("Parse error: {0}")]
  Parse(#[from] ParseError),

  /// `@import` resolution error
  #[error("Import error: {0}")]
  Import(#[from] ImportError),

  /// I/O error reading a stylesheet file
  #[error("I/O error reading '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors produced while parsing stylesheet text
///
/// The parser recovers from these by skipping the offending rule or
/// declaration; they are collected alongside the parsed stylesheet so
/// callers can report them.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
  /// Invalid CSS syntax
  #[error("Invalid CSS at line {line}, column {column}: {message}")]
  InvalidCss {
    message: String,
    line: u32,
    column: u32,
  },

  /// Invalid selector; the whole rule is dropped
  #[error("Invalid selector at line {line}, column {column}: {message}")]
  InvalidSelector {
    message: String,
    line: u32,
    column: u32,
  },
}

/// Errors that occur while resolving an `@import` rule
///
/// Each failure affects only the one import; the importing stylesheet
/// keeps cascading with its remaining rules.
#[derive(Error, Debug, Clone)]
pub enum ImportError {
  /// Remote URLs are not supported
  #[error("Unsupported stylesheet URL scheme: '{url}'")]
  UnsupportedScheme { url: String },

  /// The import target could not be resolved to a file
  #[error("Cannot resolve '@import \"{url}\"': {reason}")]
  Unresolved { url: String, reason: String },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_error_invalid_css() {
    let error = ParseError::InvalidCss {
      message: "expected declaration".to_string(),
      line: 5,
      column: 10,
    };
    let display = format!("{}", error);
    assert!(display.contains("line 5"));
    assert!(display.contains("column 10"));
  }

  #[test]
  fn test_parse_error_invalid_selector() {
    let error = ParseError::InvalidSelector {
      message: "unexpected token".to_string(),
      line: 2,
      column: 1,
    };
    assert!(format!("{}", error).contains("Invalid selector"));
  }

  #[test]
  fn test_import_error_unsupported_scheme() {
    let error = ImportError::UnsupportedScheme {
      url: "http://example.com/a.css".to_string(),
    };
    assert!(format!("{}", error).contains("http://example.com/a.css"));
  }

  #[test]
  fn test_error_from_parse_error() {
    let parse_error = ParseError::InvalidCss {
      message: "test".to_string(),
      line: 1,
      column: 1,
    };
    let error: Error = parse_error.into();
    assert!(matches!(error, Error::Parse(_)));
  }

  #[test]
  fn test_error_from_import_error() {
    let import_error = ImportError::Unresolved {
      url: "missing.css".to_string(),
      reason: "no base directory".to_string(),
    };
    let error: Error = import_error.into();
    assert!(matches!(error, Error::Import(_)));
  }

  #[test]
  fn test_io_error_display_includes_path() {
    let error = Error::Io {
      path: PathBuf::from("/tmp/theme.css"),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };
    assert!(format!("{}", error).contains("/tmp/theme.css"));
  }

  #[test]
  fn test_error_trait_implemented() {
    let error: Error = ParseError::InvalidCss {
      message: "x".to_string(),
      line: 1,
      column: 1,
    }
    .into();
    let _: &dyn std::error::Error = &error;
  }
}
