//! All error types for the i18n-atlas crate.
//!
//! Every fallible operation (discovery, parsing, filtering, writing) returns
//! [`Error`]. Errors are built once where the problem is detected; the
//! pipelines only wrap them with the module or language being processed.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied while trying to {operation} {}", path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    #[error("failed to {operation} {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("malformed document {}: {message}", path.display())]
    MalformedDocument { path: PathBuf, message: String },

    #[error("entry #{index}: key `{key}` has no module namespace")]
    MalformedKey { key: String, index: usize },

    #[error("entry #{index}: missing required attribute `{attribute}`")]
    MissingAttribute { attribute: String, index: usize },

    #[error("invalid module name `{0}`")]
    InvalidModuleName(String),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classifies a filesystem error raised while performing `operation` on `path`.
    pub fn from_io(path: impl AsRef<Path>, operation: impl Into<String>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path,
                operation: operation.into(),
            },
            _ => Error::FileSystem {
                path,
                operation: operation.into(),
                source,
            },
        }
    }

    /// Creates a missing `name` attribute error for the entry at `index`.
    pub fn missing_name(index: usize) -> Self {
        Error::MissingAttribute {
            attribute: "name".to_string(),
            index,
        }
    }

    /// Wraps the error with the module being processed.
    pub fn in_module(self, module: &str) -> Self {
        Error::Context {
            context: format!("module `{}`", module),
            source: Box::new(self),
        }
    }

    /// Wraps the error with the language directory being processed.
    pub fn in_language(self, language_dir: &str) -> Self {
        Error::Context {
            context: format!("language `{}`", language_dir),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any context wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_not_found() {
        let err = Error::from_io(
            "auth/strings.xml",
            "read",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.to_string(), "not found: auth/strings.xml");
    }

    #[test]
    fn test_from_io_permission_denied() {
        let err = Error::from_io(
            "i18n",
            "create directory",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(
            err.to_string(),
            "permission denied while trying to create directory i18n"
        );
    }

    #[test]
    fn test_from_io_other() {
        let err = Error::from_io("x", "rename", io::Error::other("disk on fire"));
        assert!(matches!(err, Error::FileSystem { .. }));
        assert!(err.to_string().contains("failed to rename x"));
    }

    #[test]
    fn test_malformed_key_display() {
        let err = Error::MalformedKey {
            key: "login_title".to_string(),
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "entry #3: key `login_title` has no module namespace"
        );
    }

    #[test]
    fn test_missing_name_display() {
        assert_eq!(
            Error::missing_name(2).to_string(),
            "entry #2: missing required attribute `name`"
        );
    }

    #[test]
    fn test_context_chain() {
        let err = Error::missing_name(1).in_module("auth");
        assert_eq!(
            err.to_string(),
            "module `auth`: entry #1: missing required attribute `name`"
        );
        assert!(matches!(err.root_cause(), Error::MissingAttribute { .. }));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidModuleName("a.b".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidModuleName"));
        assert!(debug.contains("a.b"));
    }
}
