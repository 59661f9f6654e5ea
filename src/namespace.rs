//! Deciding which entries go to translation, and prefixing/stripping the
//! module namespace of their keys.
//!
//! A combined key is `<module>.<original key>`. The module is everything before
//! the first `.`, so module names must not contain one; original keys may.

use std::fmt::Display;

use crate::{error::Error, types::ResourceEntry};

pub const NAMESPACE_SEPARATOR: char = '.';

/// Why an entry was left out of the combined file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// `translatable="false"`.
    NotTranslatable,
    /// An element kind translation vendors do not read (`color`, `dimen`, ...).
    UnsupportedKind(String),
    /// Carries a `tools:ignore` marker.
    ToolIgnored,
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NotTranslatable => write!(f, "marked translatable=\"false\""),
            DropReason::UnsupportedKind(kind) => write!(f, "unsupported kind <{}>", kind),
            DropReason::ToolIgnored => write!(f, "has a tools:ignore marker"),
        }
    }
}

/// Outcome of [`qualify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filtered {
    Keep(ResourceEntry),
    Drop(DropReason),
}

/// Checks a module name can be used as a namespace and as a directory directly
/// under the project root.
pub fn validate_module_name(module: &str) -> Result<(), Error> {
    let plain = !module.is_empty()
        && !module.contains(NAMESPACE_SEPARATOR)
        && !module.contains(['/', '\\', ':'])
        && !module.chars().any(char::is_control);
    if !plain {
        return Err(Error::InvalidModuleName(module.to_string()));
    }
    Ok(())
}

/// Returns why `entry` must not be translated, if anything.
pub fn drop_reason(entry: &ResourceEntry) -> Option<DropReason> {
    if !entry.is_translatable() {
        Some(DropReason::NotTranslatable)
    } else if !entry.kind.is_translatable() {
        Some(DropReason::UnsupportedKind(entry.kind.tag().to_string()))
    } else if entry.is_tool_ignored() {
        Some(DropReason::ToolIgnored)
    } else {
        None
    }
}

/// `module` + `.` + `key`.
pub fn qualify_key(module: &str, key: &str) -> String {
    format!("{}{}{}", module, NAMESPACE_SEPARATOR, key)
}

/// Filters `entry` (at 1-based position `index`) for the combined file and, when
/// it is kept, returns a copy whose key is prefixed with `module`.
pub fn qualify(entry: &ResourceEntry, module: &str, index: usize) -> Result<Filtered, Error> {
    if let Some(reason) = drop_reason(entry) {
        return Ok(Filtered::Drop(reason));
    }
    let key = entry.key().ok_or_else(|| Error::missing_name(index))?;
    Ok(Filtered::Keep(entry.with_key(&qualify_key(module, key))))
}

/// Splits a combined key into `(module, original key)` at the first `.`.
pub fn strip_namespace(key: &str, index: usize) -> Result<(&str, &str), Error> {
    match key.split_once(NAMESPACE_SEPARATOR) {
        Some((module, original)) if !module.is_empty() => Ok((module, original)),
        _ => Err(Error::MalformedKey {
            key: key.to_string(),
            index,
        }),
    }
}

/// Returns the module of a combined entry and a copy of it carrying the original key.
pub fn unqualify(entry: &ResourceEntry, index: usize) -> Result<(String, ResourceEntry), Error> {
    let key = entry.key().ok_or_else(|| Error::missing_name(index))?;
    let (module, original) = strip_namespace(key, index)?;
    validate_module_name(module)?;
    Ok((module.to_string(), entry.with_key(original)))
}
