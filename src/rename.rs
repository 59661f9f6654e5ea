//! Renaming vendor-style language directories (`values-pt_BR`) to Android's
//! region-qualified form (`values-pt-rBR`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{discovery::discover_languages, error::Error, layout::Layout};

lazy_static! {
    /// A two-letter language code followed by an underscore.
    static ref LANGUAGE_UNDERSCORE: Regex = Regex::new(r"^(\w\w)_").unwrap();
}

/// A language directory that was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// The region-qualified name for `language_dir`, or `None` when it needs no rename.
///
/// Only the first underscore right after the two-letter code is replaced.
pub fn region_qualified_name(language_dir: &str, layout: &Layout) -> Option<String> {
    let code = language_dir.strip_prefix(&layout.language_dir_prefix)?;
    if !LANGUAGE_UNDERSCORE.is_match(code) {
        return None;
    }
    let renamed = LANGUAGE_UNDERSCORE.replace(code, "${1}-r");
    Some(format!("{}{}", layout.language_dir_prefix, renamed))
}

/// Renames every language directory of the aggregate module that uses an
/// underscore-separated locale code.
pub fn replace_underscores(root: &Path, layout: &Layout) -> Result<Vec<Rename>, Error> {
    let resource_root = layout.resource_root(root, &layout.aggregate_module);
    let mut renames = Vec::new();
    for language_dir in discover_languages(root, layout)? {
        let Some(new_name) = region_qualified_name(&language_dir, layout) else {
            continue;
        };
        let from = resource_root.join(&language_dir);
        let to = resource_root.join(&new_name);
        if to.exists() {
            return Err(Error::FileSystem {
                path: to.clone(),
                operation: format!("rename {} to", from.display()),
                source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            });
        }
        fs::rename(&from, &to).map_err(|e| Error::from_io(&from, "rename", e))?;
        log::info!("Renamed {} to {}", from.display(), to.display());
        renames.push(Rename { from, to });
    }
    Ok(renames)
}
