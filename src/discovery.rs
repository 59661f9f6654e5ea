//! Finding the modules and language directories to process.
//!
//! Both lists are sorted by name so the combined file and the order of writes do
//! not depend on directory listing order.

use std::{fs, path::Path};

use crate::{error::Error, layout::Layout};

/// Names of the subdirectories of `dir`, sorted.
fn subdirectories(dir: &Path) -> Result<Vec<String>, Error> {
    let read_dir = fs::read_dir(dir).map_err(|e| Error::from_io(dir, "list", e))?;
    let mut names = Vec::new();
    for dent in read_dir {
        let dent = dent.map_err(|e| Error::from_io(dir, "list", e))?;
        // Follows symlinks.
        if !dent.path().is_dir() {
            continue;
        }
        match dent.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::warn!("Skipping non UTF-8 directory name {:?}", name),
        }
    }
    names.sort();
    Ok(names)
}

/// Modules under `root` that have a default-language resource file, excluding the
/// aggregate module.
pub fn discover_modules(root: &Path, layout: &Layout) -> Result<Vec<String>, Error> {
    let mut modules = Vec::new();
    for name in subdirectories(root)? {
        if name == layout.aggregate_module {
            continue;
        }
        let path = layout.resource_path(root, &name, &layout.default_language_dir, false)?;
        if path.is_file() {
            modules.push(name);
        }
    }
    log::debug!("Discovered {} module(s): {:?}", modules.len(), modules);
    Ok(modules)
}

/// Language directories of the aggregate module that hold a resource file.
pub fn discover_languages(root: &Path, layout: &Layout) -> Result<Vec<String>, Error> {
    let resource_root = layout.resource_root(root, &layout.aggregate_module);
    let mut languages = Vec::new();
    for name in subdirectories(&resource_root)? {
        if !layout.is_language_dir(&name) {
            continue;
        }
        if resource_root.join(&name).join(&layout.file_name).is_file() {
            languages.push(name);
        } else {
            log::warn!(
                "Skipping {}: no {} inside",
                resource_root.join(&name).display(),
                layout.file_name
            );
        }
    }
    log::debug!("Discovered {} language(s): {:?}", languages.len(), languages);
    Ok(languages)
}
