//! Combine and split runs over a project tree.
//!
//! Every input is read and transformed in memory before the first file is
//! written, so a failing run leaves the tree as it was. Each file is written to a
//! temporary sibling and renamed into place.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{
    discovery::{discover_languages, discover_modules},
    error::Error,
    layout::Layout,
    operations::{ModuleSummary, combine_module, split_document},
    traits::Parser,
    types::ResourceDocument,
};

/// Result of a combine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombineReport {
    pub output: PathBuf,
    pub modules: Vec<ModuleSummary>,
}

impl CombineReport {
    /// Number of entries written to the combined file.
    pub fn total_entries(&self) -> usize {
        self.modules.iter().map(|m| m.kept).sum()
    }
}

/// One per-module file written by a split run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub module: String,
    pub path: PathBuf,
    pub entries: usize,
}

/// Files written for one language directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageSummary {
    pub language_dir: String,
    pub files: Vec<WrittenFile>,
}

/// Result of a split run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SplitReport {
    pub languages: Vec<LanguageSummary>,
}

impl SplitReport {
    pub fn total_files(&self) -> usize {
        self.languages.iter().map(|l| l.files.len()).sum()
    }
}

/// Merges the default-language strings of every module into the aggregate
/// module's default-language file.
pub fn combine(root: &Path, layout: &Layout) -> Result<CombineReport, Error> {
    let modules = discover_modules(root, layout)?;
    if modules.is_empty() {
        log::warn!("No module with {} found under {}", layout.file_name, root.display());
    }

    let mut aggregate = ResourceDocument::new();
    let mut summaries = Vec::with_capacity(modules.len());
    for module in &modules {
        let path = layout.resource_path(root, module, &layout.default_language_dir, false)?;
        let document = ResourceDocument::read_from(&path).map_err(|e| e.in_module(module))?;
        let summary =
            combine_module(&mut aggregate, module, &document).map_err(|e| e.in_module(module))?;
        log::info!(
            "Combined {}: {} entries, {} skipped",
            module,
            summary.kept,
            summary.dropped
        );
        summaries.push(summary);
    }

    let output = layout.resource_path(
        root,
        &layout.aggregate_module,
        &layout.default_language_dir,
        true,
    )?;
    write_document(&aggregate, &output)?;
    log::info!("Wrote {}", output.display());

    Ok(CombineReport {
        output,
        modules: summaries,
    })
}

/// Fans every translated aggregate file back out into per-module files.
pub fn split(root: &Path, layout: &Layout) -> Result<SplitReport, Error> {
    let languages = discover_languages(root, layout)?;
    if languages.is_empty() {
        log::warn!(
            "No translated {} found in module {}",
            layout.file_name,
            layout.aggregate_module
        );
    }

    let mut planned = Vec::with_capacity(languages.len());
    for language_dir in languages {
        let path = layout.resource_path(root, &layout.aggregate_module, &language_dir, false)?;
        let modules = ResourceDocument::read_from(&path)
            .and_then(|document| split_document(&document))
            .map_err(|e| e.in_language(&language_dir))?;
        if modules.contains_key(&layout.aggregate_module) {
            return Err(Error::InvalidModuleName(layout.aggregate_module.clone())
                .in_language(&language_dir));
        }
        planned.push((language_dir, modules));
    }

    let mut report = SplitReport::default();
    for (language_dir, modules) in planned {
        let mut files = Vec::with_capacity(modules.len());
        for (module, document) in modules {
            let path = layout.resource_path(root, &module, &language_dir, true)?;
            write_document(&document, &path)?;
            log::info!("Wrote {}", path.display());
            files.push(WrittenFile {
                module,
                path,
                entries: document.entries().count(),
            });
        }
        report.languages.push(LanguageSummary { language_dir, files });
    }
    Ok(report)
}

/// Writes `document` to a temporary file next to `path`, then renames it over `path`.
pub fn write_document(document: &ResourceDocument, path: &Path) -> Result<(), Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::from_io(dir, "create a temporary file in", e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        document.to_writer(&mut writer)?;
        writer
            .flush()
            .map_err(|e| Error::from_io(path, "write", e))?;
    }

    // Temporary files are created owner-only; keep what the replaced file had.
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::from_io(path, "set permissions on", e))?;
    }

    temp.persist(path)
        .map_err(|e| Error::from_io(path, "replace", e.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
