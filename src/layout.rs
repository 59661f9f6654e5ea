//! Directory and naming conventions of a multi-module Android project.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::Error;

/// Optional per-project overrides, looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "i18n-atlas.toml";

/// Where string resources live and how language directories are named.
///
/// The defaults describe a standard Android Gradle project:
/// `<module>/src/main/res/values[-<code>]/strings.xml`, with the aggregate
/// module called `i18n`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Module holding the combined files.
    pub aggregate_module: String,
    /// Resource directory relative to a module.
    pub resource_dir: PathBuf,
    /// Resource file name inside a language directory.
    pub file_name: String,
    /// Language directory of the source-of-truth language.
    pub default_language_dir: String,
    /// Prefix shared by every other language directory.
    pub language_dir_prefix: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            aggregate_module: "i18n".to_string(),
            resource_dir: Path::new("src").join("main").join("res"),
            file_name: "strings.xml".to_string(),
            default_language_dir: "values".to_string(),
            language_dir_prefix: "values-".to_string(),
        }
    }
}

impl Layout {
    /// Creates the default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `i18n-atlas.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::from_io(&path, "read", e))?;
        let layout: Layout = toml::from_str(&text).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        layout.validate().map_err(|message| Error::Config { path, message })?;
        log::debug!("Loaded layout from {}: {:?}", CONFIG_FILE_NAME, layout);
        Ok(layout)
    }

    /// Sets the aggregate module name.
    pub fn with_aggregate_module(mut self, module: impl Into<String>) -> Self {
        self.aggregate_module = module.into();
        self
    }

    /// Sets the module-relative resource directory.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    /// Sets the resource file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Sets the default language directory name.
    pub fn with_default_language_dir(mut self, dir: impl Into<String>) -> Self {
        self.default_language_dir = dir.into();
        self
    }

    /// Sets the prefix of non-default language directories.
    pub fn with_language_dir_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.language_dir_prefix = prefix.into();
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.aggregate_module.is_empty() || self.aggregate_module.contains(['/', '\\', '.']) {
            return Err(format!(
                "aggregate_module `{}` must be a plain directory name",
                self.aggregate_module
            ));
        }
        if self.file_name.is_empty() {
            return Err("file_name must not be empty".to_string());
        }
        if self.language_dir_prefix.is_empty() {
            return Err("language_dir_prefix must not be empty".to_string());
        }
        if self.default_language_dir.starts_with(&self.language_dir_prefix) {
            return Err(format!(
                "default_language_dir `{}` must not start with language_dir_prefix `{}`",
                self.default_language_dir, self.language_dir_prefix
            ));
        }
        Ok(())
    }

    /// `<root>/<module>/<resource_dir>`
    pub fn resource_root(&self, root: &Path, module: &str) -> PathBuf {
        root.join(module).join(&self.resource_dir)
    }

    /// Resolves `<root>/<module>/<resource_dir>/<language_dir>/<file_name>`.
    ///
    /// With `create_dirs`, missing parent directories are created; existing ones are fine.
    pub fn resource_path(
        &self,
        root: &Path,
        module: &str,
        language_dir: &str,
        create_dirs: bool,
    ) -> Result<PathBuf, Error> {
        let dir = self.resource_root(root, module).join(language_dir);
        if create_dirs {
            fs::create_dir_all(&dir).map_err(|e| Error::from_io(&dir, "create directory", e))?;
        }
        Ok(dir.join(&self.file_name))
    }

    /// Whether `name` is a non-default language directory (`values-fr`, `values-pt-rBR`, ...).
    pub fn is_language_dir(&self, name: &str) -> bool {
        name.len() > self.language_dir_prefix.len() && name.starts_with(&self.language_dir_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resource_path_convention() {
        let layout = Layout::new();
        let path = layout
            .resource_path(Path::new("/project"), "auth", "values", false)
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/project/auth/src/main/res/values/strings.xml")
        );
    }

    #[test]
    fn test_resource_path_creates_dirs_idempotently() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new();
        let path = layout
            .resource_path(dir.path(), "i18n", "values-uk", true)
            .unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
        let again = layout
            .resource_path(dir.path(), "i18n", "values-uk", true)
            .unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_resource_path_surfaces_fs_errors() {
        let dir = TempDir::new().unwrap();
        // A file where a directory is expected.
        fs::write(dir.path().join("auth"), "").unwrap();
        let result = Layout::new().resource_path(dir.path(), "auth", "values", true);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_language_dir() {
        let layout = Layout::new();
        assert!(layout.is_language_dir("values-fr"));
        assert!(layout.is_language_dir("values-pt-rBR"));
        assert!(!layout.is_language_dir("values"));
        assert!(!layout.is_language_dir("values-"));
        assert!(!layout.is_language_dir("drawable-hdpi"));
    }

    #[test]
    fn test_builder_setters() {
        let layout = Layout::new()
            .with_aggregate_module("translations")
            .with_resource_dir("res")
            .with_file_name("strings_app.xml")
            .with_default_language_dir("values")
            .with_language_dir_prefix("values-");
        let path = layout
            .resource_path(Path::new("p"), "core", "values-fr", false)
            .unwrap();
        assert_eq!(path, PathBuf::from("p/core/res/values-fr/strings_app.xml"));
        assert_eq!(layout.aggregate_module, "translations");
    }

    #[test]
    fn test_load_defaults_without_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Layout::load(dir.path()).unwrap(), Layout::default());
    }

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "aggregate_module = \"translations\"\nresource_dir = \"res\"\n",
        )
        .unwrap();
        let layout = Layout::load(dir.path()).unwrap();
        assert_eq!(layout.aggregate_module, "translations");
        assert_eq!(layout.resource_dir, PathBuf::from("res"));
        assert_eq!(layout.file_name, "strings.xml");
    }

    #[test]
    fn test_load_rejects_unknown_and_invalid_keys() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config, "aggregate = \"x\"\n").unwrap();
        assert!(matches!(
            Layout::load(dir.path()),
            Err(Error::Config { .. })
        ));

        fs::write(&config, "aggregate_module = \"my.module\"\n").unwrap();
        assert!(matches!(
            Layout::load(dir.path()),
            Err(Error::Config { .. })
        ));
    }
}
