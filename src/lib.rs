#![forbid(unsafe_code)]
//! Translation file management for multi-module Android projects.
//!
//! Each module keeps its own `src/main/res/values*/strings.xml`. Translation
//! vendors want a single file per language, so this crate reshapes the tree in
//! both directions:
//!
//! - **combine**: merges every module's default-language strings into
//!   `i18n/src/main/res/values/strings.xml`, prefixing each key with its module
//!   (`auth.login_title`) and leaving out entries that must not be translated.
//! - **split**: takes each translated `i18n/src/main/res/values-<code>/strings.xml`
//!   and writes its entries back to `<module>/src/main/res/values-<code>/strings.xml`
//!   with the prefix removed.
//!
//! Comments directly above an entry travel with it both ways, entry payloads
//! are copied byte for byte, and entry order is preserved.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use i18n_atlas::{Layout, combine, split};
//!
//! let root = Path::new(".");
//! let layout = Layout::load(root)?;
//! let report = combine(root, &layout)?;
//! println!("{} entries written to {}", report.total_entries(), report.output.display());
//!
//! // ... after the vendor returns i18n/src/main/res/values-*/strings.xml
//! split(root, &layout)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod discovery;
mod document;
pub mod error;
pub mod layout;
pub mod namespace;
pub mod operations;
pub mod pipeline;
pub mod rename;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    discovery::{discover_languages, discover_modules},
    error::Error,
    layout::Layout,
    namespace::{DropReason, Filtered, qualify, strip_namespace, unqualify},
    operations::{ModuleSummary, combine_documents, combine_module, split_document},
    pipeline::{CombineReport, SplitReport, combine, split},
    rename::{Rename, replace_underscores},
    traits::Parser,
    types::{CommentNode, EntryKind, Node, ResourceDocument, ResourceEntry},
};
