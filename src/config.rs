//! Listing configuration loaded from a JSON document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ListError;

/// Configuration for one listing run. Immutable after load.
///
/// Root resolution: if `roots` is present it wins; every entry is listed in
/// order, blank entries meaning the current directory, and an empty array
/// listing nothing. Otherwise `root` is used, falling back to the current
/// directory when absent or blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Single directory to list. Ignored when `roots` is present.
    pub root: Option<String>,
    /// Multiple directories to list, in order.
    pub roots: Option<Vec<String>>,
    /// Root directory for generated output files. Empty means stdout.
    pub output: String,
    /// Reproduce the legacy fixed-width report format byte-for-byte,
    /// including its directory sort order.
    pub legacy: bool,
    /// Print directories containing no files with a `[NO FILES]` label.
    /// Has no effect in legacy mode, which never prints empty directories.
    pub print_empty_dirs: bool,
    /// Regex patterns of directories to skip recursion of. Matching
    /// directories are shown with a `[SKIPPED]` label.
    pub skip_dirs: Option<Vec<String>>,
    /// Regex patterns of directories to split into separate output files,
    /// shown in the parent listing with a `[SEPARATED]` label. No effect
    /// when output is stdout.
    pub separate_dirs: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            roots: None,
            output: String::new(),
            legacy: false,
            print_empty_dirs: true,
            skip_dirs: None,
            separate_dirs: None,
        }
    }
}

impl Config {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ListError> {
        let text = fs::read_to_string(path).map_err(|e| ListError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| ListError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Whether output goes to generated files rather than stdout.
    pub fn output_to_file(&self) -> bool {
        !self.output.trim().is_empty()
    }
}
