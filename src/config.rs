//! Project Harness configuration (§2.1, §9 "Configuration").
//!
//! A small in-process options struct, not a persisted settings file: per
//! §2.1 this belongs to the excluded GUI/IDE layer, so there is no
//! `config.toml` round-trip here, only a `Default` impl mirroring the
//! defaults an IDE-hosted caller would otherwise have configured by hand.

use std::collections::HashMap;
use std::path::PathBuf;

/// Options for one [`crate::harness::ProjectHarness`] run.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Root directory to scan.
    pub project_root: PathBuf,
    /// Extension (without dot, lowercase) → language id table. Only files
    /// whose extension appears here are dispatched to an adapter; removing
    /// an entry is how a caller opts a language out without touching code.
    pub extensions: HashMap<String, String>,
    /// Directories excluded from the walk, normalized to absolute paths by
    /// the harness before the walk starts.
    pub exclude: Vec<PathBuf>,
    /// Files larger than this are skipped (0 = unlimited).
    pub max_file_size_bytes: u64,
    /// `None` uses rayon's global pool (hardware parallelism); `Some(n)`
    /// builds a dedicated pool of `n` workers for this run.
    pub thread_count: Option<usize>,
}

impl HarnessOptions {
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_exclude(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.exclude = dirs.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_max_file_size_mb(mut self, mb: u32) -> Self {
        self.max_file_size_bytes = u64::from(mb) * 1024 * 1024;
        self
    }

    #[must_use]
    pub fn with_thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n);
        self
    }
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            extensions: default_extension_table(),
            exclude: default_exclusions(),
            max_file_size_bytes: 10 * 1024 * 1024,
            thread_count: None,
        }
    }
}

fn default_extension_table() -> HashMap<String, String> {
    [
        ("rs", "rust"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("mts", "typescript"),
        ("cts", "typescript"),
        ("js", "javascript"),
        ("jsx", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("go", "go"),
        ("py", "python"),
        ("pyi", "python"),
    ]
    .into_iter()
    .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
    .collect()
}

fn default_exclusions() -> Vec<PathBuf> {
    [
        "node_modules",
        "target",
        "dist",
        "build",
        ".git",
        "__pycache__",
        ".venv",
        "venv",
        "vendor",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_extensions_cover_all_adapters() {
        let opts = HarnessOptions::default();
        for ext in ["rs", "ts", "js", "go", "py"] {
            assert!(opts.extensions.contains_key(ext), "missing {ext}");
        }
    }

    #[test]
    fn builder_overrides_defaults() {
        let opts = HarnessOptions::new("/proj")
            .with_exclude([PathBuf::from("fixtures")])
            .with_max_file_size_mb(1)
            .with_thread_count(4);
        assert_eq!(opts.project_root, PathBuf::from("/proj"));
        assert_eq!(opts.exclude, vec![PathBuf::from("fixtures")]);
        assert_eq!(opts.max_file_size_bytes, 1024 * 1024);
        assert_eq!(opts.thread_count, Some(4));
    }
}
