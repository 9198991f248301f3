//! Project Harness (C8), §5 and §9 ("Concurrency & Resource Model").
//!
//! Enumerates a project's files with [`ignore::WalkBuilder`], fans out
//! per-file analysis over a `rayon` pool with one thread-local parser and
//! one thread-local adapter per worker, and merges each file's private
//! [`crate::engine::FileAnalysisResult`] into the four global maps with the
//! compute-and-swap semantics §5 specifies. A run is one-shot: once
//! `run()` returns, call [`ProjectHarness::into_analyzer`] to obtain the
//! immutable [`crate::analyzer::Analyzer`] callers actually query.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use ignore::WalkBuilder;
use rayon::prelude::*;

use crate::adapter::LanguageAdapter;
use crate::adapters;
use crate::analyzer::Analyzer;
use crate::config::HarnessOptions;
use crate::engine::{self, FileAnalysisResult};
use crate::error::Result;
use crate::model::{CodeUnit, SourceRange};

thread_local! {
    static ADAPTERS: RefCell<HashMap<String, Rc<dyn LanguageAdapter>>> = RefCell::new(HashMap::new());
}

fn with_adapter<R>(ext: &str, f: impl FnOnce(&dyn LanguageAdapter) -> R) -> Option<R> {
    ADAPTERS.with(|cell| {
        let mut map = cell.borrow_mut();
        if !map.contains_key(ext) {
            let adapter: Rc<dyn LanguageAdapter> = Rc::from(adapters::for_extension(ext)?);
            map.insert(ext.to_string(), adapter);
        }
        Some(f(map[ext].as_ref()))
    })
}

/// Run-scoped counters surfaced after a harness run for diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct HarnessStats {
    pub files_analyzed: usize,
    pub files_skipped: usize,
}

/// Enumerates and analyzes a project; see module docs.
pub struct ProjectHarness {
    options: HarnessOptions,
    cancel: Arc<AtomicBool>,
    top_level: DashMap<Arc<str>, Vec<CodeUnit>>,
    children: DashMap<CodeUnit, Vec<CodeUnit>>,
    signatures: DashMap<CodeUnit, Vec<String>>,
    ranges: DashMap<CodeUnit, Vec<SourceRange>>,
    sources: DashMap<Arc<str>, Arc<[u8]>>,
    files_analyzed: AtomicUsize,
    files_skipped: AtomicUsize,
}

impl ProjectHarness {
    #[must_use]
    pub fn new(options: HarnessOptions) -> Self {
        Self {
            options,
            cancel: Arc::new(AtomicBool::new(false)),
            top_level: DashMap::new(),
            children: DashMap::new(),
            signatures: DashMap::new(),
            ranges: DashMap::new(),
            sources: DashMap::new(),
            files_analyzed: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
        }
    }

    /// Shared flag a caller can flip to stop an in-flight run at the next
    /// file boundary (§5 "Cancellation").
    #[must_use]
    pub fn cancellation_token(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    #[must_use]
    pub fn stats(&self) -> HarnessStats {
        HarnessStats {
            files_analyzed: self.files_analyzed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
        }
    }

    /// Walk the configured root, analyze every matching file in parallel,
    /// and merge results into the global maps. Discards partial results if
    /// cancelled midway (§5 "Partial results from a cancelled run are
    /// discarded").
    pub fn run(&self) -> Result<()> {
        let root = self.options.project_root.clone();
        let excludes: Vec<PathBuf> = self
            .options
            .exclude
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
            .filter_map(|p| p.canonicalize().ok().or(Some(p)))
            .collect();

        let files: Vec<PathBuf> = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                let path = entry.path();
                !excludes.iter().any(|ex| path == ex || path.starts_with(ex))
            })
            .build()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .collect();

        let run = || {
            files.par_iter().for_each(|path| self.process_file(path, &root));
        };

        match self.options.thread_count {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| crate::error::SkeletonError::Other(e.to_string()))?;
                pool.install(run);
            }
            None => run(),
        }

        Ok(())
    }

    fn process_file(&self, path: &Path, root: &Path) {
        if self.cancel.load(Ordering::Relaxed) {
            return;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase) else {
            return;
        };
        if !self.options.extensions.contains_key(&ext) {
            return;
        }

        let relative: Arc<str> = Arc::from(
            path.strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/"),
        );

        let Ok(meta) = path.metadata() else {
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if self.options.max_file_size_bytes > 0 && meta.len() > self.options.max_file_size_bytes {
            tracing::warn!(file = %relative, "file exceeds max_file_size_bytes; skipping");
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Ok(bytes) = std::fs::read(path) else {
            tracing::warn!(file = %relative, "io error reading file; skipping");
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let stripped = engine::strip_bom(&bytes);
        let Ok(text) = std::str::from_utf8(stripped) else {
            tracing::warn!(file = %relative, "file is not valid utf-8; skipping");
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        if self.cancel.load(Ordering::Relaxed) {
            return;
        }

        let Some(result) = with_adapter(&ext, |adapter| engine::analyze_file(adapter, &relative, text)) else {
            tracing::warn!(file = %relative, ext = %ext, "no adapter registered for extension; skipping");
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        self.sources.insert(relative.clone(), Arc::from(stripped));
        self.merge(&relative, result);
        self.files_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    fn merge(&self, file: &Arc<str>, result: FileAnalysisResult) {
        self.top_level.insert(file.clone(), result.top_level);

        for (parent, new_kids) in result.children {
            self.children
                .entry(parent)
                .and_modify(|existing| {
                    for kid in &new_kids {
                        if !existing.contains(kid) {
                            existing.push(kid.clone());
                        }
                    }
                })
                .or_insert(new_kids);
        }

        for (unit, new_sigs) in result.signatures {
            self.signatures
                .entry(unit)
                .and_modify(|existing| {
                    for sig in &new_sigs {
                        if !existing.contains(sig) {
                            existing.push(sig.clone());
                        }
                    }
                })
                .or_insert(new_sigs);
        }

        for (unit, new_ranges) in result.ranges {
            self.ranges
                .entry(unit)
                .and_modify(|existing| existing.extend(new_ranges.clone()))
                .or_insert(new_ranges);
        }
    }

    /// Snapshot the global maps into an immutable [`Analyzer`]. Consumes
    /// the harness: per §3's lifecycle, units never mutate once created.
    #[must_use]
    pub fn into_analyzer(self) -> Analyzer {
        Analyzer::from_parts(
            self.top_level.into_iter().collect(),
            self.children.into_iter().collect(),
            self.signatures.into_iter().collect(),
            self.ranges.into_iter().collect(),
            self.sources.into_iter().collect(),
        )
    }
}

/// Convenience one-shot entry point: construct, run, snapshot.
pub fn analyze_project(options: HarnessOptions) -> Result<Analyzer> {
    let harness = ProjectHarness::new(options);
    harness.run()?;
    Ok(harness.into_analyzer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn run_discovers_and_analyzes_rust_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("lib.rs"), "pub fn greet() -> &'static str {\n    \"hi\"\n}\n").unwrap();
        let opts = HarnessOptions::new(tmp.path());
        let analyzer = analyze_project(opts).unwrap();
        assert!(!analyzer.is_empty());
    }

    #[test]
    fn run_skips_excluded_directories() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("generated.rs"), "pub fn ignored() {}\n").unwrap();
        fs::write(tmp.path().join("main.rs"), "pub fn kept() {}\n").unwrap();

        let opts = HarnessOptions::new(tmp.path());
        let analyzer = analyze_project(opts).unwrap();
        let stats_file = "main.rs";
        assert!(analyzer.get_declarations_in_file(stats_file).iter().any(|u| u.short_name.ends_with("kept")));
        assert!(analyzer.get_declarations_in_file("target/generated.rs").is_empty());
    }

    #[test]
    fn run_skips_unregistered_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello world").unwrap();
        let opts = HarnessOptions::new(tmp.path());
        let analyzer = analyze_project(opts).unwrap();
        assert!(analyzer.is_empty());
    }
}
