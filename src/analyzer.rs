//! Public query surface (§6), backed by the immutable snapshot a
//! [`crate::harness::ProjectHarness`] run produces.
//!
//! Every method here is a read over the four global maps plus the raw file
//! sources kept for byte-slice accessors; none of it mutates, matching §3's
//! "Lifecycle" invariant that units never change once created.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::adapter::LanguageAdapter;
use crate::adapters;
use crate::error::{Result, SkeletonError};
use crate::model::{CodeUnit, CodeUnitKind, SourceRange};
use crate::reconstruct;

/// Immutable snapshot of one harness run; the type external collaborators
/// (CLI, future GUI/chat front-ends) actually query (§6).
pub struct Analyzer {
    top_level: HashMap<Arc<str>, Vec<CodeUnit>>,
    children: HashMap<CodeUnit, Vec<CodeUnit>>,
    signatures: HashMap<CodeUnit, Vec<String>>,
    ranges: HashMap<CodeUnit, Vec<SourceRange>>,
    sources: HashMap<Arc<str>, Arc<[u8]>>,
    /// Reverse of `children`, built once at construction for `getSkeleton`'s
    /// "topLevelParent" lookup and other ancestor walks.
    parent_of: HashMap<CodeUnit, CodeUnit>,
    /// `fqName → CodeUnit`, built once; first writer wins on a collision.
    by_fq_name: HashMap<String, CodeUnit>,
}

impl Analyzer {
    pub(crate) fn from_parts(
        top_level: HashMap<Arc<str>, Vec<CodeUnit>>,
        children: HashMap<CodeUnit, Vec<CodeUnit>>,
        signatures: HashMap<CodeUnit, Vec<String>>,
        ranges: HashMap<CodeUnit, Vec<SourceRange>>,
        sources: HashMap<Arc<str>, Arc<[u8]>>,
    ) -> Self {
        let mut parent_of = HashMap::new();
        for (parent, kids) in &children {
            for kid in kids {
                parent_of.entry(kid.clone()).or_insert_with(|| parent.clone());
            }
        }

        let mut by_fq_name = HashMap::new();
        for units in top_level.values() {
            for u in units {
                by_fq_name.entry(u.fq_name()).or_insert_with(|| u.clone());
            }
        }
        for (parent, kids) in &children {
            by_fq_name.entry(parent.fq_name()).or_insert_with(|| parent.clone());
            for kid in kids {
                by_fq_name.entry(kid.fq_name()).or_insert_with(|| kid.clone());
            }
        }

        Self {
            top_level,
            children,
            signatures,
            ranges,
            sources,
            parent_of,
            by_fq_name,
        }
    }

    fn adapter_for_file(&self, file: &str) -> Option<Box<dyn LanguageAdapter>> {
        let ext = std::path::Path::new(file).extension()?.to_str()?;
        adapters::for_extension(ext)
    }

    fn topmost(&self, unit: &CodeUnit) -> CodeUnit {
        let mut current = unit.clone();
        while let Some(parent) = self.parent_of.get(&current) {
            current = parent.clone();
        }
        current
    }

    /// `isEmpty() → bool`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_level.values().all(Vec::is_empty)
    }

    /// Every file that produced at least one top-level declaration. Not
    /// part of §6's accessor list; added so the CLI's `scan` subcommand can
    /// walk every file without reaching into analyzer internals.
    #[must_use]
    pub fn files(&self) -> Vec<Arc<str>> {
        self.top_level.keys().cloned().collect()
    }

    /// `getSkeletons(file) → ordered mapping from Code Unit to skeleton
    /// string`, with adapter post-processing applied (§4.4).
    #[must_use]
    pub fn get_skeletons(&self, file: &str) -> Vec<(CodeUnit, String)> {
        let Some(tops) = self.top_level.get(file) else {
            return Vec::new();
        };
        let Some(adapter) = self.adapter_for_file(file) else {
            return Vec::new();
        };
        let empty: Arc<[u8]> = Arc::from(Vec::new().into_boxed_slice());
        let source = self.sources.get(file).unwrap_or(&empty).clone();

        let pairs: Vec<(CodeUnit, String)> = tops
            .iter()
            .map(|u| {
                let skeleton = reconstruct::reconstruct(adapter.as_ref(), u, &self.signatures, &self.children);
                (u.clone(), skeleton)
            })
            .collect();

        adapter.post_process_skeletons(&source, pairs, &self.ranges)
    }

    /// `getSkeleton(fqName) → optional string`: the top-level parent's
    /// reconstructed skeleton containing the requested unit.
    #[must_use]
    pub fn get_skeleton(&self, fq_name: &str) -> Option<String> {
        let unit = self.by_fq_name.get(fq_name)?;
        let top = self.topmost(unit);
        self.get_skeletons(&top.file).into_iter().find(|(u, _)| *u == top).map(|(_, s)| s)
    }

    /// `getSkeletonHeader(fqName) → optional string`.
    #[must_use]
    pub fn get_skeleton_header(&self, fq_name: &str) -> Option<String> {
        self.get_skeleton(fq_name).and_then(|s| reconstruct::skeleton_header(&s).map(str::to_string))
    }

    /// `getDeclarationsInFile(file) → set of Code Units` (BFS closure of
    /// top-level and descendants).
    #[must_use]
    pub fn get_declarations_in_file(&self, file: &str) -> HashSet<CodeUnit> {
        let mut seen = HashSet::new();
        let Some(tops) = self.top_level.get(file) else {
            return seen;
        };
        let mut queue: VecDeque<CodeUnit> = tops.iter().cloned().collect();
        while let Some(unit) = queue.pop_front() {
            if !seen.insert(unit.clone()) {
                continue;
            }
            if let Some(kids) = self.children.get(&unit) {
                queue.extend(kids.iter().cloned());
            }
        }
        seen
    }

    /// `getAllDeclarations() → list of class-kind Code Units`.
    #[must_use]
    pub fn get_all_declarations(&self) -> Vec<CodeUnit> {
        self.by_fq_name.values().filter(|u| u.kind == CodeUnitKind::Class).cloned().collect()
    }

    /// `getMembersInClass(fqName) → ordered list of Code Units` (empty if
    /// absent or not class-like).
    #[must_use]
    pub fn get_members_in_class(&self, fq_name: &str) -> Vec<CodeUnit> {
        let Some(unit) = self.by_fq_name.get(fq_name) else {
            return Vec::new();
        };
        if !unit.is_class_like() {
            return Vec::new();
        }
        self.children.get(unit).cloned().unwrap_or_default()
    }

    /// `getDefinition(fqName) → optional Code Unit`.
    #[must_use]
    pub fn get_definition(&self, fq_name: &str) -> Option<CodeUnit> {
        self.by_fq_name.get(fq_name).cloned()
    }

    /// `getFileFor(fqName) → optional file`.
    #[must_use]
    pub fn get_file_for(&self, fq_name: &str) -> Option<Arc<str>> {
        self.by_fq_name.get(fq_name).map(|u| u.file.clone())
    }

    /// `searchDefinitions(substring) → list of Code Units` whose `fqName`
    /// contains the substring.
    #[must_use]
    pub fn search_definitions(&self, substring: &str) -> Vec<CodeUnit> {
        self.by_fq_name
            .iter()
            .filter(|(fq, _)| fq.contains(substring))
            .map(|(_, u)| u.clone())
            .collect()
    }

    /// `getClassSource(fqName) → string` (byte-slice of the first recorded
    /// range), or `SymbolNotFound`.
    pub fn get_class_source(&self, fq_name: &str) -> Result<String> {
        let unit = self
            .by_fq_name
            .get(fq_name)
            .ok_or_else(|| SkeletonError::SymbolNotFound { fq_name: fq_name.to_string() })?;
        let source = self
            .sources
            .get(&unit.file)
            .ok_or_else(|| SkeletonError::SymbolNotFound { fq_name: fq_name.to_string() })?;
        let range = self
            .ranges
            .get(unit)
            .and_then(|r| r.first())
            .ok_or_else(|| SkeletonError::SymbolNotFound { fq_name: fq_name.to_string() })?;
        Ok(String::from_utf8_lossy(&source[range.start_byte..range.end_byte]).into_owned())
    }

    /// `getMethodSource(fqName) → optional string` (all recorded ranges,
    /// joined with a blank line; overloads concatenate in recorded order).
    #[must_use]
    pub fn get_method_source(&self, fq_name: &str) -> Option<String> {
        let unit = self.by_fq_name.get(fq_name)?;
        let source = self.sources.get(&unit.file)?;
        let ranges = self.ranges.get(unit)?;
        let parts: Vec<String> = ranges
            .iter()
            .map(|r| String::from_utf8_lossy(&source[r.start_byte..r.end_byte]).into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// `getSymbols(units) → set of unqualified names` (BFS over children;
    /// last segment after the final `.` or `$`).
    #[must_use]
    pub fn get_symbols(&self, units: &HashSet<CodeUnit>) -> HashSet<String> {
        let mut out = HashSet::new();
        let mut queue: VecDeque<CodeUnit> = units.iter().cloned().collect();
        let mut seen = HashSet::new();
        while let Some(unit) = queue.pop_front() {
            if !seen.insert(unit.clone()) {
                continue;
            }
            out.insert(unit.unqualified_name().to_string());
            if let Some(kids) = self.children.get(&unit) {
                queue.extend(kids.iter().cloned());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn single_file_analyzer(adapter: &dyn LanguageAdapter, file: &str, source: &str) -> Analyzer {
        let result = analyze_file(adapter, file, source);
        let mut top_level = HashMap::new();
        top_level.insert(Arc::from(file), result.top_level);
        let mut sources = HashMap::new();
        sources.insert(Arc::from(file), Arc::from(source.as_bytes()));
        Analyzer::from_parts(top_level, result.children, result.signatures, result.ranges, sources)
    }

    #[test]
    fn is_empty_true_for_fresh_analyzer() {
        let analyzer = Analyzer::from_parts(HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new());
        assert!(analyzer.is_empty());
    }

    #[test]
    fn get_skeleton_and_members_round_trip() {
        use crate::adapters::rust_lang::RustAdapter;
        let adapter = RustAdapter::new();
        let source = "pub struct Point {\n    x: i32,\n}\n\nimpl Point {\n    pub fn new(x: i32) -> Self {\n        Self { x }\n    }\n}\n";
        let analyzer = single_file_analyzer(&adapter, "point.rs", source);

        let class = analyzer.get_all_declarations();
        assert_eq!(class.len(), 1);
        let fq = class[0].fq_name();

        let members = analyzer.get_members_in_class(&fq);
        assert!(members.iter().any(|m| m.short_name.ends_with(".new")));

        let skeleton = analyzer.get_skeleton(&fq).unwrap();
        assert!(skeleton.starts_with("pub struct Point {"));
        assert!(skeleton.trim_end().ends_with('}'));

        let header = analyzer.get_skeleton_header(&fq).unwrap();
        assert_eq!(header, "pub struct Point {");
    }

    #[test]
    fn get_class_source_slices_original_bytes() {
        use crate::adapters::rust_lang::RustAdapter;
        let adapter = RustAdapter::new();
        let source = "pub struct Marker;\n";
        let analyzer = single_file_analyzer(&adapter, "m.rs", source);
        let fq = analyzer.get_all_declarations()[0].fq_name();
        let text = analyzer.get_class_source(&fq).unwrap();
        assert_eq!(text, "pub struct Marker;");
    }

    #[test]
    fn get_class_source_missing_symbol_errors() {
        let analyzer = Analyzer::from_parts(HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new());
        let err = analyzer.get_class_source("nope.Foo").unwrap_err();
        assert!(matches!(err, SkeletonError::SymbolNotFound { .. }));
    }

    #[test]
    fn search_definitions_matches_substring() {
        use crate::adapters::rust_lang::RustAdapter;
        let adapter = RustAdapter::new();
        let source = "pub fn compute_total() -> i32 { 0 }\n";
        let analyzer = single_file_analyzer(&adapter, "math.rs", source);
        let hits = analyzer.search_definitions("compute");
        assert_eq!(hits.len(), 1);
    }
}
