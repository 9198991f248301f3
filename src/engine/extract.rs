//! Per-file extraction pipeline (C5), §4.1.1.
//!
//! [`analyze_file`] is the only entry point: given an adapter and one file's
//! relative path and source text, it runs the full pipeline (parse, query,
//! collect definitions, order, resolve parents, build signatures) and
//! returns a self-contained [`FileAnalysisResult`] ready to be merged into
//! the engine's global maps by the harness (§5).

use std::cell::RefCell;
use std::collections::HashMap;

use tree_sitter::{Node, Parser, QueryCursor, StreamingIterator};

use crate::adapter::{DefinitionCtx, LanguageAdapter};
use crate::model::{CodeUnit, SourceRange};
use crate::profile::SkeletonKind;

thread_local! {
    /// One parser per worker thread per language, reused for the thread's
    /// lifetime (§5 "Both are lazily created per worker... and reused").
    /// Parsers are not `Send`/`Sync`, so this cannot be a shared pool.
    static PARSERS: RefCell<HashMap<&'static str, Parser>> = RefCell::new(HashMap::new());
}

/// One file's contribution to the engine's global maps, before merging.
#[derive(Debug, Default, Clone)]
pub struct FileAnalysisResult {
    pub top_level: Vec<CodeUnit>,
    pub children: HashMap<CodeUnit, Vec<CodeUnit>>,
    pub signatures: HashMap<CodeUnit, Vec<String>>,
    pub ranges: HashMap<CodeUnit, Vec<SourceRange>>,
}

/// Strip a leading UTF-8 BOM, if present (§4.1.1 step 1).
#[must_use]
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}

fn parent_fq_name(package_name: &str, class_chain: &str) -> String {
    if package_name.is_empty() {
        class_chain.to_string()
    } else {
        format!("{package_name}.{class_chain}")
    }
}

fn compute_class_chain(adapter: &dyn LanguageAdapter, node: Node<'_>, source: &[u8]) -> String {
    let profile = adapter.profile();
    let mut chain = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        if profile.is_class_like(parent.kind()) {
            if let Some(name) = adapter
                .extract_simple_name(parent, source)
                .or_else(|| default_simple_name(adapter, parent, source))
            {
                chain.push(name);
            }
        }
        current = parent.parent();
    }
    chain.reverse();
    chain.join("$")
}

fn default_simple_name(adapter: &dyn LanguageAdapter, node: Node<'_>, source: &[u8]) -> Option<String> {
    node.child_by_field_name(adapter.profile().identifier_field_name)
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn build_signature(adapter: &dyn LanguageAdapter, ctx: &DefinitionCtx<'_>) -> Option<String> {
    let kind = adapter.profile().skeleton_kind_for_capture(ctx.capture_name);
    let prefix = adapter.visibility_prefix(ctx.node, ctx.source);
    let text = match kind {
        SkeletonKind::ClassLike => adapter.render_class_header(ctx.node, ctx.source, &prefix),
        SkeletonKind::FunctionLike => {
            adapter.build_function_skeleton(ctx.node, ctx.source, ctx.simple_name, &prefix)
        }
        SkeletonKind::FieldLike => {
            adapter.render_field_signature(ctx.node, ctx.source, &prefix, adapter.is_enum_member(ctx.node))
        }
        SkeletonKind::AliasLike => adapter.render_field_signature(ctx.node, ctx.source, &prefix, false),
        SkeletonKind::ModuleStatement | SkeletonKind::Unsupported => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Run the full per-file extraction pipeline.
///
/// `relative_path` is the key stored on every [`CodeUnit`] produced; it
/// should be stable and project-relative (the harness is responsible for
/// computing it from the absolute path).
pub fn analyze_file(
    adapter: &dyn LanguageAdapter,
    relative_path: &str,
    source: &str,
) -> FileAnalysisResult {
    let mut result = FileAnalysisResult::default();
    let source_bytes = source.as_bytes();
    let package_name = adapter.determine_package_name(relative_path);

    let parsed = PARSERS.with(|cell| {
        let mut map = cell.borrow_mut();
        let parser = map.entry(adapter.language_id()).or_insert_with(|| {
            let mut p = Parser::new();
            p.set_language(&adapter.language())
                .expect("grammar must be loadable by the tree-sitter runtime it was built against");
            p
        });
        parser.parse(source, None)
    });

    let Some(tree) = parsed else {
        tracing::warn!(file = relative_path, "tree-sitter parse returned a null root; skipping file");
        return result;
    };
    let root = tree.root_node();

    let query = adapter.query();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source_bytes);

    // node id -> (capture_name, simple_name); first writer wins (§4.1.1 step 4).
    let mut definitions: HashMap<usize, (String, String)> = HashMap::new();
    let mut def_nodes: HashMap<usize, Node<'_>> = HashMap::new();
    let mut imports: Vec<String> = Vec::new();

    while let Some(m) = matches.next() {
        let mut names_in_match: HashMap<&str, Node<'_>> = HashMap::new();
        for cap in m.captures {
            let cap_name = query.capture_names()[cap.index as usize];
            if adapter.ignored_captures().contains(&cap_name) {
                continue;
            }
            names_in_match.insert(cap_name, cap.node);
        }

        for (&cap_name, &node) in &names_in_match {
            if let Some(kind_prefix) = cap_name.strip_suffix(".definition") {
                let name_cap = format!("{kind_prefix}.name");
                let simple_name = names_in_match
                    .get(name_cap.as_str())
                    .and_then(|n| n.utf8_text(source_bytes).ok())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .or_else(|| adapter.extract_simple_name(node, source_bytes))
                    .or_else(|| default_simple_name(adapter, node, source_bytes));

                match simple_name {
                    Some(simple_name) => {
                        let id = node.id();
                        definitions
                            .entry(id)
                            .or_insert_with(|| (cap_name.to_string(), simple_name));
                        def_nodes.entry(id).or_insert(node);
                    }
                    None => {
                        tracing::warn!(
                            file = relative_path,
                            capture = cap_name,
                            "missing or blank name capture; dropping definition"
                        );
                    }
                }
            }
        }

        if let Some(import_node) = names_in_match.get("module.import_statement") {
            if let Ok(text) = import_node.utf8_text(source_bytes) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    imports.push(trimmed.to_string());
                }
            }
        }
    }

    let mut ordered: Vec<usize> = definitions.keys().copied().collect();
    ordered.sort_by_key(|id| def_nodes[id].start_byte());

    let mut fq_index: HashMap<String, CodeUnit> = HashMap::new();

    for id in ordered {
        let node = def_nodes[&id];
        let (capture_name, simple_name) = definitions[&id].clone();
        let class_chain = compute_class_chain(adapter, node, source_bytes);

        let ctx = DefinitionCtx {
            node,
            source: source_bytes,
            capture_name: &capture_name,
            simple_name: &simple_name,
            package_name: &package_name,
            class_chain: &class_chain,
        };

        let Some(unit) = adapter.create_code_unit(relative_path, &ctx) else {
            continue;
        };
        let Some(signature) = build_signature(adapter, &ctx) else {
            continue;
        };

        let range = SourceRange {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
        };

        let is_new = !result.signatures.contains_key(&unit);
        let sig_list = result.signatures.entry(unit.clone()).or_default();
        if !sig_list.contains(&signature) {
            sig_list.push(signature);
        }
        result.ranges.entry(unit.clone()).or_default().push(range);

        if is_new {
            fq_index.insert(unit.fq_name(), unit.clone());
            if class_chain.is_empty() {
                if !result.top_level.contains(&unit) {
                    result.top_level.push(unit.clone());
                }
            } else {
                let parent_fq = parent_fq_name(&package_name, &class_chain);
                match fq_index.get(&parent_fq).cloned() {
                    Some(parent_unit) => {
                        let kids = result.children.entry(parent_unit).or_default();
                        if !kids.contains(&unit) {
                            kids.push(unit.clone());
                        }
                    }
                    None => {
                        tracing::warn!(
                            file = relative_path,
                            fq_name = %unit.fq_name(),
                            parent = %parent_fq,
                            "unresolvable parent; promoting to top-level"
                        );
                        if !result.top_level.contains(&unit) {
                            result.top_level.push(unit.clone());
                        }
                    }
                }
            }
        }
    }

    if !imports.is_empty() {
        let module_unit = CodeUnit::module(relative_path, package_name.as_str());
        let sig_list = result.signatures.entry(module_unit.clone()).or_default();
        for import in imports {
            if !sig_list.contains(&import) {
                sig_list.push(import);
            }
        }
        result.top_level.retain(|u| *u != module_unit);
        result.top_level.insert(0, module_unit);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_bom_removes_prefix() {
        let with_bom = b"\xEF\xBB\xBFfn main() {}";
        assert_eq!(strip_bom(with_bom), b"fn main() {}");
    }

    #[test]
    fn strip_bom_is_noop_without_prefix() {
        let plain = b"fn main() {}";
        assert_eq!(strip_bom(plain), plain);
    }

    #[test]
    fn parent_fq_name_handles_empty_package() {
        assert_eq!(parent_fq_name("", "Outer"), "Outer");
        assert_eq!(parent_fq_name("pkg", "Outer"), "pkg.Outer");
    }
}
