//! Skeleton Reconstructor (C7), §4.3.
//!
//! Walks the parent → children tree depth-first starting from a top-level
//! unit and assembles the indented textual skeleton. Never revisits a unit:
//! the parent-child map is acyclic by construction (parents are always
//! created before their children in source order, §4.1.1 step 5).

use std::collections::HashMap;

use crate::adapter::LanguageAdapter;
use crate::model::CodeUnit;

/// Reconstruct the full skeleton for one top-level unit and its descendants.
#[must_use]
pub fn reconstruct(
    adapter: &dyn LanguageAdapter,
    unit: &CodeUnit,
    signatures: &HashMap<CodeUnit, Vec<String>>,
    children: &HashMap<CodeUnit, Vec<CodeUnit>>,
) -> String {
    let mut out = String::new();
    write_unit(adapter, unit, signatures, children, 0, &mut out);
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

fn write_unit(
    adapter: &dyn LanguageAdapter,
    unit: &CodeUnit,
    signatures: &HashMap<CodeUnit, Vec<String>>,
    children: &HashMap<CodeUnit, Vec<CodeUnit>>,
    depth: usize,
    out: &mut String,
) {
    let indent = adapter.indent().repeat(depth);
    if let Some(sigs) = signatures.get(unit) {
        for sig in sigs {
            for line in sig.lines() {
                out.push_str(&indent);
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if let Some(kids) = children.get(unit) {
        for kid in kids {
            write_unit(adapter, kid, signatures, children, depth + 1, out);
        }
    }

    if unit.is_class_like() {
        let closer = adapter.closer(unit);
        if !closer.is_empty() {
            out.push_str(&indent);
            out.push_str(closer);
            out.push('\n');
        }
    }
}

/// First non-empty line of a reconstructed skeleton (§6 `getSkeletonHeader`).
#[must_use]
pub fn skeleton_header(skeleton: &str) -> Option<&str> {
    skeleton.lines().find(|l| !l.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rust_lang::RustAdapter;
    use crate::model::{CodeUnit, CodeUnitKind};

    #[test]
    fn reconstruct_class_like_with_one_child() {
        let adapter = RustAdapter::new();
        let class = CodeUnit::new(CodeUnitKind::Class, "a.rs", "", "Config");
        let method = CodeUnit::new(CodeUnitKind::Function, "a.rs", "", "Config.new");

        let mut signatures = HashMap::new();
        signatures.insert(class.clone(), vec!["pub struct Config {".to_string()]);
        signatures.insert(method.clone(), vec!["pub fn new() -> Self { ... }".to_string()]);

        let mut children = HashMap::new();
        children.insert(class.clone(), vec![method]);

        let skeleton = reconstruct(&adapter, &class, &signatures, &children);
        assert_eq!(
            skeleton,
            "pub struct Config {\n  pub fn new() -> Self { ... }\n}"
        );
    }

    #[test]
    fn skeleton_header_skips_blank_lines() {
        assert_eq!(skeleton_header("\n\nfoo\nbar"), Some("foo"));
        assert_eq!(skeleton_header(""), None);
    }
}
