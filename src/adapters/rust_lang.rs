//! Rust language adapter — a lighter adapter than the TypeScript reference
//! implementation (§4.2 calls TypeScript "the reference implementation").
//!
//! Rust's grammar keeps visibility keywords (`pub`, `pub(crate)`) and
//! modifiers as part of the declaration node's own text range, unlike the
//! JS/TS family where `export` lives on a wrapping sibling node. That means
//! this adapter does not need a detached visibility-prefix computation the
//! way TypeScript does: raw node text already carries it, so
//! `visibility_prefix` is always empty and the header/declaration renderers
//! work directly off a brace/semicolon scan, grounded in the teacher's
//! `extract_fn_signature` / `extract_type_signature` helpers
//! (`examples/SaschaOnTour-rlm/src/ingest/code/rust.rs`).

use tree_sitter::{Language, Node, Query};

use crate::adapter::{FunctionRenderCtx, LanguageAdapter};
use crate::profile::{SkeletonKind, SyntaxProfile};

const QUERY_SRC: &str = r"
    (struct_item name: (type_identifier) @struct.name) @struct.definition
    (enum_item name: (type_identifier) @enum.name) @enum.definition
    (trait_item name: (type_identifier) @trait.name) @trait.definition
    (impl_item type: (type_identifier) @impl.name) @impl.definition
    (mod_item name: (identifier) @mod.name) @mod.definition
    (function_item name: (identifier) @fn.name) @fn.definition
    (const_item name: (identifier) @const.name) @const.definition
    (static_item name: (identifier) @static.name) @static.definition
    (type_item name: (type_identifier) @type.name) @type.definition
    (use_declaration) @module.import_statement
";

const PROFILE: SyntaxProfile = SyntaxProfile {
    class_like_node_types: &["struct_item", "enum_item", "trait_item", "impl_item", "mod_item"],
    function_like_node_types: &["function_item"],
    field_like_node_types: &["const_item", "static_item"],
    decorator_node_types: &["attribute_item"],
    identifier_field_name: "name",
    body_field_name: "body",
    parameters_field_name: "parameters",
    return_type_field_name: "return_type",
    type_parameters_field_name: "type_parameters",
    capture_configuration: &[
        ("struct.definition", SkeletonKind::ClassLike),
        ("enum.definition", SkeletonKind::ClassLike),
        ("trait.definition", SkeletonKind::ClassLike),
        ("impl.definition", SkeletonKind::ClassLike),
        ("mod.definition", SkeletonKind::ClassLike),
        ("fn.definition", SkeletonKind::FunctionLike),
        ("const.definition", SkeletonKind::FieldLike),
        ("static.definition", SkeletonKind::FieldLike),
        ("type.definition", SkeletonKind::AliasLike),
    ],
    async_keyword_node_type: "",
    modifier_node_types: &[],
};

pub struct RustAdapter {
    language: Language,
    query: Query,
}

impl Default for RustAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RustAdapter {
    #[must_use]
    pub fn new() -> Self {
        let language: Language = tree_sitter_rust::LANGUAGE.into();
        let query = Query::new(&language, QUERY_SRC).expect("Rust definition query must compile");
        Self { language, query }
    }
}

/// Slice `node`'s text up to its opening brace (header form) or, failing
/// that, its terminating semicolon — mirrors the teacher's
/// `extract_type_signature`/`extract_fn_signature` helpers.
fn header_up_to_body(node: Node<'_>, source: &[u8]) -> String {
    let text = node.utf8_text(source).unwrap_or("").trim();
    if let Some(pos) = text.find('{') {
        let sig = text[..pos].trim();
        let sig = sig.split("\nwhere").next().unwrap_or(sig).trim();
        sig.to_string()
    } else if let Some(pos) = text.find(';') {
        text[..=pos].trim().to_string()
    } else {
        text.lines().next().unwrap_or("").trim().to_string()
    }
}

impl LanguageAdapter for RustAdapter {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn language(&self) -> Language {
        self.language.clone()
    }

    fn query(&self) -> &Query {
        &self.query
    }

    fn profile(&self) -> &SyntaxProfile {
        &PROFILE
    }

    fn extract_simple_name(&self, node: Node<'_>, source: &[u8]) -> Option<String> {
        if node.kind() == "impl_item" {
            node.child_by_field_name("type")
                .and_then(|n| n.utf8_text(source).ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        } else {
            None
        }
    }

    fn visibility_prefix(&self, _node: Node<'_>, _source: &[u8]) -> String {
        String::new()
    }

    fn render_class_header(&self, node: Node<'_>, source: &[u8], _prefix: &str) -> String {
        let header = header_up_to_body(node, source);
        if header.ends_with(';') || header.ends_with('{') {
            header
        } else {
            format!("{header} {{")
        }
    }

    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String {
        header_up_to_body(ctx.node, ctx.source) + " " + self.body_placeholder()
    }

    fn build_function_skeleton(
        &self,
        node: Node<'_>,
        source: &[u8],
        _simple_name: &str,
        _prefix: &str,
    ) -> String {
        let header = header_up_to_body(node, source);
        if header.ends_with(';') {
            header
        } else {
            format!("{header} {}", self.body_placeholder())
        }
    }

    fn render_field_signature(
        &self,
        node: Node<'_>,
        source: &[u8],
        _prefix: &str,
        _in_enum_body: bool,
    ) -> String {
        node.utf8_text(source).unwrap_or("").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn adapter() -> RustAdapter {
        RustAdapter::new()
    }

    #[test]
    fn extracts_function_and_struct() {
        let source = "pub fn hello(name: &str) -> String {\n    format!(\"hi {}\", name)\n}\n\npub struct Config {\n    pub name: String,\n}\n";
        let result = analyze_file(&adapter(), "lib.rs", source);
        let fn_unit = result
            .top_level
            .iter()
            .find(|u| u.short_name.ends_with("hello"))
            .expect("hello function unit");
        let sigs = &result.signatures[fn_unit];
        assert!(sigs[0].contains("pub fn hello"));
        assert!(sigs[0].contains("{ ... }"));

        let struct_unit = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Config")
            .expect("Config struct unit");
        assert!(result.signatures[struct_unit][0].contains("pub struct Config {"));
    }

    #[test]
    fn methods_nest_under_impl() {
        let source = "pub struct Config;\n\nimpl Config {\n    pub fn new() -> Self {\n        Self\n    }\n}\n";
        let result = analyze_file(&adapter(), "lib.rs", source);
        let impl_unit = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Config" && result.children.contains_key(*u))
            .expect("impl unit with children");
        let kids = &result.children[impl_unit];
        assert_eq!(kids.len(), 1);
        assert!(kids[0].short_name.ends_with(".new"));
    }

    #[test]
    fn use_declarations_become_module_unit() {
        let source = "use std::collections::HashMap;\nuse crate::error::Result;\n\nfn main() {}\n";
        let result = analyze_file(&adapter(), "lib.rs", source);
        assert_eq!(&*result.top_level[0].short_name, "_module_");
        let imports = &result.signatures[&result.top_level[0]];
        assert!(imports.iter().any(|s| s.contains("HashMap")));
    }

    #[test]
    fn empty_file_produces_no_units() {
        let result = analyze_file(&adapter(), "empty.rs", "");
        assert!(result.top_level.is_empty());
    }
}
