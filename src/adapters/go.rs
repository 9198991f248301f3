//! Go language adapter.
//!
//! The teacher's own Go parser (`examples/SaschaOnTour-rlm/src/ingest/code/go.rs`)
//! does not capture method receivers at all — every `method_declaration` is
//! treated like a free function. This adapter's `create_code_unit` override
//! re-derives the receiver's type from the node directly (Go methods are not
//! lexically nested under their receiver type the way class methods are in
//! brace languages, so the engine's generic ancestor-walk `classChain` is
//! always empty for them) and nests the method under it, so `Counter.Add`
//! reads the way Go developers already think about it.

use tree_sitter::{Language, Node, Query};

use crate::adapter::{DefinitionCtx, FunctionRenderCtx, LanguageAdapter};
use crate::model::{CodeUnit, CodeUnitKind};
use crate::profile::{SkeletonKind, SyntaxProfile};

const QUERY_SRC: &str = r"
    (method_declaration name: (field_identifier) @method.name) @method.definition
    (function_declaration name: (identifier) @fn.name) @fn.definition
    (type_declaration (type_spec name: (type_identifier) @struct.name type: (struct_type)) @struct.definition)
    (type_declaration (type_spec name: (type_identifier) @iface.name type: (interface_type)) @iface.definition)
    (const_spec name: (identifier) @const.name) @const.definition
    (var_spec name: (identifier) @var.name) @var.definition
    (import_declaration) @module.import_statement
";

const PROFILE: SyntaxProfile = SyntaxProfile {
    class_like_node_types: &["type_spec"],
    function_like_node_types: &["function_declaration", "method_declaration"],
    field_like_node_types: &["const_spec", "var_spec"],
    decorator_node_types: &[],
    identifier_field_name: "name",
    body_field_name: "body",
    parameters_field_name: "parameters",
    return_type_field_name: "result",
    type_parameters_field_name: "type_parameters",
    capture_configuration: &[
        ("method.definition", SkeletonKind::FunctionLike),
        ("fn.definition", SkeletonKind::FunctionLike),
        ("struct.definition", SkeletonKind::ClassLike),
        ("iface.definition", SkeletonKind::ClassLike),
        ("const.definition", SkeletonKind::FieldLike),
        ("var.definition", SkeletonKind::FieldLike),
    ],
    async_keyword_node_type: "",
    modifier_node_types: &[],
};

pub struct GoAdapter {
    language: Language,
    query: Query,
}

impl Default for GoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GoAdapter {
    #[must_use]
    pub fn new() -> Self {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let query = Query::new(&language, QUERY_SRC).expect("Go definition query must compile");
        Self { language, query }
    }
}

/// Re-query a `method_declaration`'s `receiver` field for the bare type name,
/// stripping a leading pointer `*` (§9 open question #3).
fn receiver_type_name(method_node: Node<'_>, source: &[u8]) -> Option<String> {
    let receiver_list = method_node.child_by_field_name("receiver")?;
    let param = receiver_list.named_child(0)?;
    let ty = param.child_by_field_name("type")?;
    let target = if ty.kind() == "pointer_type" { ty.named_child(0)? } else { ty };
    target.utf8_text(source).ok().map(|s| s.trim().to_string())
}

impl LanguageAdapter for GoAdapter {
    fn language_id(&self) -> &'static str {
        "go"
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

    fn create_code_unit(&self, file: &str, ctx: &DefinitionCtx<'_>) -> Option<CodeUnit> {
        if ctx.capture_name == "method.definition" {
            if let Some(receiver) = receiver_type_name(ctx.node, ctx.source) {
                let short = CodeUnit::member_short_name(&receiver, ctx.simple_name);
                return Some(CodeUnit::new(CodeUnitKind::Function, file, ctx.package_name, short));
            }
        }
        let kind = self.profile().skeleton_kind_for_capture(ctx.capture_name);
        match kind {
            SkeletonKind::ClassLike => Some(CodeUnit::new(
                CodeUnitKind::Class,
                file,
                ctx.package_name,
                CodeUnit::class_short_name(ctx.class_chain, ctx.simple_name),
            )),
            SkeletonKind::FunctionLike => Some(CodeUnit::new(
                CodeUnitKind::Function,
                file,
                ctx.package_name,
                CodeUnit::member_short_name(ctx.class_chain, ctx.simple_name),
            )),
            SkeletonKind::FieldLike | SkeletonKind::AliasLike => Some(CodeUnit::new(
                CodeUnitKind::Field,
                file,
                ctx.package_name,
                CodeUnit::member_short_name(ctx.class_chain, ctx.simple_name),
            )),
            SkeletonKind::ModuleStatement | SkeletonKind::Unsupported => None,
        }
    }

    fn visibility_prefix(&self, _node: Node<'_>, _source: &[u8]) -> String {
        String::new()
    }

    fn render_class_header(&self, node: Node<'_>, source: &[u8], prefix: &str) -> String {
        let header_end = node
            .child_by_field_name("type")
            .and_then(|t| t.child_by_field_name("body"))
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());
        let raw = std::str::from_utf8(&source[node.start_byte()..header_end]).unwrap_or("").trim();
        format!("{prefix}type {raw} {{")
    }

    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String {
        let header_end = ctx
            .node
            .child_by_field_name(self.profile().body_field_name)
            .map(|b| b.start_byte())
            .unwrap_or_else(|| ctx.node.end_byte());
        let raw = std::str::from_utf8(&ctx.source[ctx.node.start_byte()..header_end]).unwrap_or("").trim();
        format!("{}{} {}", ctx.prefix, raw, self.body_placeholder())
    }

    fn render_field_signature(
        &self,
        node: Node<'_>,
        source: &[u8],
        prefix: &str,
        _in_enum_body: bool,
    ) -> String {
        let keyword = match node.kind() {
            "const_spec" => "const ",
            "var_spec" => "var ",
            _ => "",
        };
        let text = node.utf8_text(source).unwrap_or("").trim();
        format!("{prefix}{keyword}{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn adapter() -> GoAdapter {
        GoAdapter::new()
    }

    #[test]
    fn method_nests_under_pointer_receiver() {
        let source = "package counter\n\ntype Counter struct {\n\tn int\n}\n\nfunc (c *Counter) Add(delta int) {\n\tc.n += delta\n}\n";
        let result = analyze_file(&adapter(), "counter.go", source);
        let method = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Counter.Add")
            .expect("Counter.Add method unit");
        assert!(result.signatures[method][0].contains("func (c *Counter) Add(delta int)"));
    }

    #[test]
    fn free_function_is_top_level() {
        let source = "package main\n\nfunc Sum(a int, b int) int {\n\treturn a + b\n}\n";
        let result = analyze_file(&adapter(), "main.go", source);
        assert!(result.top_level.iter().any(|u| u.short_name.ends_with("Sum")));
    }
}
