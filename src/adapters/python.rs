//! Python language adapter.
//!
//! Python has no visibility keywords, no braces and no closing delimiter —
//! indentation alone scopes a body — so this adapter renders headers ending
//! in `:` instead of `{` and suppresses the reconstructor's closer entirely.
//! Module-level and class-body-level assignments are captured as fields;
//! assignments nested inside a function body are deliberately excluded via
//! anchored query patterns (otherwise every local variable would surface as
//! a top-level declaration).

use tree_sitter::{Language, Node, Query};

use crate::adapter::{FunctionRenderCtx, LanguageAdapter};
use crate::model::CodeUnit;
use crate::profile::{SkeletonKind, SyntaxProfile};

const QUERY_SRC: &str = r"
    (class_definition name: (identifier) @class.name) @class.definition
    (function_definition name: (identifier) @fn.name) @fn.definition

    (module (expression_statement (assignment left: (identifier) @field.name) @field.definition))
    (class_definition body: (block (expression_statement (assignment left: (identifier) @field.name) @field.definition)))

    (import_statement) @module.import_statement
    (import_from_statement) @module.import_statement
";

const PROFILE: SyntaxProfile = SyntaxProfile {
    class_like_node_types: &["class_definition"],
    function_like_node_types: &["function_definition"],
    field_like_node_types: &["assignment"],
    decorator_node_types: &["decorator"],
    identifier_field_name: "name",
    body_field_name: "body",
    parameters_field_name: "parameters",
    return_type_field_name: "return_type",
    type_parameters_field_name: "type_parameters",
    capture_configuration: &[
        ("class.definition", SkeletonKind::ClassLike),
        ("fn.definition", SkeletonKind::FunctionLike),
        ("field.definition", SkeletonKind::FieldLike),
    ],
    async_keyword_node_type: "async",
    modifier_node_types: &[],
};

pub struct PythonAdapter {
    language: Language,
    query: Query,
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonAdapter {
    #[must_use]
    pub fn new() -> Self {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let query = Query::new(&language, QUERY_SRC).expect("Python definition query must compile");
        Self { language, query }
    }
}

fn header_up_to_body(node: Node<'_>, source: &[u8]) -> String {
    let header_end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    std::str::from_utf8(&source[node.start_byte()..header_end])
        .unwrap_or("")
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

impl LanguageAdapter for PythonAdapter {
    fn language_id(&self) -> &'static str {
        "python"
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

    fn visibility_prefix(&self, _node: Node<'_>, _source: &[u8]) -> String {
        String::new()
    }

    fn render_class_header(&self, node: Node<'_>, source: &[u8], prefix: &str) -> String {
        format!("{prefix}{}:", header_up_to_body(node, source))
    }

    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String {
        format!("{}{}: ...", ctx.prefix, header_up_to_body(ctx.node, ctx.source))
    }

    fn render_field_signature(
        &self,
        node: Node<'_>,
        source: &[u8],
        prefix: &str,
        _in_enum_body: bool,
    ) -> String {
        format!("{prefix}{}", node.utf8_text(source).unwrap_or("").trim())
    }

    fn closer(&self, _unit: &CodeUnit) -> &'static str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn adapter() -> PythonAdapter {
        PythonAdapter::new()
    }

    #[test]
    fn class_with_method_and_class_attribute() {
        let source = "class Config:\n    default_timeout = 30\n\n    def connect(self, host):\n        return host\n";
        let result = analyze_file(&adapter(), "config.py", source);
        let class_unit = result.top_level.iter().find(|u| &*u.short_name == "Config").unwrap();
        assert!(result.signatures[class_unit][0].starts_with("class Config:"));
        let kids = &result.children[class_unit];
        assert!(kids.iter().any(|k| k.short_name.ends_with(".connect")));
        assert!(kids.iter().any(|k| k.short_name.ends_with(".default_timeout")));
    }

    #[test]
    fn local_assignment_inside_function_is_not_captured() {
        let source = "def total(items):\n    running = 0\n    return running\n";
        let result = analyze_file(&adapter(), "sum.py", source);
        assert!(!result.top_level.iter().any(|u| u.short_name.ends_with("running")));
    }
}
