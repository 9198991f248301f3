//! JavaScript adapter — the TypeScript adapter's logic minus type syntax.
//! No type annotations, no interfaces/enums/namespaces/construct signatures;
//! otherwise grounded in the same renderer shapes as
//! [`crate::adapters::typescript::TypeScriptAdapter`].

use tree_sitter::{Language, Node, Query};

use crate::adapter::{FunctionRenderCtx, LanguageAdapter};
use crate::profile::{SkeletonKind, SyntaxProfile};

const QUERY_SRC: &str = r"
    (class_declaration name: (identifier) @class.name) @class.definition

    (function_declaration name: (identifier) @fn.name) @fn.definition
    (generator_function_declaration name: (identifier) @fn.name) @fn.definition

    (method_definition name: (property_identifier) @method.name) @method.definition
    (field_definition name: (property_identifier) @classfield.name) @classfield.definition

    (lexical_declaration
      (variable_declarator name: (identifier) @lex.name value: (arrow_function))) @lex.definition
    (variable_declarator name: (identifier) @field.name value: (arrow_function)) @field.definition

    (import_statement) @module.import_statement
";

const PROFILE: SyntaxProfile = SyntaxProfile {
    class_like_node_types: &["class_declaration"],
    function_like_node_types: &["function_declaration", "generator_function_declaration", "method_definition", "arrow_function"],
    field_like_node_types: &["field_definition"],
    decorator_node_types: &["decorator"],
    identifier_field_name: "name",
    body_field_name: "body",
    parameters_field_name: "parameters",
    return_type_field_name: "return_type",
    type_parameters_field_name: "type_parameters",
    capture_configuration: &[
        ("class.definition", SkeletonKind::ClassLike),
        ("fn.definition", SkeletonKind::FunctionLike),
        ("method.definition", SkeletonKind::FunctionLike),
        ("lex.definition", SkeletonKind::FunctionLike),
        ("classfield.definition", SkeletonKind::FieldLike),
        ("field.definition", SkeletonKind::FieldLike),
    ],
    async_keyword_node_type: "async",
    modifier_node_types: &[],
};

pub struct JavaScriptAdapter {
    language: Language,
    query: Query,
}

impl Default for JavaScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl JavaScriptAdapter {
    #[must_use]
    pub fn new() -> Self {
        let language: Language = tree_sitter_javascript::LANGUAGE.into();
        let query = Query::new(&language, QUERY_SRC).expect("JavaScript definition query must compile");
        Self { language, query }
    }
}

fn child_kind_present(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

fn find_arrow_declarator<'a>(node: Node<'a>, source: &[u8]) -> Option<(Node<'a>, String, bool)> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let value = child.child_by_field_name("value")?;
        if value.kind() != "arrow_function" {
            continue;
        }
        let name = child
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())?
            .trim()
            .to_string();
        let is_async = child_kind_present(value, "async");
        return Some((value, name, is_async));
    }
    None
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language_id(&self) -> &'static str {
        "javascript"
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

    fn visibility_prefix(&self, node: Node<'_>, _source: &[u8]) -> String {
        if let Some(parent) = node.parent() {
            if parent.kind() == "export_statement" {
                let is_default = child_kind_present(parent, "default");
                return if is_default { "export default ".to_string() } else { "export ".to_string() };
            }
        }
        String::new()
    }

    fn render_class_header(&self, node: Node<'_>, source: &[u8], prefix: &str) -> String {
        let header_end = node
            .child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());
        let raw = std::str::from_utf8(&source[node.start_byte()..header_end]).unwrap_or("").trim();
        let rest = raw.find("class ").map(|p| raw[p + "class ".len()..].trim()).unwrap_or(raw);
        format!("{prefix}class {rest} {{")
    }

    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String {
        let node = ctx.node;
        let placeholder = self.body_placeholder();
        match node.kind() {
            "arrow_function" => {
                let async_kw = if ctx.is_async { "async " } else { "" };
                format!("{}{} = {}({}) => {}", ctx.prefix, ctx.simple_name, async_kw, ctx.params_text, placeholder)
            }
            "method_definition" => {
                let is_ctor = ctx.simple_name == "constructor";
                let accessor = if child_kind_present(node, "get") {
                    "get "
                } else if child_kind_present(node, "set") {
                    "set "
                } else {
                    ""
                };
                let name_part = if is_ctor { "constructor".to_string() } else { format!("{accessor}{}", ctx.simple_name) };
                format!("{}{name_part}({}) {}", ctx.prefix, ctx.params_text, placeholder)
            }
            "generator_function_declaration" => {
                format!("{}function* {}({}) {}", ctx.prefix, ctx.simple_name, ctx.params_text, placeholder)
            }
            _ => format!("{}function {}({}) {}", ctx.prefix, ctx.simple_name, ctx.params_text, placeholder),
        }
    }

    fn build_function_skeleton(&self, node: Node<'_>, source: &[u8], simple_name: &str, prefix: &str) -> String {
        if node.kind() == "lexical_declaration" {
            return match find_arrow_declarator(node, source) {
                Some((arrow_node, name, is_async)) => {
                    let params_text = arrow_node
                        .child_by_field_name("parameters")
                        .and_then(|n| n.utf8_text(source).ok())
                        .unwrap_or("()");
                    let ctx = FunctionRenderCtx {
                        node: arrow_node,
                        source,
                        simple_name: &name,
                        prefix,
                        params_text,
                        return_type_text: None,
                        type_params_text: None,
                        is_async,
                    };
                    self.render_function_declaration(&ctx)
                }
                None => String::new(),
            };
        }
        let profile = self.profile();
        let params_text = node
            .child_by_field_name(profile.parameters_field_name)
            .and_then(|n| n.utf8_text(source).ok())
            .unwrap_or("()");
        let is_async = child_kind_present(node, "async");
        let ctx = FunctionRenderCtx {
            node,
            source,
            simple_name,
            prefix,
            params_text,
            return_type_text: None,
            type_params_text: None,
            is_async,
        };
        self.render_function_declaration(&ctx)
    }

    fn render_field_signature(&self, node: Node<'_>, source: &[u8], prefix: &str, _in_enum_body: bool) -> String {
        let text = node.utf8_text(source).unwrap_or("").trim().trim_end_matches(';').trim();
        format!("{prefix}{text};")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn adapter() -> JavaScriptAdapter {
        JavaScriptAdapter::new()
    }

    #[test]
    fn class_with_method_and_field() {
        let source = "export class Counter {\n  count = 0;\n  increment() {\n    this.count += 1;\n  }\n}\n";
        let result = analyze_file(&adapter(), "counter.js", source);
        let class_unit = result.top_level.iter().find(|u| &*u.short_name == "Counter").unwrap();
        assert_eq!(result.signatures[class_unit][0], "export class Counter {");
        let kids = &result.children[class_unit];
        assert!(kids.iter().any(|k| k.short_name.ends_with(".increment")));
    }

    #[test]
    fn arrow_const_at_module_level() {
        let source = "const square = x => ({ value: x * x });\n";
        let result = analyze_file(&adapter(), "math.js", source);
        assert!(result.top_level.iter().any(|u| u.short_name.ends_with("square")));
    }
}
