//! TypeScript language adapter — the reference implementation (§4.2).
//!
//! Everything the other adapters in this module treat as an optional hook
//! is load-bearing here: ambient/namespace context, construct signatures,
//! arrow functions hiding inside a `lexical_declaration`, and the §4.4
//! cleanup pass that runs after reconstruction.

use std::collections::HashMap;

use tree_sitter::{Language, Node, Query};

use crate::adapter::{FunctionRenderCtx, LanguageAdapter};
use crate::model::{CodeUnit, CodeUnitKind, SourceRange};
use crate::profile::{SkeletonKind, SyntaxProfile};

const QUERY_SRC: &str = r#"
    (class_declaration name: (type_identifier) @class.name) @class.definition
    (abstract_class_declaration name: (type_identifier) @class.name) @class.definition
    (interface_declaration name: (type_identifier) @iface.name) @iface.definition
    (enum_declaration name: (identifier) @enumdecl.name) @enumdecl.definition
    (internal_module name: (identifier) @ns.name) @ns.definition
    (internal_module name: (string) @ns.name) @ns.definition
    (module name: (string) @ns.name) @ns.definition

    (function_declaration name: (identifier) @fn.name) @fn.definition
    (generator_function_declaration name: (identifier) @fn.name) @fn.definition
    (function_signature name: (identifier) @fn.name) @fn.definition

    (method_definition name: (property_identifier) @method.name) @method.definition
    (method_signature name: (property_identifier) @method.name) @method.definition
    (abstract_method_signature name: (property_identifier) @method.name) @method.definition
    (construct_signature) @ctorsig.definition

    (public_field_definition name: (property_identifier) @classfield.name) @classfield.definition
    (property_signature name: (property_identifier) @propsig.name) @propsig.definition

    (enum_body (property_identifier) @enummember.name @enummember.definition)
    (enum_body (enum_assignment name: (property_identifier) @enummember.name) @enummember.definition)

    (type_alias_declaration name: (type_identifier) @typealias.name) @typealias.definition

    (lexical_declaration
      (variable_declarator name: (identifier) @lex.name value: (arrow_function))) @lex.definition
    (variable_declarator name: (identifier) @field.name value: (arrow_function)) @field.definition

    (import_statement) @module.import_statement
"#;

const PROFILE: SyntaxProfile = SyntaxProfile {
    class_like_node_types: &[
        "class_declaration",
        "abstract_class_declaration",
        "interface_declaration",
        "enum_declaration",
        "internal_module",
        "module",
    ],
    function_like_node_types: &[
        "function_declaration",
        "generator_function_declaration",
        "function_signature",
        "method_definition",
        "method_signature",
        "abstract_method_signature",
        "construct_signature",
        "arrow_function",
    ],
    field_like_node_types: &["public_field_definition", "property_signature"],
    decorator_node_types: &["decorator"],
    identifier_field_name: "name",
    body_field_name: "body",
    parameters_field_name: "parameters",
    return_type_field_name: "return_type",
    type_parameters_field_name: "type_parameters",
    capture_configuration: &[
        ("class.definition", SkeletonKind::ClassLike),
        ("iface.definition", SkeletonKind::ClassLike),
        ("enumdecl.definition", SkeletonKind::ClassLike),
        ("ns.definition", SkeletonKind::ClassLike),
        ("fn.definition", SkeletonKind::FunctionLike),
        ("method.definition", SkeletonKind::FunctionLike),
        ("ctorsig.definition", SkeletonKind::FunctionLike),
        ("lex.definition", SkeletonKind::FunctionLike),
        ("classfield.definition", SkeletonKind::FieldLike),
        ("propsig.definition", SkeletonKind::FieldLike),
        ("enummember.definition", SkeletonKind::FieldLike),
        ("field.definition", SkeletonKind::FieldLike),
        ("typealias.definition", SkeletonKind::AliasLike),
    ],
    async_keyword_node_type: "async",
    modifier_node_types: &["accessibility_modifier"],
};

pub struct TypeScriptAdapter {
    language: Language,
    query: Query,
}

impl Default for TypeScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeScriptAdapter {
    #[must_use]
    pub fn new() -> Self {
        let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let query = Query::new(&language, QUERY_SRC).expect("TypeScript definition query must compile");
        Self { language, query }
    }
}

fn child_kind_present(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

/// Strip modifier keywords already folded into `visibility_prefix` off the
/// front of a field/property node's raw text, so `prefix` isn't duplicated
/// (§4.1.2: "strip the already-accumulated prefix if it duplicates").
fn strip_leading_modifiers(text: &str) -> &str {
    const MODIFIERS: &[&str] = &["public", "private", "protected", "static", "readonly", "abstract", "declare"];
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start();
        match MODIFIERS.iter().find_map(|m| trimmed.strip_prefix(m)) {
            Some(after) if after.starts_with(char::is_whitespace) => rest = after,
            _ => return trimmed,
        }
    }
}

/// A node is in ambient context iff any ancestor is `ambient_declaration`.
fn is_in_ambient_context(node: Node<'_>) -> bool {
    let mut cur = node.parent();
    while let Some(p) = cur {
        if p.kind() == "ambient_declaration" {
            return true;
        }
        cur = p.parent();
    }
    false
}

/// A node is in namespace context iff an ancestor is `internal_module`, or
/// it sits in a `statement_block` whose parent is `internal_module`.
fn is_in_namespace_context(node: Node<'_>) -> bool {
    let mut cur = node.parent();
    while let Some(p) = cur {
        if p.kind() == "internal_module" {
            return true;
        }
        if p.kind() == "statement_block" {
            if let Some(gp) = p.parent() {
                if gp.kind() == "internal_module" {
                    return true;
                }
            }
        }
        cur = p.parent();
    }
    false
}

/// Find the `variable_declarator` under a `lexical_declaration` whose value
/// is an arrow function, returning the arrow node, its bound name, and
/// whether it is async.
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

impl LanguageAdapter for TypeScriptAdapter {
    fn language_id(&self) -> &'static str {
        "typescript"
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
        match node.kind() {
            "construct_signature" => Some("new".to_string()),
            "module" => node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
                .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string()),
            _ => None,
        }
    }

    fn visibility_prefix(&self, node: Node<'_>, source: &[u8]) -> String {
        let mut parts = Vec::new();
        if let Some(parent) = node.parent() {
            if parent.kind() == "export_statement" {
                parts.push("export".to_string());
                if child_kind_present(parent, "default") {
                    parts.push("default".to_string());
                }
            }
            if parent.kind() == "ambient_declaration" {
                parts.push("declare".to_string());
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "accessibility_modifier" => {
                    if let Ok(t) = child.utf8_text(source) {
                        parts.push(t.trim().to_string());
                    }
                }
                "declare" | "abstract" | "static" | "readonly" | "async" | "const" | "let" | "var" => {
                    parts.push(child.kind().to_string());
                }
                _ => {}
            }
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("{} ", parts.join(" "))
        }
    }

    fn render_class_header(&self, node: Node<'_>, source: &[u8], prefix: &str) -> String {
        let keyword = match node.kind() {
            "interface_declaration" => "interface",
            "enum_declaration" => "enum",
            "internal_module" | "module" => "namespace",
            "abstract_class_declaration" => "abstract class",
            _ => "class",
        };
        let header_end = node
            .child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());
        let raw = std::str::from_utf8(&source[node.start_byte()..header_end])
            .unwrap_or("")
            .trim();
        let search_tokens: &[&str] = match node.kind() {
            "interface_declaration" => &["interface "],
            "enum_declaration" => &["enum "],
            "internal_module" | "module" => &["namespace ", "module "],
            _ => &["class "],
        };
        let mut rest = raw;
        for tok in search_tokens {
            if let Some(pos) = raw.find(tok) {
                rest = raw[pos + tok.len()..].trim();
                break;
            }
        }
        format!("{prefix}{keyword} {rest} {{")
    }

    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String {
        let node = ctx.node;
        let placeholder = self.body_placeholder();
        let ret = ctx.return_type_text.map(|t| format!(": {t}")).unwrap_or_default();
        let generics = ctx.type_params_text.unwrap_or("");

        match node.kind() {
            "arrow_function" => {
                let async_kw = if ctx.is_async { "async " } else { "" };
                format!(
                    "{}{}{} = {}({}){} => {}",
                    ctx.prefix, ctx.simple_name, generics, async_kw, ctx.params_text, ret, placeholder
                )
            }
            "construct_signature" => {
                format!("{}new ({}){}", ctx.prefix, ctx.params_text, ret)
            }
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                let has_body = node.child_by_field_name(self.profile().body_field_name).is_some();
                let is_ctor = ctx.simple_name == "constructor";
                let accessor = if child_kind_present(node, "get") {
                    "get "
                } else if child_kind_present(node, "set") {
                    "set "
                } else {
                    ""
                };
                let name_part = if is_ctor {
                    "constructor".to_string()
                } else {
                    format!("{accessor}{}{generics}", ctx.simple_name)
                };
                let trailer = if has_body { format!(" {placeholder}") } else { String::new() };
                format!("{}{name_part}({}){ret}{trailer}", ctx.prefix, ctx.params_text)
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                let has_body = node.child_by_field_name(self.profile().body_field_name).is_some();
                let show_fn_keyword = match node.kind() {
                    "function_signature" => !is_in_namespace_context(node),
                    _ => true,
                };
                let keyword = if !show_fn_keyword {
                    String::new()
                } else if node.kind() == "generator_function_declaration" {
                    "function* ".to_string()
                } else {
                    "function ".to_string()
                };
                let trailer = if has_body {
                    format!(" {placeholder}")
                } else if is_in_namespace_context(node) {
                    String::new()
                } else if is_in_ambient_context(node) {
                    ";".to_string()
                } else {
                    ";".to_string()
                };
                format!(
                    "{}{keyword}{}{generics}({}){ret}{trailer}",
                    ctx.prefix, ctx.simple_name, ctx.params_text
                )
            }
            _ => format!("{}{}({}){ret}", ctx.prefix, ctx.simple_name, ctx.params_text),
        }
    }

    fn build_function_skeleton(
        &self,
        node: Node<'_>,
        source: &[u8],
        simple_name: &str,
        prefix: &str,
    ) -> String {
        match node.kind() {
            "construct_signature" => {
                let params_text = node
                    .child_by_field_name(self.profile().parameters_field_name)
                    .and_then(|n| n.utf8_text(source).ok())
                    .unwrap_or("()");
                let return_type_text = node
                    .child_by_field_name("type")
                    .and_then(|n| n.utf8_text(source).ok())
                    .map(|t| self.format_return_type(t));
                let ctx = FunctionRenderCtx {
                    node,
                    source,
                    simple_name,
                    prefix,
                    params_text,
                    return_type_text: return_type_text.as_deref(),
                    type_params_text: None,
                    is_async: false,
                };
                self.render_function_declaration(&ctx)
            }
            "lexical_declaration" => match find_arrow_declarator(node, source) {
                Some((arrow_node, name, is_async)) => {
                    let params_text = arrow_node
                        .child_by_field_name("parameters")
                        .and_then(|n| n.utf8_text(source).ok())
                        .unwrap_or("()");
                    let return_type_text = arrow_node
                        .child_by_field_name("return_type")
                        .and_then(|n| n.utf8_text(source).ok())
                        .map(|t| self.format_return_type(t));
                    let type_params_text = arrow_node
                        .child_by_field_name("type_parameters")
                        .and_then(|n| n.utf8_text(source).ok());
                    let ctx = FunctionRenderCtx {
                        node: arrow_node,
                        source,
                        simple_name: &name,
                        prefix,
                        params_text,
                        return_type_text: return_type_text.as_deref(),
                        type_params_text,
                        is_async,
                    };
                    self.render_function_declaration(&ctx)
                }
                None => String::new(),
            },
            _ => {
                let profile = self.profile();
                let params_text = node
                    .child_by_field_name(profile.parameters_field_name)
                    .and_then(|n| n.utf8_text(source).ok())
                    .unwrap_or("()");
                let return_type_text = node
                    .child_by_field_name(profile.return_type_field_name)
                    .and_then(|n| n.utf8_text(source).ok())
                    .map(|t| self.format_return_type(t));
                let type_params_text = node
                    .child_by_field_name(profile.type_parameters_field_name)
                    .and_then(|n| n.utf8_text(source).ok());
                let is_async = child_kind_present(node, "async");
                let ctx = FunctionRenderCtx {
                    node,
                    source,
                    simple_name,
                    prefix,
                    params_text,
                    return_type_text: return_type_text.as_deref(),
                    type_params_text,
                    is_async,
                };
                self.render_function_declaration(&ctx)
            }
        }
    }

    fn render_field_signature(
        &self,
        node: Node<'_>,
        source: &[u8],
        prefix: &str,
        in_enum_body: bool,
    ) -> String {
        let text = node.utf8_text(source).unwrap_or("").trim();
        let text = text.trim_end_matches(';').trim_end_matches(',').trim();
        let text = strip_leading_modifiers(text);
        if in_enum_body {
            format!("{text},")
        } else {
            format!("{prefix}{text}")
        }
    }

    fn is_enum_member(&self, node: Node<'_>) -> bool {
        node.parent().map(|p| p.kind() == "enum_body").unwrap_or(false)
    }

    fn post_process_skeletons(
        &self,
        source: &[u8],
        skeletons: Vec<(CodeUnit, String)>,
        ranges: &HashMap<CodeUnit, Vec<SourceRange>>,
    ) -> Vec<(CodeUnit, String)> {
        // Rule 1: arrow-function deduplication. A module-level arrow is
        // captured both via `lex.definition` (Function-kind) and via the
        // bare `variable_declarator` rule (Field-kind); drop the Field twin.
        let function_basenames: std::collections::HashSet<&str> = skeletons
            .iter()
            .filter(|(u, _)| matches!(u.kind, CodeUnitKind::Function))
            .map(|(u, _)| u.unqualified_name())
            .collect();

        let deduped: Vec<(CodeUnit, String)> = skeletons
            .into_iter()
            .filter(|(u, _)| {
                !(matches!(u.kind, CodeUnitKind::Field)
                    && u.short_name.starts_with(crate::model::MODULE_PREFIX)
                    && function_basenames.contains(u.unqualified_name()))
            })
            .collect();

        // Rule 2: nested-arrow filtering via the 50-byte backward context
        // window. Only candidate lines (those containing an arrow marker)
        // pay this cost.
        const TRIGGER_TOKENS: [&str; 4] = ["function ", ") => ", "): ", ") {"];
        let filtered: Vec<(CodeUnit, String)> = deduped
            .into_iter()
            .filter(|(unit, skeleton)| {
                if !skeleton.contains(" => ") {
                    return true;
                }
                let Some(range) = ranges.get(unit).and_then(|v| v.first()) else {
                    return true;
                };
                let start = range.start_byte.min(source.len());
                let window_start = start.saturating_sub(50);
                let Ok(window) = std::str::from_utf8(&source[window_start..start]) else {
                    return true;
                };
                !TRIGGER_TOKENS.iter().any(|t| window.contains(t))
            })
            .collect();

        filtered
            .into_iter()
            .map(|(unit, skeleton)| (unit, clean_skeleton_text(&skeleton)))
            .collect()
    }
}

/// Rules 3–5 of §4.4, applied line-by-line to one unit's skeleton text.
fn clean_skeleton_text(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    // Rule 3a: drop a trailing `,` on a line immediately preceding `}`.
    let mut pass1: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let mut owned = (*line).to_string();
        if owned.trim_end().ends_with(',') {
            let next_is_closer = lines[i + 1..]
                .iter()
                .find(|l| !l.trim().is_empty())
                .is_some_and(|l| l.trim() == "}");
            if next_is_closer {
                let trimmed_end = owned.trim_end();
                owned = trimmed_end[..trimmed_end.len() - 1].to_string();
            }
        }
        pass1.push(owned);
    }

    // Rule 3b: trailing `;` comes off non-exported arrow-function lines and
    // type-alias lines.
    let pass2: Vec<String> = pass1
        .into_iter()
        .map(|line| {
            let trimmed = line.trim_end();
            if !trimmed.ends_with(';') {
                return line;
            }
            let leading = trimmed.trim_start();
            let is_arrow = trimmed.contains(" => ");
            let is_exported = leading.starts_with("export ");
            let is_type_alias = leading.starts_with("type ") || leading.starts_with("export type ");
            if (is_arrow && !is_exported) || is_type_alias {
                trimmed[..trimmed.len() - 1].to_string()
            } else {
                line
            }
        })
        .collect();

    // Rule 4: line-level dedup, preferring `export` and `{ ... }` variants.
    let mut ordered: Vec<(String, String)> = Vec::new();
    for line in pass2 {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            ordered.push((format!("\0blank{}", ordered.len()), line));
            continue;
        }
        let key = trimmed.strip_prefix("export ").unwrap_or(trimmed).to_string();
        if let Some(slot) = ordered.iter_mut().find(|(k, _)| k == &key) {
            let existing_is_export = slot.1.trim_start().starts_with("export ");
            let new_is_export = trimmed.starts_with("export ");
            let existing_has_placeholder = slot.1.contains("{ ... }");
            let new_has_placeholder = trimmed.contains("{ ... }");
            let prefer_new = (new_is_export && !existing_is_export)
                || (new_is_export == existing_is_export && new_has_placeholder && !existing_has_placeholder);
            if prefer_new {
                slot.1 = line;
            }
        } else {
            ordered.push((key, line));
        }
    }
    let mut final_lines: Vec<String> = ordered.into_iter().map(|(_, l)| l).collect();

    // Rule 5: a default export suppresses every other `export`-prefixed line.
    let has_default_export = final_lines
        .iter()
        .any(|l| l.trim_start().starts_with("export default"));
    if has_default_export {
        final_lines.retain(|l| {
            let t = l.trim_start();
            !t.starts_with("export ") || t.starts_with("export default")
        });
    }

    final_lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze_file;

    fn adapter() -> TypeScriptAdapter {
        TypeScriptAdapter::new()
    }

    #[test]
    fn exported_class_with_method() {
        let source = "export class Greeter {\n  greet(name: string): string {\n    return `hi ${name}`;\n  }\n}\n";
        let result = analyze_file(&adapter(), "greeter.ts", source);
        let class_unit = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Greeter")
            .expect("Greeter class unit");
        assert_eq!(result.signatures[class_unit][0], "export class Greeter {");
        let method_unit = &result.children[class_unit][0];
        assert!(result.signatures[method_unit][0].contains("greet(name: string): string { ... }"));
    }

    #[test]
    fn arrow_function_at_module_level_exported() {
        let source = "export const add = (a: number, b: number): number => a + b;\n";
        let result = analyze_file(&adapter(), "math.ts", source);
        let fn_unit = result
            .top_level
            .iter()
            .find(|u| matches!(u.kind, CodeUnitKind::Function))
            .expect("arrow function unit");
        assert!(result.signatures[fn_unit][0].contains("add = (a: number, b: number): number => { ... }"));
    }

    #[test]
    fn enum_members_get_comma_and_closer_has_no_trailing_comma() {
        let source = "enum Color {\n  Red = 1,\n  Green,\n  Blue\n}\n";
        let result = analyze_file(&adapter(), "color.ts", source);
        let enum_unit = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Color")
            .expect("Color enum unit");
        let kids = &result.children[enum_unit];
        assert_eq!(kids.len(), 3);
        assert!(result.signatures[&kids[0]][0].ends_with(','));
    }

    #[test]
    fn construct_signature_inside_interface() {
        let source = "interface ArrayConstructor {\n  new (length: number): Array<number>;\n}\n";
        let result = analyze_file(&adapter(), "ctor.ts", source);
        let iface = result.top_level.iter().find(|u| &*u.short_name == "ArrayConstructor").unwrap();
        let kids = &result.children[iface];
        assert_eq!(kids[0].short_name.as_ref(), "ArrayConstructor.new");
        assert!(result.signatures[&kids[0]][0].contains("new (length: number): Array<number>"));
    }

    #[test]
    fn ambient_module_with_function_signature() {
        let source = "declare namespace Utils {\n  function double(x: number): number;\n}\n";
        let result = analyze_file(&adapter(), "ambient.ts", source);
        let ns = result
            .top_level
            .iter()
            .find(|u| &*u.short_name == "Utils")
            .expect("Utils namespace unit");
        let kids = &result.children[ns];
        assert_eq!(kids.len(), 1);
        let sig = &result.signatures[&kids[0]][0];
        assert!(!sig.contains("function "));
        assert!(!sig.ends_with(';'));
    }
}
