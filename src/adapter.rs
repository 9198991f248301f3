//! The per-language adapter contract (C6), §4.2.
//!
//! The engine (§4.1) drives every file through the same pipeline; everything
//! that varies by language — keyword choice, punctuation, visibility
//! detection, ambient-context rules — lives behind this trait. TypeScript
//! (`adapters::typescript::TypeScriptAdapter`) is the reference
//! implementation; other adapters in `adapters/` implement a useful subset.

use std::collections::HashMap;

use tree_sitter::{Language, Node, Query};

use crate::model::{CodeUnit, CodeUnitKind, SourceRange};
use crate::profile::SyntaxProfile;

/// Context passed to [`LanguageAdapter::render_function_declaration`] once
/// the engine has already extracted the structural pieces common to every
/// function-like node.
pub struct FunctionRenderCtx<'a> {
    pub node: Node<'a>,
    pub source: &'a [u8],
    pub simple_name: &'a str,
    pub prefix: &'a str,
    pub params_text: &'a str,
    pub return_type_text: Option<&'a str>,
    pub type_params_text: Option<&'a str>,
    pub is_async: bool,
}

/// A definition collected by the engine, ready for unit creation and
/// signature rendering.
pub struct DefinitionCtx<'a> {
    pub node: Node<'a>,
    pub source: &'a [u8],
    pub capture_name: &'a str,
    pub simple_name: &'a str,
    pub package_name: &'a str,
    pub class_chain: &'a str,
}

pub trait LanguageAdapter: Send + Sync {
    /// Stable identifier, e.g. `"typescript"`.
    fn language_id(&self) -> &'static str;

    /// The Tree-sitter grammar this adapter parses.
    fn language(&self) -> Language;

    /// The compiled definition query; capture names follow the
    /// `<kind>.definition` / `<kind>.name` convention (§4.1.1 step 3).
    fn query(&self) -> &Query;

    /// The declarative node-type/field-name configuration (§4.1.3).
    fn profile(&self) -> &SyntaxProfile;

    /// Indent string used by the reconstructor (§4.3); two spaces by default.
    fn indent(&self) -> &'static str {
        "  "
    }

    /// Capture names that exist purely for contextual binding within a match
    /// and must never be treated as a `.definition`/`.name` pair on their own.
    fn ignored_captures(&self) -> &'static [&'static str] {
        &[]
    }

    /// Directory-relative package name for a file, default: the file's parent
    /// directory path with `/` replaced by `.`, empty for project-root files.
    fn determine_package_name(&self, relative_path: &str) -> String {
        let dir = std::path::Path::new(relative_path)
            .parent()
            .map(|p| p.to_string_lossy().replace(['/', '\\'], "."))
            .unwrap_or_default();
        if dir == "." {
            String::new()
        } else {
            dir
        }
    }

    /// Override of the default "take the identifier field" simple-name
    /// extraction; return `None` to fall back to the profile's
    /// `identifierFieldName` child (§4.1.1 step 4).
    fn extract_simple_name(&self, _node: Node<'_>, _source: &[u8]) -> Option<String> {
        None
    }

    /// Create the `CodeUnit` for a definition, choosing kind and the
    /// `$`-vs-`.` joining convention (§4.2 `createCodeUnit`). Returning
    /// `None` skips the definition (legal per §4.1.1 step 6c).
    fn create_code_unit(&self, file: &str, ctx: &DefinitionCtx<'_>) -> Option<CodeUnit> {
        use crate::profile::SkeletonKind;
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

    /// Visibility/export prefix, space-terminated when non-empty (§4.1.2 step 3).
    fn visibility_prefix(&self, node: Node<'_>, source: &[u8]) -> String;

    /// Render a class-like header line ending in `{` (§4.1.2 step 4, class-like).
    fn render_class_header(&self, node: Node<'_>, source: &[u8], prefix: &str) -> String;

    /// Render a single function/method/constructor/arrow declaration line
    /// (§4.1.2 step 4, function-like). This is the main per-language hook;
    /// TypeScript overrides `build_function_skeleton` instead for the cases
    /// that need structural rewriting before this point (construct
    /// signatures, arrow functions hiding in a `lexical_declaration`).
    fn render_function_declaration(&self, ctx: &FunctionRenderCtx<'_>) -> String;

    /// Render a field/alias signature line (§4.1.2 step 4, field/alias-like).
    /// `in_enum_body` selects the trailing-comma convention over trailing `;`.
    fn render_field_signature(
        &self,
        node: Node<'_>,
        source: &[u8],
        prefix: &str,
        in_enum_body: bool,
    ) -> String;

    /// Top-level entry point for building a function-like signature line;
    /// default just extracts the structural pieces via the profile and
    /// delegates to `render_function_declaration`. Adapters needing
    /// structural rewrites (TypeScript's construct signatures and
    /// arrow-in-lexical-declaration) override this instead.
    fn build_function_skeleton(
        &self,
        node: Node<'_>,
        source: &[u8],
        simple_name: &str,
        prefix: &str,
    ) -> String {
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
        let is_async = node
            .child(0)
            .map(|c| c.kind() == profile.async_keyword_node_type)
            .unwrap_or(false);
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

    /// Strip a language convention like a leading `:` from a raw type-text
    /// slice (§4.2 `formatReturnType`). Default: identity.
    fn format_return_type(&self, raw: &str) -> String {
        raw.trim_start_matches(':').trim().to_string()
    }

    /// The placeholder that replaces a body (§4.1.2, commonly `"{ ... }"`).
    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    /// The reconstructor's per-unit closer (§4.3 step 3); `"}"` for
    /// class-like units in brace languages, empty otherwise.
    fn closer(&self, unit: &CodeUnit) -> &'static str {
        if unit.is_class_like() {
            "}"
        } else {
            ""
        }
    }

    /// Whether a field-like node sits directly inside an enum body, which
    /// selects the trailing-comma convention over trailing `;` in
    /// `render_field_signature` (§4.2 `formatFieldSignature`). Default: never.
    fn is_enum_member(&self, _node: Node<'_>) -> bool {
        false
    }

    /// Per-file post-processing of the unit → skeleton map, applied right
    /// before returning from the public API (§4.4). `ranges` gives each
    /// unit's source byte span, needed by rules that re-inspect raw source
    /// (the nested-arrow heuristic). Default: identity (most adapters opt
    /// into none of the TS-specific cleanup rules).
    fn post_process_skeletons(
        &self,
        _source: &[u8],
        skeletons: Vec<(CodeUnit, String)>,
        _ranges: &HashMap<CodeUnit, Vec<SourceRange>>,
    ) -> Vec<(CodeUnit, String)> {
        skeletons
    }
}
