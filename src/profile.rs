//! Declarative per-language configuration for the extraction engine (§4.1.3).
//!
//! A [`SyntaxProfile`] is the only thing a new [`crate::adapter::LanguageAdapter`]
//! needs to supply beyond its query text and rendering hooks: it names the
//! grammar node types and field names the engine must recognize in order to
//! drive parent-chain resolution and signature construction without any
//! language-specific logic living inside the engine itself.

use std::collections::HashMap;

/// Skeleton-kind a query capture resolves to, per the `captureConfiguration`
/// map in the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonKind {
    ClassLike,
    FunctionLike,
    FieldLike,
    AliasLike,
    ModuleStatement,
    Unsupported,
}

/// Per-language declarative record; see the field table in §4.1.3.
#[derive(Debug, Clone)]
pub struct SyntaxProfile {
    pub class_like_node_types: &'static [&'static str],
    pub function_like_node_types: &'static [&'static str],
    pub field_like_node_types: &'static [&'static str],
    pub decorator_node_types: &'static [&'static str],
    pub identifier_field_name: &'static str,
    pub body_field_name: &'static str,
    pub parameters_field_name: &'static str,
    pub return_type_field_name: &'static str,
    pub type_parameters_field_name: &'static str,
    pub capture_configuration: &'static [(&'static str, SkeletonKind)],
    pub async_keyword_node_type: &'static str,
    pub modifier_node_types: &'static [&'static str],
}

impl SyntaxProfile {
    #[must_use]
    pub fn is_class_like(&self, node_type: &str) -> bool {
        self.class_like_node_types.contains(&node_type)
    }

    #[must_use]
    pub fn skeleton_kind_for_capture(&self, capture_name: &str) -> SkeletonKind {
        self.capture_configuration
            .iter()
            .find(|(name, _)| *name == capture_name)
            .map_or(SkeletonKind::Unsupported, |(_, kind)| *kind)
    }

    /// Build the capture-configuration lookup as a `HashMap` for adapters that
    /// want O(1) repeated lookups instead of the linear scan above (the
    /// profile tables are small enough — a handful of entries — that the
    /// linear scan is the engine's own default, but an adapter under heavy
    /// per-file load may prefer this).
    #[must_use]
    pub fn capture_configuration_map(&self) -> HashMap<&'static str, SkeletonKind> {
        self.capture_configuration.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: SyntaxProfile = SyntaxProfile {
        class_like_node_types: &["class_declaration"],
        function_like_node_types: &["function_declaration"],
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
        ],
        async_keyword_node_type: "async",
        modifier_node_types: &["accessibility_modifier"],
    };

    #[test]
    fn is_class_like_checks_membership() {
        assert!(PROFILE.is_class_like("class_declaration"));
        assert!(!PROFILE.is_class_like("function_declaration"));
    }

    #[test]
    fn skeleton_kind_for_capture_falls_back_to_unsupported() {
        assert_eq!(
            PROFILE.skeleton_kind_for_capture("class.definition"),
            SkeletonKind::ClassLike
        );
        assert_eq!(
            PROFILE.skeleton_kind_for_capture("nonexistent"),
            SkeletonKind::Unsupported
        );
    }
}
