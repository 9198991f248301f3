use std::sync::Arc;

use serde::Serialize;

/// Discriminant for a [`CodeUnit`]'s identity.
///
/// Overloads and repeated declarations of the "same" entity collapse onto a
/// single unit of the matching kind; see the signature/range lists on
/// [`CodeUnit`] for how multiplicity is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CodeUnitKind {
    Class,
    Function,
    Field,
    Module,
}

/// Immutable identity of one declaration.
///
/// Two units are equal iff `kind`, `file`, `package_name` and `short_name`
/// all match — this is the collapsing rule that merges function overloads
/// and repeated field declarations onto one unit (§3).
#[derive(Debug, Clone, Serialize)]
pub struct CodeUnit {
    pub kind: CodeUnitKind,
    pub file: Arc<str>,
    pub package_name: Arc<str>,
    pub short_name: Arc<str>,
}

impl PartialEq for CodeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.file == other.file
            && self.package_name == other.package_name
            && self.short_name == other.short_name
    }
}

impl Eq for CodeUnit {}

impl std::hash::Hash for CodeUnit {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.file.hash(state);
        self.package_name.hash(state);
        self.short_name.hash(state);
    }
}

/// Short name prefix applied to top-level fields and aliases so they never
/// collide with a class's own short name chain.
pub const MODULE_PREFIX: &str = "_module_";

impl CodeUnit {
    #[must_use]
    pub fn new(
        kind: CodeUnitKind,
        file: impl Into<Arc<str>>,
        package_name: impl Into<Arc<str>>,
        short_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            kind,
            file: file.into(),
            package_name: package_name.into(),
            short_name: short_name.into(),
        }
    }

    /// Synthesize the module unit for a file's import block.
    #[must_use]
    pub fn module(file: impl Into<Arc<str>>, package_name: impl Into<Arc<str>>) -> Self {
        Self::new(CodeUnitKind::Module, file, package_name, MODULE_PREFIX)
    }

    /// `packageName.isEmpty() ? shortName : packageName + "." + shortName`.
    #[must_use]
    pub fn fq_name(&self) -> String {
        if self.package_name.is_empty() {
            self.short_name.to_string()
        } else {
            format!("{}.{}", self.package_name, self.short_name)
        }
    }

    /// Build a class-like short name: `classChain.empty ? name : classChain + "$" + name`.
    #[must_use]
    pub fn class_short_name(class_chain: &str, simple_name: &str) -> String {
        if class_chain.is_empty() {
            simple_name.to_string()
        } else {
            format!("{class_chain}${simple_name}")
        }
    }

    /// Build a function/field/alias short name: `.`-joined under its class chain,
    /// or `_module_.`-prefixed when top-level.
    #[must_use]
    pub fn member_short_name(class_chain: &str, simple_name: &str) -> String {
        if class_chain.is_empty() {
            format!("{MODULE_PREFIX}.{simple_name}")
        } else {
            format!("{class_chain}.{simple_name}")
        }
    }

    /// Last segment of `short_name`, split on `.` or `$` — the "unqualified name".
    #[must_use]
    pub fn unqualified_name(&self) -> &str {
        let s = &*self.short_name;
        let dot = s.rfind('.').map_or(0, |i| i + 1);
        let dollar = s.rfind('$').map_or(0, |i| i + 1);
        &s[dot.max(dollar)..]
    }

    #[must_use]
    pub fn is_class_like(&self) -> bool {
        matches!(self.kind, CodeUnitKind::Class)
    }
}

/// A half-open byte range plus the 1-based line range it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: u32,
    pub end_line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fq_name_with_package() {
        let u = CodeUnit::new(CodeUnitKind::Class, "a.ts", "pkg.sub", "Foo");
        assert_eq!(u.fq_name(), "pkg.sub.Foo");
    }

    #[test]
    fn fq_name_without_package() {
        let u = CodeUnit::new(CodeUnitKind::Class, "a.ts", "", "Foo");
        assert_eq!(u.fq_name(), "Foo");
    }

    #[test]
    fn class_short_name_nested() {
        assert_eq!(CodeUnit::class_short_name("Outer", "Inner"), "Outer$Inner");
        assert_eq!(CodeUnit::class_short_name("", "Outer"), "Outer");
    }

    #[test]
    fn member_short_name_top_level_gets_module_prefix() {
        assert_eq!(
            CodeUnit::member_short_name("", "add"),
            "_module_.add"
        );
        assert_eq!(
            CodeUnit::member_short_name("Outer", "method"),
            "Outer.method"
        );
    }

    #[test]
    fn unqualified_name_splits_on_dot_or_dollar() {
        let u = CodeUnit::new(CodeUnitKind::Function, "a.ts", "pkg", "Outer$Inner.method");
        assert_eq!(u.unqualified_name(), "method");
        let u2 = CodeUnit::new(CodeUnitKind::Class, "a.ts", "pkg", "Outer$Inner");
        assert_eq!(u2.unqualified_name(), "Inner");
    }

    #[test]
    fn equality_ignores_nothing_but_identity_triple() {
        let a = CodeUnit::new(CodeUnitKind::Function, "a.ts", "pkg", "f");
        let b = CodeUnit::new(CodeUnitKind::Function, "a.ts", "pkg", "f");
        assert_eq!(a, b);
        let c = CodeUnit::new(CodeUnitKind::Function, "a.ts", "pkg", "g");
        assert_ne!(a, c);
    }
}
