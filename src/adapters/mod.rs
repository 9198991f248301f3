//! Concrete per-language adapters (§4.2). TypeScript is the reference
//! implementation the specification worked through in full; the others
//! implement the same contract for their own grammar.

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust_lang;
pub mod typescript;

use crate::adapter::LanguageAdapter;

/// Resolve an adapter by file extension (without the leading dot), the
/// dispatch step the harness performs before calling [`crate::engine::analyze_file`].
#[must_use]
pub fn for_extension(ext: &str) -> Option<Box<dyn LanguageAdapter>> {
    match ext {
        "rs" => Some(Box::new(rust_lang::RustAdapter::new())),
        "ts" | "tsx" | "mts" | "cts" => Some(Box::new(typescript::TypeScriptAdapter::new())),
        "js" | "jsx" | "mjs" | "cjs" => Some(Box::new(javascript::JavaScriptAdapter::new())),
        "go" => Some(Box::new(go::GoAdapter::new())),
        "py" | "pyi" => Some(Box::new(python::PythonAdapter::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_known_extensions() {
        assert!(for_extension("rs").is_some());
        assert!(for_extension("ts").is_some());
        assert!(for_extension("tsx").is_some());
        assert!(for_extension("go").is_some());
        assert!(for_extension("py").is_some());
    }

    #[test]
    fn unknown_extension_is_none() {
        assert!(for_extension("rb").is_none());
    }
}
