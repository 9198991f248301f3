use thiserror::Error;

/// Errors surfaced to callers of the public API (§6/§7).
///
/// Per-file failures during extraction (IO errors, parse failures, missing
/// name captures, unresolvable parents) are *not* modeled here: they are
/// logged via `tracing::warn!` and the offending file or definition is
/// skipped, per §7 ("All errors are local: no per-file failure interrupts
/// the whole analysis."). This enum exists for the handful of operations
/// that are genuinely fallible from a caller's point of view.
#[derive(Error, Debug)]
pub enum SkeletonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {path}: {detail}")]
    Parse { path: String, detail: String },

    #[error("unsupported language: {ext}")]
    UnsupportedLanguage { ext: String },

    #[error("symbol not found: {fq_name}")]
    SymbolNotFound { fq_name: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SkeletonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_not_found_formats_fq_name() {
        let err = SkeletonError::SymbolNotFound {
            fq_name: "pkg.Foo.bar".into(),
        };
        assert_eq!(err.to_string(), "symbol not found: pkg.Foo.bar");
    }
}
