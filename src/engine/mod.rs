pub mod extract;

pub use extract::{analyze_file, strip_bom, FileAnalysisResult};
