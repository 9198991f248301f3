pub mod unit;

pub use unit::{CodeUnit, CodeUnitKind, SourceRange, MODULE_PREFIX};
