// Main library entry point for scriptscope.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::error::AnalysisError;
pub use domain::record::{DisplayValue, Record};

use domain::dialect::Dialect;
use infrastructure::config::DEFAULT_MAX_NESTING_DEPTH;

/// Analyze JavaScript source with default settings.
pub fn analyze(src: &str) -> Result<Vec<Record>, AnalysisError> {
    analyze_dialect(src, Dialect::Js)
}

/// Analyze input of the given dialect with default settings.
pub fn analyze_dialect(src: &str, dialect: Dialect) -> Result<Vec<Record>, AnalysisError> {
    let parser = infrastructure::parser_for(dialect, DEFAULT_MAX_NESTING_DEPTH);
    application::analyze_with(parser.as_ref(), src)
}
