// Infrastructure implementations for scriptscope: parser adapters, config,
// file loading and thread pool setup.

pub mod concurrency;
pub mod config;
pub mod estree_json;
pub mod source_loader;
pub mod tree_sitter_parser;

pub use estree_json::EstreeJsonParser;
pub use source_loader::{SourceFile, SourceLoader};
pub use tree_sitter_parser::TreeSitterJsParser;

use crate::domain::dialect::Dialect;
use crate::ports::SourceParser;

/// The parser adapter for a dialect.
pub fn parser_for(dialect: Dialect, max_nesting_depth: usize) -> Box<dyn SourceParser> {
    match dialect {
        Dialect::Js => Box::new(TreeSitterJsParser::with_max_depth(max_nesting_depth)),
        Dialect::Estree => Box::new(EstreeJsonParser::with_max_depth(max_nesting_depth)),
    }
}
