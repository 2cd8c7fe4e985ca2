// Core analysis domain for scriptscope: syntax tree, records, and the
// reduction from one to the other.

pub mod ast;
pub mod dialect;
pub mod error;
pub mod line_tracker;
pub mod record;
pub mod reducer;
pub mod render;
