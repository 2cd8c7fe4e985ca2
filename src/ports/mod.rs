use crate::domain::ast::Node;
use crate::domain::error::Result;
use crate::domain::record::Record;
use std::io::Write;

pub mod table_exporter;

/// Turns input text into a `Program` node.
pub trait SourceParser: Send + Sync {
    fn parse(&self, src: &str) -> Result<Node>;
}

/// Receives the finished record sequence and displays it somewhere.
pub trait RecordSink: Send + Sync {
    fn export(&self, records: &[Record], out: &mut dyn Write) -> std::io::Result<()>;
}
