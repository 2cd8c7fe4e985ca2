use crate::application::Analysis;
use crate::domain::ast::Node;
use crate::domain::dialect::Dialect;
use crate::domain::record::Record;
use serde::{Deserialize, Serialize};

/// Parameters of an `ANALYZE` request.
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub source: String,
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

/// Response body of an `ANALYZE` request: the outline plus the parsed
/// tree in ESTree shape.
#[derive(Debug, Serialize)]
pub struct OutlineDto {
    pub dialect: String,
    pub rows: usize,
    pub records: Vec<Record>,
    pub ast: Node,
}

impl OutlineDto {
    pub fn new(dialect: Dialect, analysis: Analysis) -> Self {
        Self {
            dialect: dialect.name().to_string(),
            rows: analysis.records.len(),
            records: analysis.records,
            ast: analysis.ast,
        }
    }
}
