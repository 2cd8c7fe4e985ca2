use crate::domain::ast::Node;
use crate::domain::error::AnalysisError;
use crate::domain::record::Record;
use crate::domain::reducer;
use crate::infrastructure::{parser_for, SourceFile};
use crate::ports::{RecordSink, SourceParser};
use rayon::prelude::*;
use std::io::Write;
use tracing::{debug, warn};

/// The parsed tree together with its outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub ast: Node,
    pub records: Vec<Record>,
}

/// One analysis request: parse, reduce, hand the records to a sink.
pub struct AnalyzeUsecase<'a> {
    pub parser: &'a dyn SourceParser,
    pub sink: &'a dyn RecordSink,
}

impl<'a> AnalyzeUsecase<'a> {
    /// Analyze `src` and return its records. Nothing is exported.
    pub fn analyze(&self, src: &str) -> Result<Vec<Record>, AnalysisError> {
        analyze_with(self.parser, src)
    }

    /// Analyze `src` and export the records to `out`.
    pub fn run(&self, src: &str, out: &mut dyn Write) -> anyhow::Result<Vec<Record>> {
        let records = self.analyze(src)?;
        self.sink.export(&records, out)?;
        Ok(records)
    }
}

/// Parse and reduce, keeping the tree.
pub fn analyze_tree(parser: &dyn SourceParser, src: &str) -> Result<Analysis, AnalysisError> {
    let ast = parser.parse(src)?;
    let records = reducer::reduce(&ast);
    debug!(records = records.len(), "reduced program");
    Ok(Analysis { ast, records })
}

/// Parse and reduce with the given parser.
pub fn analyze_with(parser: &dyn SourceParser, src: &str) -> Result<Vec<Record>, AnalysisError> {
    analyze_tree(parser, src).map(|analysis| analysis.records)
}

/// Outcome for one file of a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: String,
    pub outcome: Result<Analysis, AnalysisError>,
}

/// Analyze many files in parallel. Each file gets its own parser and
/// reduction state; reports come back in input order.
pub fn analyze_batch(files: &[SourceFile], max_nesting_depth: usize) -> Vec<FileReport> {
    files
        .par_iter()
        .map(|file| {
            let parser = parser_for(file.dialect, max_nesting_depth);
            let outcome = analyze_tree(parser.as_ref(), &file.content);
            if let Err(e) = &outcome {
                warn!(path = %file.path, error = %e, "analysis failed");
            }
            FileReport {
                path: file.path.clone(),
                outcome,
            }
        })
        .collect()
}
