// Command-line entry point for scriptscope.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scriptscope::api::server::{start_server, ServerSettings};
use scriptscope::application::{analyze_batch, Analysis, FileReport};
use scriptscope::domain::dialect::Dialect;
use scriptscope::infrastructure::concurrency::init_thread_pool;
use scriptscope::infrastructure::config::Config;
use scriptscope::infrastructure::{SourceFile, SourceLoader};
use scriptscope::ports::table_exporter::OutputFormat;
use scriptscope::domain::ast::Node;
use scriptscope::Record;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./scriptscope.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the structural outline of JavaScript sources
    Analyze {
        /// Input source file path (can specify multiple)
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Input source folder(s)
        #[arg(short = 'd', long)]
        folder: Vec<PathBuf>,

        /// Read source from stdin
        #[arg(long)]
        stdin: bool,

        /// Input dialect (js, estree)
        #[arg(long)]
        dialect: Option<String>,

        /// Output format (text, json, html, csv, none)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the parsed syntax tree as ESTree JSON instead of the outline
        #[arg(long)]
        emit_ast: bool,
    },
    /// Serve analysis requests over line-delimited JSON on TCP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            folder,
            stdin,
            dialect,
            format,
            output,
            emit_ast,
        } => {
            let dialect = match dialect {
                Some(d) => Dialect::from_str(&d)
                    .with_context(|| format!("Unknown dialect: {}", d))?,
                None => config.analysis.dialect,
            };
            let format = match format {
                Some(f) => OutputFormat::from_str(&f)
                    .with_context(|| format!("Unknown output format: {}", f))?,
                None => config.output.format,
            };

            let sources = collect_sources(&input, &folder, stdin, dialect)?;
            if sources.is_empty() {
                anyhow::bail!("Please provide at least one --input <file>, --folder <dir> or --stdin");
            }

            if sources.len() > 1 {
                init_thread_pool()?;
            }
            let reports = analyze_batch(&sources, config.analysis.max_nesting_depth);

            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("Cannot create output file {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let failed = if emit_ast {
                write_trees(&reports, &mut out)?
            } else {
                write_reports(&reports, format, &mut out)?
            };
            out.flush()?;

            if let Some(path) = &output {
                info!(path = %path.display(), files = reports.len(), "analysis written");
            }
            if failed > 0 {
                anyhow::bail!("{} of {} inputs failed to analyze", failed, reports.len());
            }
            Ok(())
        }
        Commands::Serve { port } => {
            let settings = ServerSettings {
                max_nesting_depth: config.analysis.max_nesting_depth,
                default_dialect: config.analysis.dialect,
                max_request_bytes: config.server.max_request_bytes,
            };
            start_server(port.unwrap_or(config.server.port), settings)
        }
    }
}

fn collect_sources(
    inputs: &[PathBuf],
    folders: &[PathBuf],
    stdin: bool,
    dialect: Dialect,
) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for input in inputs {
        sources.push(SourceLoader::load_file(input, dialect)?);
    }
    for folder in folders {
        sources.extend(SourceLoader::load_folder(folder, dialect)?);
    }
    if stdin {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        sources.push(SourceFile {
            path: "<stdin>".to_string(),
            dialect,
            content,
        });
    }

    Ok(sources)
}

/// Successful reports by path; failures go to stderr and are counted.
fn split_reports(reports: &[FileReport]) -> (Vec<(&str, &Analysis)>, usize) {
    let mut failed = 0;
    let mut ok = Vec::new();
    for report in reports {
        match &report.outcome {
            Ok(analysis) => ok.push((report.path.as_str(), analysis)),
            Err(e) => {
                eprintln!("{}: {}", report.path, e);
                failed += 1;
            }
        }
    }
    (ok, failed)
}

/// Write each parsed tree as ESTree JSON; returns how many failed.
fn write_trees(reports: &[FileReport], out: &mut dyn Write) -> Result<usize> {
    let (ok, failed) = split_reports(reports);
    if reports.len() == 1 {
        if let Some((_, analysis)) = ok.first() {
            serde_json::to_writer_pretty(&mut *out, &analysis.ast)?;
            writeln!(out)?;
        }
    } else {
        let by_path: BTreeMap<&str, &Node> = ok
            .into_iter()
            .map(|(path, analysis)| (path, &analysis.ast))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &by_path)?;
        writeln!(out)?;
    }
    Ok(failed)
}

/// Export every successful report; returns how many failed.
fn write_reports(reports: &[FileReport], format: OutputFormat, out: &mut dyn Write) -> Result<usize> {
    let (analyses, failed) = split_reports(reports);
    let ok: Vec<(&str, &[Record])> = analyses
        .into_iter()
        .map(|(path, analysis)| (path, analysis.records.as_slice()))
        .collect();

    let single = reports.len() == 1;
    match format {
        // Several files as JSON: one object keyed by path, so the output stays one document.
        OutputFormat::Json if !single => {
            let by_path: BTreeMap<&str, &[Record]> = ok.into_iter().collect();
            serde_json::to_writer_pretty(&mut *out, &by_path)?;
            writeln!(out)?;
        }
        _ => {
            let sink = format.sink();
            for (path, records) in ok {
                if !single && format != OutputFormat::None {
                    writeln!(out, "== {} ==", Path::new(path).display())?;
                }
                sink.export(records, out)?;
            }
        }
    }

    Ok(failed)
}
