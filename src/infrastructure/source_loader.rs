use crate::domain::dialect::Dialect;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// A loaded input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub dialect: Dialect,
    pub content: String,
}

pub struct SourceLoader;

impl SourceLoader {
    /// Load a single file. The dialect comes from its extension, or `fallback`.
    pub fn load_file(path: &Path, fallback: Dialect) -> Result<SourceFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        Ok(SourceFile {
            path: path.display().to_string(),
            dialect: Dialect::from_path(path).unwrap_or(fallback),
            content,
        })
    }

    /// Recursively collect every file of `dialect` under `dir`, sorted by path.
    pub fn load_folder(dir: &Path, dialect: Dialect) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        Self::collect_recursive(dir, dialect, &mut files)?;

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        Ok(files)
    }

    fn collect_recursive(dir: &Path, dialect: Dialect, out: &mut Vec<SourceFile>) -> Result<()> {
        if dir.ends_with("node_modules") || dir.ends_with(".git") {
            return Ok(());
        }
        if !dir.exists() {
            anyhow::bail!("Folder not found: {}", dir.display());
        }

        if dir.is_file() {
            if Dialect::from_path(dir) == Some(dialect) {
                out.push(Self::load_file(dir, dialect)?);
            }
            return Ok(());
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to list folder {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();

            if path.is_dir() {
                Self::collect_recursive(&path, dialect, out)?;
            } else if Dialect::from_path(&path) == Some(dialect) {
                out.push(Self::load_file(&path, dialect)?);
            }
        }
        Ok(())
    }
}
