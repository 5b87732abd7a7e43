use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::model::{DocumentOutline, HeadingLevel};
use crate::export::Exporter;

#[derive(Debug, Serialize)]
struct OutlineFile<'a> {
    title: &'a str,
    outline: Vec<OutlineEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct OutlineEntry<'a> {
    level: HeadingLevel,
    text: &'a str,
    page: usize,
}

/// Writes `{title, outline: [{level, text, page}]}` to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<out_dir>/<input stem>.json`.
    pub fn for_input(out_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self::new(out_dir.join(format!("{stem}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn render_json(document: &DocumentOutline) -> Result<String> {
    let file = OutlineFile {
        title: &document.title,
        outline: document
            .outline
            .iter()
            .map(|heading| OutlineEntry {
                level: heading.level,
                text: &heading.text,
                page: heading.page_number,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

impl Exporter for JsonExporter {
    fn export(&self, document: &DocumentOutline) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = render_json(document)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
