use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::core::error::DocOutlineError;

static FILENAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_\-.]+").expect("static regex"));

/// Document metadata read through poppler's `pdfinfo`.
#[derive(Debug, Clone)]
pub struct PdfReader {
    path: PathBuf,
}

impl PdfReader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> Result<usize> {
        let info = run_pdfinfo(&self.path)?;
        parse_page_count(&info).with_context(|| {
            format!(
                "pdfinfo output did not contain a usable 'Pages:' line for {}",
                self.path.display()
            )
        })
    }

    /// Metadata title, or a title derived from the file name when the metadata has none.
    pub fn title(&self) -> String {
        match run_pdfinfo(&self.path) {
            Ok(info) => {
                if let Some(title) = parse_title(&info) {
                    return title;
                }
            }
            Err(err) => debug!(error = %err, "pdfinfo unavailable, using file name as title"),
        }
        title_from_filename(&self.path)
    }
}

fn run_pdfinfo(pdf_path: &Path) -> Result<String> {
    let output = Command::new("pdfinfo")
        .arg(pdf_path)
        .output()
        .with_context(|| format!("failed to invoke pdfinfo on {}", pdf_path.display()))?;

    if !output.status.success() {
        return Err(DocOutlineError::Tool {
            tool: "pdfinfo",
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

pub fn parse_title(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Title:"))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

/// File stem with separator runs turned into spaces and each word capitalized.
pub fn title_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let spaced = FILENAME_SEPARATORS.replace_all(&stem, " ");
    let title = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        stem
    } else {
        title
    }
}
