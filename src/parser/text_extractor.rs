use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Command;

use crate::core::error::DocOutlineError;
use crate::core::geometry::BBox;
use crate::core::model::TextBlockGeometry;
use crate::parser::TextBlockSource;

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<block\s+xMin="([-0-9.]+)"\s+yMin="([-0-9.]+)"\s+xMax="([-0-9.]+)"\s+yMax="([-0-9.]+)""#,
    )
    .expect("static regex")
});

/// Text-block geometry from poppler's `pdftotext -bbox-layout`, in PDF points.
#[derive(Debug, Clone, Default)]
pub struct PdftotextBlocks;

impl PdftotextBlocks {
    pub fn new() -> Self {
        Self
    }
}

impl TextBlockSource for PdftotextBlocks {
    fn blocks(&self, pdf_path: &Path, page_number: usize) -> Result<Vec<TextBlockGeometry>> {
        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg(pdf_path)
            .arg("-")
            .output()
            .with_context(|| "failed to invoke pdftotext; is poppler-utils installed?")?;

        if !output.status.success() {
            return Err(DocOutlineError::Tool {
                tool: "pdftotext",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(parse_blocks(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Extracts every `<block>` rectangle from bbox-layout XHTML. Malformed numbers skip the block.
pub fn parse_blocks(xhtml: &str) -> Vec<TextBlockGeometry> {
    BLOCK_RE
        .captures_iter(xhtml)
        .filter_map(|caps| {
            let x0 = caps[1].parse().ok()?;
            let y0 = caps[2].parse().ok()?;
            let x1 = caps[3].parse().ok()?;
            let y1 = caps[4].parse().ok()?;
            Some(BBox::new(x0, y0, x1, y1))
        })
        .collect()
}
