use anyhow::{Context, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::core::error::DocOutlineError;
use crate::ocr::Rasterizer;
use crate::parser::PdfReader;

/// Renders pages with poppler's `pdftoppm` and decodes the PNGs in memory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    out_dir: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    /// Renders one page (1-based) and returns the path of the written PNG.
    pub fn render_page(&self, pdf_path: &Path, page_number: usize, dpi: u32) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;

        let prefix = self.out_dir.join(format!(
            "page_{}_{:03}",
            std::process::id(),
            page_number
        ));
        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .with_context(|| "failed to invoke pdftoppm; is poppler-utils installed?")?;

        if !output.status.success() {
            return Err(DocOutlineError::Tool {
                tool: "pdftoppm",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        // `-singlefile` writes `<prefix>.png` without a page suffix
        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            anyhow::bail!(
                "expected rendered image not found: {}",
                image_path.display()
            );
        }
        Ok(image_path)
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<RgbImage>> {
        let page_count = PdfReader::new(pdf_path.to_path_buf()).page_count()?;
        let mut pages = Vec::with_capacity(page_count);
        for page_number in 1..=page_count {
            let path = self.render_page(pdf_path, page_number, dpi)?;
            let decoded = image::open(&path).map_err(DocOutlineError::from);
            let _ = fs::remove_file(&path);
            let page = decoded
                .with_context(|| format!("failed to decode page {page_number}"))?
                .to_rgb8();
            debug!(page_number, width = page.width(), height = page.height(), "rendered page");
            pages.push(page);
        }
        Ok(pages)
    }
}
