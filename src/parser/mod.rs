pub mod pdf_reader;
pub mod text_extractor;

pub use pdf_reader::PdfReader;
pub use text_extractor::PdftotextBlocks;

use anyhow::Result;
use std::path::Path;

use crate::core::model::TextBlockGeometry;

/// Supplies the PDF text-block extents of one page (1-based), in PDF points.
pub trait TextBlockSource {
    fn blocks(&self, pdf_path: &Path, page_number: usize) -> Result<Vec<TextBlockGeometry>>;
}
