pub mod renderer;
pub mod tesseract;

use anyhow::Result;
use image::RgbImage;
use std::path::Path;

pub use renderer::PdftoppmRasterizer;
pub use tesseract::TesseractOcr;

/// Renders every page of a document, in page order.
pub trait Rasterizer {
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<RgbImage>>;
}

/// Recognizes the text inside one cropped region.
///
/// An error or an empty string both mean the region has no usable text.
pub trait OcrEngine {
    fn recognize(&self, crop: &RgbImage) -> Result<String>;
}
