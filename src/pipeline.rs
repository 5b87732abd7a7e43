use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use image::{imageops, RgbImage};
use tracing::{debug, info, warn};

use crate::core::config::{DetectorConfig, OutlineConfig};
use crate::core::error::DocOutlineError;
use crate::core::geometry::BBox;
use crate::core::model::{DetectionBox, DocumentOutline, HeadingRecord, TextBlockGeometry};
use crate::heading::HeadingClassifier;
use crate::layout::{LayoutDetector, LayoutModel};
use crate::ocr::{OcrEngine, Rasterizer};
use crate::parser::TextBlockSource;
use crate::table::{overlaps_table, TableDetector};
use crate::text::TextCorrector;

/// OCR output this short is treated as noise.
const MIN_TEXT_CHARS: usize = 3;

/// External tools the engine drives for one document.
pub struct Collaborators<'a> {
    pub rasterizer: &'a dyn Rasterizer,
    pub model: Option<&'a dyn LayoutModel>,
    pub ocr: &'a dyn OcrEngine,
    pub blocks: &'a dyn TextBlockSource,
}

/// Layout regions in, heading records out.
#[derive(Debug, Clone)]
pub struct OutlineEngine {
    config: OutlineConfig,
    detector: LayoutDetector,
    tables: TableDetector,
    corrector: TextCorrector,
    classifier: HeadingClassifier,
}

impl OutlineEngine {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            detector: LayoutDetector::new(&config),
            tables: TableDetector::from_config(&config),
            corrector: TextCorrector::from_config(&config),
            classifier: HeadingClassifier::default(),
            config,
        }
    }

    /// Applies a model's `config.json` overrides and class order.
    pub fn with_detector_config(
        mut self,
        detector: &DetectorConfig,
    ) -> Result<Self, DocOutlineError> {
        self.config.apply_detector(detector);
        self.config.validate()?;
        self.detector = LayoutDetector::new(&self.config);
        if let Some(labels) = detector.labels() {
            self.detector = self.detector.with_labels(labels);
        }
        Ok(self)
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Turns one page's detected regions into heading records, in region order.
    pub fn classify_regions(
        &self,
        page_number: usize,
        image: &RgbImage,
        regions: &[DetectionBox],
        tables: &[BBox],
        ocr: &dyn OcrEngine,
    ) -> Vec<HeadingRecord> {
        let mut headings = Vec::new();
        for region in regions {
            if !region.label.is_heading_candidate() {
                continue;
            }
            if overlaps_table(&region.bbox, tables, self.config.table_overlap_threshold) {
                debug!(page_number, bbox = ?region.bbox, "region inside table, skipped");
                continue;
            }
            let Some(crop) = crop_region(image, &region.bbox) else {
                continue;
            };

            let raw = match ocr.recognize(&crop) {
                Ok(text) => text,
                Err(err) => {
                    debug!(page_number, error = %err, "OCR failed for region");
                    continue;
                }
            };
            if raw.chars().count() < MIN_TEXT_CHARS {
                continue;
            }

            let text = self.corrector.correct(&raw);
            if text.is_empty() {
                continue;
            }
            let Some(level) = self
                .classifier
                .classify(&text, Some(region.label), page_number)
            else {
                debug!(page_number, label = %region.label, text = %text, "not a heading");
                continue;
            };

            info!(page_number, %level, text = %text, "heading found");
            headings.push(HeadingRecord {
                level,
                text,
                page_number,
                bbox: region.bbox,
                confidence: region.confidence,
            });
        }
        headings
    }

    pub fn process_page(
        &self,
        page_number: usize,
        image: &RgbImage,
        model: Option<&dyn LayoutModel>,
        blocks: &[TextBlockGeometry],
        ocr: &dyn OcrEngine,
    ) -> Vec<HeadingRecord> {
        let tables: Vec<BBox> = self.tables.detect(blocks).into_iter().collect();
        let regions = self.detector.detect(image, model);
        debug!(page_number, regions = regions.len(), tables = tables.len(), "page layout");
        self.classify_regions(page_number, image, &regions, &tables, ocr)
    }

    /// Runs every page of `pdf_path` and assembles the outline.
    pub fn build_outline(
        &self,
        pdf_path: &Path,
        title: String,
        collaborators: &Collaborators<'_>,
    ) -> Result<DocumentOutline> {
        let started = Instant::now();
        let pages = collaborators
            .rasterizer
            .rasterize(pdf_path, self.config.dpi)
            .with_context(|| format!("failed to rasterize {}", pdf_path.display()))?;
        info!(pages = pages.len(), dpi = self.config.dpi, "rasterized document");

        let mut outline = Vec::new();
        for (idx, image) in pages.iter().enumerate() {
            let page_number = idx + 1;
            let blocks = collaborators
                .blocks
                .blocks(pdf_path, page_number)
                .unwrap_or_else(|err| {
                    warn!(page_number, error = %err, "text blocks unavailable, table check skipped");
                    Vec::new()
                });
            outline.extend(self.process_page(
                page_number,
                image,
                collaborators.model,
                &blocks,
                collaborators.ocr,
            ));
        }

        Ok(DocumentOutline {
            title,
            outline,
            processing_time_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Crops `bbox` after clamping it to the image; `None` when nothing is left.
pub fn crop_region(image: &RgbImage, bbox: &BBox) -> Option<RgbImage> {
    let clamped = bbox.clamp_to(image.width() as f32, image.height() as f32);
    let x0 = clamped.x0 as u32;
    let y0 = clamped.y0 as u32;
    let x1 = clamped.x1 as u32;
    let y1 = clamped.y1 as u32;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}
