use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use image::RgbImage;
use pretty_assertions::assert_eq;

use docoutline::core::config::OutlineConfig;
use docoutline::core::geometry::BBox;
use docoutline::core::model::{
    DocumentOutline, HeadingLevel, HeadingRecord, LayoutLabel, RawDetectionTensor,
    TextBlockGeometry,
};
use docoutline::export::{Exporter, JsonExporter};
use docoutline::layout::classes::{class_id_of, DOCLAYNET_CLASS_COUNT};
use docoutline::layout::LayoutModel;
use docoutline::ocr::{OcrEngine, Rasterizer};
use docoutline::parser::TextBlockSource;
use docoutline::pipeline::{Collaborators, OutlineEngine};

const PAGE_SIZE: u32 = 1000;

struct BlankPages(usize);

impl Rasterizer for BlankPages {
    fn rasterize(&self, _pdf_path: &Path, _dpi: u32) -> Result<Vec<RgbImage>> {
        Ok((0..self.0)
            .map(|_| RgbImage::new(PAGE_SIZE, PAGE_SIZE))
            .collect())
    }
}

struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn rasterize(&self, _pdf_path: &Path, _dpi: u32) -> Result<Vec<RgbImage>> {
        anyhow::bail!("pdftoppm exited with status 1")
    }
}

/// Returns one prepared tensor per call, in page order.
struct CannedModel {
    tensors: RefCell<Vec<RawDetectionTensor>>,
}

impl CannedModel {
    fn new(mut tensors: Vec<RawDetectionTensor>) -> Self {
        tensors.reverse();
        Self {
            tensors: RefCell::new(tensors),
        }
    }
}

impl LayoutModel for CannedModel {
    fn input_size(&self) -> (u32, u32) {
        (PAGE_SIZE, PAGE_SIZE)
    }

    fn infer(&self, _image: &RgbImage) -> Result<RawDetectionTensor> {
        self.tensors
            .borrow_mut()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no tensor left"))
    }
}

/// Answers OCR calls from a queue and counts them.
struct QueuedOcr {
    replies: RefCell<Vec<String>>,
    calls: Cell<usize>,
}

impl QueuedOcr {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: RefCell::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            calls: Cell::new(0),
        }
    }
}

impl OcrEngine for QueuedOcr {
    fn recognize(&self, _crop: &RgbImage) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.replies.borrow_mut().pop().unwrap_or_default())
    }
}

/// Text blocks keyed by page number; missing pages have none.
struct PageBlocks(Vec<(usize, Vec<TextBlockGeometry>)>);

impl TextBlockSource for PageBlocks {
    fn blocks(&self, _pdf_path: &Path, page_number: usize) -> Result<Vec<TextBlockGeometry>> {
        Ok(self
            .0
            .iter()
            .find(|(page, _)| *page == page_number)
            .map(|(_, blocks)| blocks.clone())
            .unwrap_or_default())
    }
}

struct NoBlocks;

impl TextBlockSource for NoBlocks {
    fn blocks(&self, _pdf_path: &Path, _page_number: usize) -> Result<Vec<TextBlockGeometry>> {
        anyhow::bail!("pdftotext not installed")
    }
}

/// Builds a DocLayNet-shaped tensor from `(cx, cy, w, h, label, score)` rows.
fn tensor(detections: &[(f32, f32, f32, f32, LayoutLabel, f32)]) -> RawDetectionTensor {
    let attributes = 4 + DOCLAYNET_CLASS_COUNT;
    let count = detections.len();
    let mut data = vec![0.0; attributes * count];
    for (det, (cx, cy, w, h, label, score)) in detections.iter().enumerate() {
        data[det] = *cx;
        data[count + det] = *cy;
        data[2 * count + det] = *w;
        data[3 * count + det] = *h;
        data[(4 + class_id_of(*label)) * count + det] = *score;
    }
    RawDetectionTensor::new(data, attributes, count).unwrap()
}

/// Two aligned columns of four rows spanning `(100, 400)`–`(900, 790)` at 72 DPI.
fn table_blocks() -> Vec<TextBlockGeometry> {
    let mut blocks = Vec::new();
    for row in 0..4 {
        let y = 400.0 + row as f32 * 100.0;
        blocks.push(BBox::new(100.0, y, 450.0, y + 90.0));
        blocks.push(BBox::new(500.0, y, 900.0, y + 90.0));
    }
    blocks
}

fn points_config() -> OutlineConfig {
    OutlineConfig {
        dpi: 72,
        ..OutlineConfig::default()
    }
}

fn temp_output_dir(prefix: &str) -> PathBuf {
    let mut out = std::env::temp_dir();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let pid = std::process::id();
    out.push(format!("{prefix}-{pid}-{now}"));
    out
}

#[test]
fn test_title_region_beside_table_yields_single_h1() -> Result<()> {
    let engine = OutlineEngine::new(OutlineConfig::default());
    let model = CannedModel::new(vec![tensor(&[
        (500.0, 100.0, 800.0, 60.0, LayoutLabel::Title, 0.92),
        (500.0, 600.0, 800.0, 400.0, LayoutLabel::Table, 0.88),
    ])]);
    let ocr = QueuedOcr::new(&["Executive Summary"]);

    let outline = engine.build_outline(
        Path::new("proposal.pdf"),
        "Proposal".to_string(),
        &Collaborators {
            rasterizer: &BlankPages(1),
            model: Some(&model),
            ocr: &ocr,
            blocks: &PageBlocks(Vec::new()),
        },
    )?;

    assert_eq!(ocr.calls.get(), 1);
    assert_eq!(
        outline.outline,
        vec![HeadingRecord {
            level: HeadingLevel::H1,
            text: "Executive Summary".to_string(),
            page_number: 1,
            bbox: BBox::new(100.0, 70.0, 900.0, 130.0),
            confidence: 0.92,
        }]
    );
    Ok(())
}

#[test]
fn test_text_inside_pdf_table_is_excluded() -> Result<()> {
    let engine = OutlineEngine::new(points_config());
    let model = CannedModel::new(vec![
        tensor(&[(500.0, 80.0, 600.0, 40.0, LayoutLabel::Title, 0.9)]),
        tensor(&[
            (500.0, 200.0, 600.0, 40.0, LayoutLabel::Text, 0.8),
            (500.0, 440.0, 800.0, 40.0, LayoutLabel::Text, 0.8),
        ]),
    ]);
    let ocr = QueuedOcr::new(&["Project Background Study", "2.1 Background"]);

    let outline = engine.build_outline(
        Path::new("study.pdf"),
        "Study".to_string(),
        &Collaborators {
            rasterizer: &BlankPages(2),
            model: Some(&model),
            ocr: &ocr,
            blocks: &PageBlocks(vec![(2, table_blocks())]),
        },
    )?;

    // the second page-2 region sits inside the table and never reaches OCR
    assert_eq!(ocr.calls.get(), 2);
    let summary: Vec<(HeadingLevel, &str, usize)> = outline
        .outline
        .iter()
        .map(|h| (h.level, h.text.as_str(), h.page_number))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HeadingLevel::H1, "Project Background Study", 1),
            (HeadingLevel::H2, "2.1 Background", 2),
        ]
    );
    Ok(())
}

#[test]
fn test_fallback_layout_without_model() -> Result<()> {
    let engine = OutlineEngine::new(OutlineConfig::default());
    let ocr = QueuedOcr::new(&["Proiect Charter Overview", "Results", "", "Timeline: 2025"]);

    let outline = engine.build_outline(
        Path::new("charter.pdf"),
        "Charter".to_string(),
        &Collaborators {
            rasterizer: &BlankPages(1),
            model: None,
            ocr: &ocr,
            blocks: &NoBlocks,
        },
    )?;

    assert_eq!(ocr.calls.get(), 4);
    let levels: Vec<HeadingLevel> = outline.outline.iter().map(|h| h.level).collect();
    assert_eq!(
        levels,
        vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H4]
    );
    assert_eq!(outline.outline[0].confidence, 0.95);
    assert_eq!(outline.outline[1].confidence, 0.85);
    Ok(())
}

#[test]
fn test_pages_are_emitted_in_order() -> Result<()> {
    let engine = OutlineEngine::new(OutlineConfig::default());
    let ocr = QueuedOcr::new(&[
        "Statement of Work Overview",
        "Methodology",
        "",
        "",
        "Appendix A Budget",
    ]);

    let outline = engine.build_outline(
        Path::new("sow.pdf"),
        "SOW".to_string(),
        &Collaborators {
            rasterizer: &BlankPages(2),
            model: None,
            ocr: &ocr,
            blocks: &NoBlocks,
        },
    )?;

    let pages: Vec<usize> = outline.outline.iter().map(|h| h.page_number).collect();
    assert_eq!(pages, vec![1, 1, 2]);
    assert!(pages.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(outline.level_counts().h1, 2);
    Ok(())
}

#[test]
fn test_rasterizer_failure_is_reported() {
    let engine = OutlineEngine::new(OutlineConfig::default());
    let ocr = QueuedOcr::new(&[]);
    let result = engine.build_outline(
        Path::new("broken.pdf"),
        "Broken".to_string(),
        &Collaborators {
            rasterizer: &BrokenRasterizer,
            model: None,
            ocr: &ocr,
            blocks: &NoBlocks,
        },
    );
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("pdftoppm exited"));
    assert_eq!(ocr.calls.get(), 0);
}

#[test]
fn test_json_export_writes_compact_outline() -> Result<()> {
    let output = temp_output_dir("docoutline-export");
    let exporter = JsonExporter::for_input(&output, Path::new("/data/grant_plan.pdf"));

    let document = DocumentOutline {
        title: "Grant Plan".to_string(),
        outline: vec![
            HeadingRecord {
                level: HeadingLevel::H1,
                text: "Introduction".to_string(),
                page_number: 1,
                bbox: BBox::new(10.0, 10.0, 300.0, 40.0),
                confidence: 0.95,
            },
            HeadingRecord {
                level: HeadingLevel::H3,
                text: "1. Scope".to_string(),
                page_number: 2,
                bbox: BBox::new(10.0, 80.0, 200.0, 100.0),
                confidence: 0.7,
            },
        ],
        processing_time_seconds: 0.4,
    };
    exporter.export(&document)?;

    let path = output.join("grant_plan.json");
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(
        value,
        serde_json::json!({
            "title": "Grant Plan",
            "outline": [
                {"level": "H1", "text": "Introduction", "page": 1},
                {"level": "H3", "text": "1. Scope", "page": 2}
            ]
        })
    );

    let _ = fs::remove_dir_all(&output);
    Ok(())
}
