use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::DocOutlineError;
use crate::core::geometry::BBox;

/// Region class assigned by the layout model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LayoutLabel {
    Caption,
    Footnote,
    Formula,
    List,
    Footer,
    Header,
    Figure,
    ParagraphTitle,
    Table,
    Text,
    Title,
}

impl LayoutLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutLabel::Caption => "caption",
            LayoutLabel::Footnote => "footnote",
            LayoutLabel::Formula => "formula",
            LayoutLabel::List => "list",
            LayoutLabel::Footer => "footer",
            LayoutLabel::Header => "header",
            LayoutLabel::Figure => "figure",
            LayoutLabel::ParagraphTitle => "paragraph_title",
            LayoutLabel::Table => "table",
            LayoutLabel::Text => "text",
            LayoutLabel::Title => "title",
        }
    }

    /// Labels whose regions may carry heading text.
    pub fn is_heading_candidate(&self) -> bool {
        matches!(
            self,
            LayoutLabel::Title | LayoutLabel::ParagraphTitle | LayoutLabel::Text
        )
    }
}

impl fmt::Display for LayoutLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutLabel {
    type Err = DocOutlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "caption" => LayoutLabel::Caption,
            "footnote" => LayoutLabel::Footnote,
            "formula" | "equation" => LayoutLabel::Formula,
            "list" | "list_item" => LayoutLabel::List,
            "footer" | "page_footer" => LayoutLabel::Footer,
            "header" | "page_header" => LayoutLabel::Header,
            "figure" | "picture" => LayoutLabel::Figure,
            "paragraph_title" | "section_header" => LayoutLabel::ParagraphTitle,
            "table" => LayoutLabel::Table,
            "text" => LayoutLabel::Text,
            "title" => LayoutLabel::Title,
            other => return Err(DocOutlineError::UnknownLabel(other.to_string())),
        };
        Ok(label)
    }
}

/// A decoded layout region in source-image pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionBox {
    pub bbox: BBox,
    pub confidence: f32,
    pub class_id: usize,
    pub label: LayoutLabel,
}

impl DetectionBox {
    pub fn new(bbox: BBox, confidence: f32, class_id: usize, label: LayoutLabel) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
            label,
        }
    }
}

/// Flat model output laid out as `[attributes][detections]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetectionTensor {
    data: Vec<f32>,
    num_attributes: usize,
    num_detections: usize,
}

impl RawDetectionTensor {
    pub fn new(
        data: Vec<f32>,
        num_attributes: usize,
        num_detections: usize,
    ) -> Result<Self, DocOutlineError> {
        let expected = num_attributes.checked_mul(num_detections).ok_or_else(|| {
            DocOutlineError::InvalidTensor(format!(
                "shape [{num_attributes}, {num_detections}] overflows"
            ))
        })?;
        if data.len() < expected {
            return Err(DocOutlineError::InvalidTensor(format!(
                "expected {expected} values for shape [{num_attributes}, {num_detections}], got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            num_attributes,
            num_detections,
        })
    }

    /// Builds a tensor from a model shape, ignoring leading batch dimensions of size one.
    pub fn from_shape(data: Vec<f32>, shape: &[usize]) -> Result<Self, DocOutlineError> {
        match shape {
            [.., attributes, detections] => Self::new(data, *attributes, *detections),
            _ => Err(DocOutlineError::InvalidTensor(format!(
                "expected at least two dimensions, got {shape:?}"
            ))),
        }
    }

    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    pub fn num_detections(&self) -> usize {
        self.num_detections
    }

    pub fn get(&self, attribute: usize, detection: usize) -> f32 {
        self.data[attribute * self.num_detections + detection]
    }
}

/// Page-space extent of one text block, as reported by the PDF text extractor.
pub type TextBlockGeometry = BBox;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 4] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadingRecord {
    pub level: HeadingLevel,
    pub text: String,
    pub page_number: usize,
    pub bbox: BBox,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<HeadingRecord>,
    #[serde(default)]
    pub processing_time_seconds: f64,
}

impl DocumentOutline {
    pub fn level_counts(&self) -> LevelCounts {
        let mut counts = LevelCounts::default();
        for heading in &self.outline {
            match heading.level {
                HeadingLevel::H1 => counts.h1 += 1,
                HeadingLevel::H2 => counts.h2 += 1,
                HeadingLevel::H3 => counts.h3 += 1,
                HeadingLevel::H4 => counts.h4 += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
}

impl fmt::Display for LevelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "H1: {}, H2: {}, H3: {}, H4: {}",
            self.h1, self.h2, self.h3, self.h4
        )
    }
}
