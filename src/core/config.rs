use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::DocOutlineError;
use crate::core::model::LayoutLabel;

/// Thresholds and switches consumed by the outline pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutlineConfig {
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    pub table_overlap_threshold: f32,
    pub table_min_blocks: usize,
    pub alignment_tolerance: f32,
    pub aggressive_correction: bool,
    pub corrections_file: Option<PathBuf>,
    pub dpi: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            nms_threshold: 0.45,
            table_overlap_threshold: 0.3,
            table_min_blocks: 6,
            alignment_tolerance: 10.0,
            aggressive_correction: false,
            corrections_file: None,
            dpi: 100,
        }
    }
}

impl OutlineConfig {
    pub fn from_file(path: &Path) -> Result<Self, DocOutlineError> {
        let data = fs::read_to_string(path).map_err(|e| DocOutlineError::io(path, e))?;
        let config: Self = serde_json::from_str(&data).map_err(|source| DocOutlineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DocOutlineError> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("nms_threshold", self.nms_threshold),
            ("table_overlap_threshold", self.table_overlap_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DocOutlineError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.dpi == 0 {
            return Err(DocOutlineError::Config("dpi must be positive".to_string()));
        }
        Ok(())
    }

    /// Points-to-pixels factor for the configured rendering DPI.
    pub fn pixel_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }

    /// Folds detector overrides into this configuration.
    pub fn apply_detector(&mut self, detector: &DetectorConfig) {
        if let Some(conf) = detector.confidence_threshold {
            self.confidence_threshold = conf;
        }
        if let Some(nms) = detector.nms_threshold {
            self.nms_threshold = nms;
        }
    }
}

/// Optional `config.json` shipped next to a layout model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectorConfig {
    pub confidence_threshold: Option<f32>,
    pub nms_threshold: Option<f32>,
    #[serde(default)]
    pub class_names: Vec<String>,
}

impl DetectorConfig {
    /// Reads a detector config, returning `None` (with a warning) when it cannot be used.
    pub fn load(path: &Path) -> Option<Self> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "detector config not readable");
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "detector config parsing error");
                None
            }
        }
    }

    /// Class labels in model order, or `None` if any name is not a known layout label.
    pub fn labels(&self) -> Option<Vec<LayoutLabel>> {
        if self.class_names.is_empty() {
            return None;
        }
        let parsed: Result<Vec<LayoutLabel>, _> =
            self.class_names.iter().map(|name| name.parse()).collect();
        match parsed {
            Ok(labels) => Some(labels),
            Err(err) => {
                warn!(error = %err, "ignoring detector class names");
                None
            }
        }
    }
}
