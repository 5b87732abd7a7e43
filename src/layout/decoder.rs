//! Decoding of raw layout-model output into candidate regions.
//!
//! The detector emits a `[4 + C][D]` tensor: rows 0..4 hold the box center, width and
//! height in model input space, the remaining `C` rows hold one score per class.

use tracing::{debug, warn};

use crate::core::geometry::BBox;
use crate::core::model::{DetectionBox, LayoutLabel, RawDetectionTensor};
use crate::layout::classes::DOCLAYNET_LABELS;

const BOX_ATTRIBUTES: usize = 4;

#[derive(Debug, Clone)]
pub struct LayoutDecoder {
    confidence_threshold: f32,
    labels: Vec<LayoutLabel>,
}

impl Default for LayoutDecoder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl LayoutDecoder {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            labels: DOCLAYNET_LABELS.to_vec(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<LayoutLabel>) -> Self {
        self.labels = labels;
        self
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Label for a class id. Ids outside the table fall back to plain text.
    pub fn label_for(&self, class_id: usize) -> LayoutLabel {
        self.labels
            .get(class_id)
            .copied()
            .unwrap_or(LayoutLabel::Text)
    }

    /// Decodes every detection whose best class score reaches the threshold.
    ///
    /// Coordinates are mapped back to source pixels with `scale_x`/`scale_y`. Boxes with
    /// no positive area are dropped here so suppression only sees real regions.
    pub fn decode(
        &self,
        tensor: &RawDetectionTensor,
        scale_x: f32,
        scale_y: f32,
    ) -> Vec<DetectionBox> {
        let num_attributes = tensor.num_attributes();
        if num_attributes <= BOX_ATTRIBUTES {
            warn!(num_attributes, "detection tensor carries no class scores");
            return Vec::new();
        }
        let num_classes = num_attributes - BOX_ATTRIBUTES;
        let mut boxes = Vec::new();

        for det in 0..tensor.num_detections() {
            let Some((class_id, score)) = best_class(tensor, det, num_classes) else {
                continue;
            };
            if score < self.confidence_threshold {
                continue;
            }

            let bbox = BBox::from_center(
                tensor.get(0, det),
                tensor.get(1, det),
                tensor.get(2, det),
                tensor.get(3, det),
            )
            .scale(scale_x, scale_y);
            if bbox.is_degenerate() {
                debug!(det, "dropping degenerate detection");
                continue;
            }

            boxes.push(DetectionBox::new(
                bbox,
                score,
                class_id,
                self.label_for(class_id),
            ));
        }

        debug!(
            candidates = tensor.num_detections(),
            kept = boxes.len(),
            threshold = self.confidence_threshold,
            "decoded layout tensor"
        );
        boxes
    }
}

/// Applies the logistic function to raw scores above 1.0. Scores at or below 1.0 are
/// taken as probabilities already and pass through unchanged.
pub fn normalize_score(raw: f32) -> f32 {
    if raw > 1.0 {
        1.0 / (1.0 + (-raw).exp())
    } else {
        raw
    }
}

fn best_class(tensor: &RawDetectionTensor, det: usize, num_classes: usize) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for class_id in 0..num_classes {
        let score = normalize_score(tensor.get(BOX_ATTRIBUTES + class_id, det));
        let current = best.map(|(_, s)| s).unwrap_or(0.0);
        if score > current {
            best = Some((class_id, score));
        }
    }
    best
}
