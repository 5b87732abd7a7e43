pub mod bridge;
pub mod classes;
pub mod decoder;
pub mod fallback;
pub mod nms;

use anyhow::Result;
use image::RgbImage;
use tracing::{debug, warn};

use crate::core::config::OutlineConfig;
use crate::core::model::{DetectionBox, LayoutLabel, RawDetectionTensor};
use decoder::LayoutDecoder;
use fallback::fallback_layout;
use nms::non_max_suppression;

pub use bridge::ScriptLayoutModel;

/// Runs a layout network on one page image.
pub trait LayoutModel {
    /// Square or rectangular input size `(width, height)` the model expects.
    fn input_size(&self) -> (u32, u32);

    fn infer(&self, image: &RgbImage) -> Result<RawDetectionTensor>;
}

/// Decoder and suppression around an optional layout model.
#[derive(Debug, Clone)]
pub struct LayoutDetector {
    decoder: LayoutDecoder,
    nms_threshold: f32,
}

impl LayoutDetector {
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            decoder: LayoutDecoder::new(config.confidence_threshold),
            nms_threshold: config.nms_threshold,
        }
    }

    pub fn with_labels(mut self, labels: Vec<LayoutLabel>) -> Self {
        self.decoder = self.decoder.with_labels(labels);
        self
    }

    /// Decodes and suppresses one raw tensor for an image of `image_size`.
    pub fn regions_from_tensor(
        &self,
        tensor: &RawDetectionTensor,
        image_size: (u32, u32),
        input_size: (u32, u32),
    ) -> Vec<DetectionBox> {
        let (width, height) = image_size;
        let (input_w, input_h) = input_size;
        let scale_x = width as f32 / input_w.max(1) as f32;
        let scale_y = height as f32 / input_h.max(1) as f32;
        let candidates = self.decoder.decode(tensor, scale_x, scale_y);
        non_max_suppression(candidates, self.nms_threshold)
    }

    /// Detects layout regions, falling back to the synthetic layout when the model is
    /// missing, fails, or finds nothing.
    pub fn detect(&self, image: &RgbImage, model: Option<&dyn LayoutModel>) -> Vec<DetectionBox> {
        let Some(model) = model else {
            debug!("no layout model configured");
            return fallback_layout(image.width(), image.height());
        };

        let tensor = match model.infer(image) {
            Ok(tensor) => tensor,
            Err(err) => {
                warn!(error = %err, "layout inference failed");
                return fallback_layout(image.width(), image.height());
            }
        };

        let regions =
            self.regions_from_tensor(&tensor, image.dimensions(), model.input_size());
        if regions.is_empty() {
            debug!("layout model returned no regions");
            return fallback_layout(image.width(), image.height());
        }
        regions
    }
}
