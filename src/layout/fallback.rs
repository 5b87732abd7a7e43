use tracing::info;

use crate::core::geometry::BBox;
use crate::core::model::{DetectionBox, LayoutLabel};
use crate::layout::classes::class_id_of;

/// Synthetic layout used when no detector output is available: a title band across the
/// top of the page and three section-title bands below it.
pub fn fallback_layout(width: u32, height: u32) -> Vec<DetectionBox> {
    let w = width as f32;
    let h = height as f32;

    let mut regions = vec![DetectionBox::new(
        BBox::new(0.1 * w, 0.05 * h, 0.9 * w, 0.15 * h),
        0.95,
        class_id_of(LayoutLabel::Title),
        LayoutLabel::Title,
    )];

    for i in 1..=3 {
        let y_start = 0.15 + i as f32 * 0.2;
        if y_start < 0.8 {
            regions.push(DetectionBox::new(
                BBox::new(0.1 * w, y_start * h, 0.7 * w, (y_start + 0.05) * h),
                0.85,
                class_id_of(LayoutLabel::ParagraphTitle),
                LayoutLabel::ParagraphTitle,
            ));
        }
    }

    info!(regions = regions.len(), "using fallback layout");
    regions
}
