use crate::core::model::DetectionBox;

/// Greedy class-agnostic non-maximum suppression.
///
/// Candidates are visited in descending confidence (ties keep decode order). A kept box
/// suppresses every remaining box whose IoU with it is strictly above `iou_threshold`.
/// The result is in keep order.
pub fn non_max_suppression(boxes: Vec<DetectionBox>, iou_threshold: f32) -> Vec<DetectionBox> {
    let boxes: Vec<DetectionBox> = boxes
        .into_iter()
        .filter(|det| !det.bbox.is_degenerate())
        .collect();

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .confidence
            .partial_cmp(&boxes[a].confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut suppressed = vec![false; boxes.len()];
    let mut keep = Vec::new();

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);

        for &j in &order[rank + 1..] {
            if !suppressed[j] && boxes[i].bbox.iou(&boxes[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep.into_iter().map(|i| boxes[i].clone()).collect()
}
