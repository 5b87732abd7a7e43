use crate::core::model::LayoutLabel;

/// DocLayNet class order emitted by the document-layout detector.
pub const DOCLAYNET_LABELS: [LayoutLabel; 11] = [
    LayoutLabel::Caption,
    LayoutLabel::Footnote,
    LayoutLabel::Formula,
    LayoutLabel::List,
    LayoutLabel::Footer,
    LayoutLabel::Header,
    LayoutLabel::Figure,
    LayoutLabel::ParagraphTitle,
    LayoutLabel::Table,
    LayoutLabel::Text,
    LayoutLabel::Title,
];

pub const DOCLAYNET_CLASS_COUNT: usize = DOCLAYNET_LABELS.len();

/// Class id of a label in the DocLayNet table.
pub fn class_id_of(label: LayoutLabel) -> usize {
    DOCLAYNET_LABELS
        .iter()
        .position(|candidate| *candidate == label)
        .unwrap_or(DOCLAYNET_LABELS.len())
}
