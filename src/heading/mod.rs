pub mod classifier;
pub mod indicators;

pub use classifier::{
    classify_by_structure, has_heading_structure, is_body_text, label_hint, Classification,
    ClassifierRuleSet, Envelope, HeadingClassifier, Stage,
};
pub use indicators::{indicators_for, Indicator};
