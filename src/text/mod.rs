pub mod corrector;
pub mod rules;

pub use corrector::{is_plausible_correction, CorrectionRules, TextCorrector};
