use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::core::model::{HeadingLevel, LayoutLabel};
use crate::heading::indicators::{char_len, indicators_for, word_count};

/// Length and word-count bounds a candidate must satisfy to keep a pattern-derived level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_words: usize,
}

impl Envelope {
    pub const fn new(min_chars: usize, max_chars: usize, max_words: usize) -> Self {
        Self {
            min_chars,
            max_chars,
            max_words,
        }
    }

    pub fn accepts(&self, text: &str) -> bool {
        let len = char_len(text);
        len >= self.min_chars && len <= self.max_chars && word_count(text) <= self.max_words
    }
}

/// Which step of the cascade produced a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LabelHint,
    Pattern(&'static str),
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: HeadingLevel,
    pub stage: Stage,
}

#[derive(Debug, Clone)]
pub struct ClassifierRuleSet {
    /// Levels in the order their indicators are consulted.
    pub pattern_order: [HeadingLevel; 4],
    pub h1: Envelope,
    pub h2: Envelope,
    pub h3: Envelope,
    pub h4: Envelope,
    /// Longer first-page text is promoted to H1 by the pattern stage.
    pub first_page_min_chars: usize,
}

impl Default for ClassifierRuleSet {
    fn default() -> Self {
        Self {
            pattern_order: [
                HeadingLevel::H1,
                HeadingLevel::H4,
                HeadingLevel::H3,
                HeadingLevel::H2,
            ],
            h1: Envelope::new(10, 150, 20),
            h2: Envelope::new(5, 120, 15),
            h3: Envelope::new(3, 100, 12),
            h4: Envelope::new(3, 80, 10),
            first_page_min_chars: 20,
        }
    }
}

impl ClassifierRuleSet {
    pub fn envelope(&self, level: HeadingLevel) -> &Envelope {
        match level {
            HeadingLevel::H1 => &self.h1,
            HeadingLevel::H2 => &self.h2,
            HeadingLevel::H3 => &self.h3,
            HeadingLevel::H4 => &self.h4,
        }
    }
}

static OUTLINE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+\.|\d+\.\d+\.?|[IVX]+\.?|[A-Z]\.)\s").expect("static regex")
});
static MAJOR_SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+\.|\d+\s+[A-Z]|[IVX]+\.)\s").expect("static regex"));

const MIN_HEADING_CHARS: usize = 3;

const BODY_OPENERS: &[&str] = &["the ", "this ", "in ", "for ", "with ", "as "];

/// Assigns heading levels to corrected region text.
///
/// The cascade runs in a fixed order: body-text rejection, the layout label hint,
/// level indicators, then a structural fallback reserved for `text` regions. The
/// first stage that yields a level wins.
#[derive(Debug, Clone, Default)]
pub struct HeadingClassifier {
    rules: ClassifierRuleSet,
}

impl HeadingClassifier {
    pub fn new(rules: ClassifierRuleSet) -> Self {
        Self { rules }
    }

    pub fn classify(
        &self,
        text: &str,
        label: Option<LayoutLabel>,
        page_number: usize,
    ) -> Option<HeadingLevel> {
        self.classify_detailed(text, label, page_number)
            .map(|c| c.level)
    }

    pub fn classify_detailed(
        &self,
        text: &str,
        label: Option<LayoutLabel>,
        page_number: usize,
    ) -> Option<Classification> {
        let text = text.trim();
        if char_len(text) < MIN_HEADING_CHARS || is_body_text(text) {
            trace!(text, "rejected as body text");
            return None;
        }

        if let Some(level) = label.and_then(label_hint) {
            if self.rules.envelope(level).accepts(text) {
                return Some(Classification {
                    level,
                    stage: Stage::LabelHint,
                });
            }
        }

        if let Some(found) = self.match_patterns(text, page_number) {
            return Some(found);
        }

        if label == Some(LayoutLabel::Text) && has_heading_structure(text) {
            return classify_by_structure(text, page_number).map(|level| Classification {
                level,
                stage: Stage::Structure,
            });
        }

        None
    }

    fn match_patterns(&self, text: &str, page_number: usize) -> Option<Classification> {
        for level in self.rules.pattern_order {
            let hit = indicators_for(level)
                .iter()
                .find(|indicator| indicator.matches(text))
                .map(|indicator| indicator.name)
                .or_else(|| {
                    (level == HeadingLevel::H1
                        && page_number == 1
                        && char_len(text) > self.rules.first_page_min_chars)
                        .then_some("first_page")
                });
            let Some(name) = hit else {
                continue;
            };
            // Only the first level that fires is proposed.
            if self.rules.envelope(level).accepts(text) {
                return Some(Classification {
                    level,
                    stage: Stage::Pattern(name),
                });
            }
            trace!(text, %level, indicator = name, "indicator matched outside envelope");
            return None;
        }
        None
    }
}

/// Level suggested by the detector's label alone.
pub fn label_hint(label: LayoutLabel) -> Option<HeadingLevel> {
    match label {
        LayoutLabel::Title => Some(HeadingLevel::H1),
        LayoutLabel::Text => Some(HeadingLevel::H2),
        LayoutLabel::List => Some(HeadingLevel::H3),
        _ => None,
    }
}

/// Paragraph-like text: long, sentence-terminated, multi-sentence or opening with a
/// common body-text word.
pub fn is_body_text(text: &str) -> bool {
    let len = char_len(text);
    let words = word_count(text);
    if len > 200 || words > 25 {
        return true;
    }
    if text.ends_with('.') && len > 50 {
        return true;
    }
    let terminators = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    if terminators > 1 {
        return true;
    }
    let lower = text.to_lowercase();
    words > 8 && BODY_OPENERS.iter().any(|opener| lower.starts_with(opener))
}

pub fn has_heading_structure(text: &str) -> bool {
    if OUTLINE_NUMBER_RE.is_match(text) {
        return true;
    }
    let len = char_len(text);
    if text.ends_with(':') && len > 5 && len < 80 {
        return true;
    }
    if len > 3 && len < 50 {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 2 && letters.iter().all(|c| !c.is_lowercase()) {
            return true;
        }
    }
    is_title_case(text)
}

/// Mostly capitalized short phrase, judged over the first ten alphabetic words.
fn is_title_case(text: &str) -> bool {
    let mut total = 0usize;
    let mut capitalized = 0usize;
    for word in text.split_whitespace() {
        let Some(first) = word.chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }
        total += 1;
        if first.is_uppercase() {
            capitalized += 1;
        }
        if total == 10 {
            break;
        }
    }
    (2..=8).contains(&total) && capitalized as f32 / total as f32 >= 0.7
}

/// Level from layout cues when no indicator applied.
pub fn classify_by_structure(text: &str, page_number: usize) -> Option<HeadingLevel> {
    let words = word_count(text);
    if page_number == 1 && char_len(text) > 20 && words >= 3 {
        return Some(HeadingLevel::H1);
    }
    if MAJOR_SECTION_RE.is_match(text) {
        return Some(if words <= 6 {
            HeadingLevel::H1
        } else {
            HeadingLevel::H2
        });
    }
    if text.ends_with(':') {
        return Some(if words <= 4 {
            HeadingLevel::H3
        } else {
            HeadingLevel::H4
        });
    }
    match words {
        0..=3 => Some(HeadingLevel::H4),
        4..=6 => Some(HeadingLevel::H3),
        7..=10 => Some(HeadingLevel::H2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(text: &str, label: Option<LayoutLabel>, page: usize) -> Option<HeadingLevel> {
        HeadingClassifier::default().classify(text, label, page)
    }

    #[test]
    fn title_region_on_first_page_is_h1() {
        assert_eq!(
            classify("Introduction", Some(LayoutLabel::Title), 1),
            Some(HeadingLevel::H1)
        );
    }

    #[test]
    fn numbered_text_region_is_h2() {
        assert_eq!(
            classify("2.1 Background", Some(LayoutLabel::Text), 3),
            Some(HeadingLevel::H2)
        );
    }

    #[test]
    fn long_paragraph_is_rejected() {
        let paragraph = format!(
            "{} The second sentence keeps going. A third one closes it.",
            "This proposal describes the approach we take for the project work and delivery"
                .repeat(2)
        );
        assert!(paragraph.chars().count() > 150);
        assert_eq!(classify(&paragraph, Some(LayoutLabel::Text), 2), None);
        assert_eq!(classify(&paragraph, Some(LayoutLabel::Title), 1), None);
    }

    #[test]
    fn canonical_section_is_h2_without_label() {
        assert_eq!(classify("Results", None, 4), Some(HeadingLevel::H2));
    }

    #[test]
    fn short_title_falls_through_to_patterns() {
        // Seven characters is under the H1 envelope, so the label hint is skipped.
        let found = HeadingClassifier::default()
            .classify_detailed("Results", Some(LayoutLabel::Title), 4)
            .unwrap();
        assert_eq!(found.level, HeadingLevel::H2);
        assert_eq!(found.stage, Stage::Pattern("canonical_section"));
    }

    #[test]
    fn label_hint_applies_inside_envelope() {
        let found = HeadingClassifier::default()
            .classify_detailed("Project Governance", Some(LayoutLabel::Title), 5)
            .unwrap();
        assert_eq!(found.level, HeadingLevel::H1);
        assert_eq!(found.stage, Stage::LabelHint);
        assert_eq!(
            classify("Staffing", Some(LayoutLabel::List), 5),
            Some(HeadingLevel::H3)
        );
    }

    #[test]
    fn h4_indicators_outrank_h2() {
        assert_eq!(classify("Timeline: 2024", None, 3), Some(HeadingLevel::H4));
    }

    #[test]
    fn long_first_page_text_is_h1() {
        assert_eq!(
            classify("Regional Water Quality Program", None, 1),
            Some(HeadingLevel::H1)
        );
        assert_eq!(classify("Regional Water Quality Program", None, 2), None);
    }

    #[test]
    fn structural_fallback_only_for_text_regions() {
        // Too many words for the H2 and H3 envelopes.
        let text = "1. Data collection protocols and quality assurance procedures for all \
                    partner field sites in each participating region";
        let found = HeadingClassifier::default()
            .classify_detailed(text, Some(LayoutLabel::Text), 2)
            .unwrap();
        assert_eq!(found.level, HeadingLevel::H2);
        assert_eq!(found.stage, Stage::Structure);
        assert_eq!(classify(text, Some(LayoutLabel::ParagraphTitle), 2), None);
        assert_eq!(
            classify("Key Project Risks", Some(LayoutLabel::ParagraphTitle), 2),
            None
        );
    }

    #[test]
    fn structure_levels_follow_word_count() {
        assert_eq!(classify_by_structure("Risks", 2), Some(HeadingLevel::H4));
        assert_eq!(
            classify_by_structure("Budget and Staffing Plan", 2),
            Some(HeadingLevel::H3)
        );
        assert_eq!(
            classify_by_structure("Data Sharing and Management Plan Across Partner Sites", 2),
            Some(HeadingLevel::H2)
        );
        assert_eq!(
            classify_by_structure("Partner Roles:", 2),
            Some(HeadingLevel::H3)
        );
        assert_eq!(
            classify_by_structure("2. Approach", 2),
            Some(HeadingLevel::H1)
        );
    }

    #[test]
    fn body_text_rules() {
        assert!(is_body_text("We measured it. Then again."));
        assert!(is_body_text(
            "The team will meet every week to review progress on all tasks"
        ));
        assert!(is_body_text(&"word ".repeat(26)));
        assert!(!is_body_text("Executive Summary"));
        assert!(!is_body_text("Fig. 3"));
    }

    #[test]
    fn heading_structure_detection() {
        assert!(has_heading_structure("IV. Evaluation Plan"));
        assert!(has_heading_structure("Deliverables:"));
        assert!(has_heading_structure("SCOPE OF WORK"));
        assert!(has_heading_structure("Scope of Work Plan"));
        assert!(!has_heading_structure("Scope of Work"));
        assert!(!has_heading_structure("scope of the work we do"));
    }

    #[test]
    fn envelope_bounds_are_inclusive() {
        let envelope = Envelope::new(5, 10, 2);
        assert!(envelope.accepts("abcde"));
        assert!(envelope.accepts("abcde fghi"));
        assert!(!envelope.accepts("abcd"));
        assert!(!envelope.accepts("ab cd ef"));
    }

    #[test]
    fn empty_and_very_short_text_is_not_a_heading() {
        assert_eq!(classify("   ", Some(LayoutLabel::Title), 1), None);
        assert_eq!(classify("IV", Some(LayoutLabel::Text), 2), None);
        assert_eq!(classify(" A: ", Some(LayoutLabel::List), 2), None);
    }

    #[test]
    fn failed_h1_envelope_does_not_fall_through() {
        // The H1 keyword fires but eight characters is under the H1 minimum,
        // so the colon label never gets to propose H3.
        assert_eq!(
            classify("Summary:", Some(LayoutLabel::ParagraphTitle), 2),
            None
        );
        assert_eq!(classify("Appendix:", None, 2), None);
    }

    #[test]
    fn failed_h4_envelope_does_not_fall_through() {
        // A short bullet of eleven words: H4 fires and rejects on word count.
        let text = "- Q1 Q2 Q3 Q4 Q5 Q6 Q7 Q8 Q9 Targets:";
        assert_eq!(text.split_whitespace().count(), 11);
        assert!(text.chars().count() < 50);
        assert_eq!(classify(text, Some(LayoutLabel::ParagraphTitle), 2), None);
        assert_eq!(classify(text, None, 2), None);
    }

    #[test]
    fn custom_rule_set_changes_first_page_cutoff() {
        let classifier = HeadingClassifier::new(ClassifierRuleSet {
            first_page_min_chars: 40,
            ..ClassifierRuleSet::default()
        });
        assert_eq!(
            classifier.classify("Regional Water Quality Program", None, 1),
            None
        );
    }
}
