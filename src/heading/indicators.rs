//! Named lexical and structural predicates, grouped by the heading level they suggest.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::HeadingLevel;

/// A named predicate over corrected region text.
#[derive(Clone, Copy)]
pub struct Indicator {
    pub name: &'static str,
    pub test: fn(&str) -> bool,
}

impl Indicator {
    pub fn matches(&self, text: &str) -> bool {
        (self.test)(text)
    }
}

impl std::fmt::Debug for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Indicator").field(&self.name).finish()
    }
}

static NUMBERED_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(chapter|section|part|phase)\s+[IVX0-9]").expect("static regex")
});
static SUBSECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+").expect("static regex"));
static NUMERIC_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.?\s").expect("static regex"));
static ALPHA_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]\)\s").expect("static regex"));
static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("static regex"));
static WRITTEN_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},?\s+\d{4}",
    )
    .expect("static regex")
});
static TIMELINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btimeline:\s*").expect("static regex"));

const SECTION_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "executive summary",
    "conclusion",
    "appendix",
    "summary",
];

const PHASE_MARKERS: &[&str] = &["phase i", "phase ii", "phase iii"];

const CANONICAL_SECTIONS: &[&str] = &[
    "background",
    "methodology",
    "results",
    "discussion",
    "references",
    "bibliography",
    "acknowledgments",
];

const CANONICAL_PREFIXES: &[&str] = &["timeline:", "evaluation", "funding"];

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn section_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    SECTION_KEYWORDS.iter().any(|kw| lower.starts_with(kw))
        || PHASE_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub fn numbered_part(text: &str) -> bool {
    NUMBERED_PART_RE.is_match(text)
}

pub fn canonical_section(text: &str) -> bool {
    let lower = text.to_lowercase();
    CANONICAL_SECTIONS.contains(&lower.as_str())
        || CANONICAL_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

pub fn subsection_number(text: &str) -> bool {
    SUBSECTION_RE.is_match(text)
}

pub fn list_marker(text: &str) -> bool {
    NUMERIC_MARKER_RE.is_match(text) || ALPHA_MARKER_RE.is_match(text)
}

pub fn colon_label(text: &str) -> bool {
    let len = char_len(text);
    text.ends_with(':') && len > 5 && len < 60
}

pub fn date_like(text: &str) -> bool {
    NUMERIC_DATE_RE.is_match(text) || WRITTEN_DATE_RE.is_match(text) || TIMELINE_RE.is_match(text)
}

pub fn short_bullet(text: &str) -> bool {
    (text.starts_with('-') || text.starts_with('*')) && char_len(text) < 50
}

pub const H1_INDICATORS: &[Indicator] = &[
    Indicator {
        name: "section_keyword",
        test: section_keyword,
    },
    Indicator {
        name: "numbered_part",
        test: numbered_part,
    },
];

pub const H2_INDICATORS: &[Indicator] = &[
    Indicator {
        name: "canonical_section",
        test: canonical_section,
    },
    Indicator {
        name: "subsection_number",
        test: subsection_number,
    },
];

pub const H3_INDICATORS: &[Indicator] = &[
    Indicator {
        name: "list_marker",
        test: list_marker,
    },
    Indicator {
        name: "colon_label",
        test: colon_label,
    },
];

pub const H4_INDICATORS: &[Indicator] = &[
    Indicator {
        name: "date_like",
        test: date_like,
    },
    Indicator {
        name: "short_bullet",
        test: short_bullet,
    },
];

/// Indicator list for a level.
pub fn indicators_for(level: HeadingLevel) -> &'static [Indicator] {
    match level {
        HeadingLevel::H1 => H1_INDICATORS,
        HeadingLevel::H2 => H2_INDICATORS,
        HeadingLevel::H3 => H3_INDICATORS,
        HeadingLevel::H4 => H4_INDICATORS,
    }
}
