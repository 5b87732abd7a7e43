use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::core::config::OutlineConfig;
use crate::core::error::DocOutlineError;
use crate::text::rules::{LITERAL_FIXES, PATTERN_FIXES, WHITESPACE_RE};

/// Ordered literal substitutions plus the shared pattern rewrites.
#[derive(Debug, Clone)]
pub struct CorrectionRules {
    literal: Vec<(String, String)>,
    patterns: &'static [(Regex, &'static str)],
}

impl Default for CorrectionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CorrectionRules {
    pub fn builtin() -> Self {
        Self {
            literal: LITERAL_FIXES
                .iter()
                .map(|(wrong, right)| (wrong.to_string(), right.to_string()))
                .collect(),
            patterns: PATTERN_FIXES.as_slice(),
        }
    }

    pub fn literal(&self) -> &[(String, String)] {
        &self.literal
    }

    /// Adds or replaces a literal rule. Replacing keeps the rule's original position.
    pub fn insert(&mut self, wrong: &str, right: &str) {
        if wrong.is_empty() {
            return;
        }
        match self.literal.iter_mut().find(|(key, _)| key == wrong) {
            Some((_, value)) => *value = right.to_string(),
            None => self.literal.push((wrong.to_string(), right.to_string())),
        }
    }

    /// Reads `wrong=correct` lines and returns how many rules were taken.
    ///
    /// Blank lines, `#` comments and lines without `=` are skipped.
    pub fn load_supplement(&mut self, path: &Path) -> Result<usize, DocOutlineError> {
        let data = fs::read_to_string(path).map_err(|e| DocOutlineError::io(path, e))?;
        let mut added = 0;
        for line in data.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            let Some((wrong, right)) = line.split_once('=') else {
                continue;
            };
            if wrong.is_empty() {
                continue;
            }
            self.insert(wrong, right);
            added += 1;
        }
        Ok(added)
    }
}

/// Cleans OCR output with literal substitutions and, in aggressive mode, regex rewrites.
#[derive(Debug, Clone, Default)]
pub struct TextCorrector {
    rules: CorrectionRules,
    aggressive: bool,
}

impl TextCorrector {
    pub fn new(rules: CorrectionRules, aggressive: bool) -> Self {
        Self { rules, aggressive }
    }

    /// Built-in rules extended from `corrections_file` when one is configured. An
    /// unreadable file is logged and the built-in rules are used alone.
    pub fn from_config(config: &OutlineConfig) -> Self {
        let mut rules = CorrectionRules::builtin();
        if let Some(path) = &config.corrections_file {
            match rules.load_supplement(path) {
                Ok(added) => debug!(path = %path.display(), added, "loaded custom corrections"),
                Err(err) => warn!(error = %err, "could not open corrections file"),
            }
        }
        Self::new(rules, config.aggressive_correction)
    }

    pub fn correct(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }
        let fixed = self.apply_literal(input);
        if self.aggressive {
            self.apply_patterns(&fixed)
        } else {
            fixed
        }
    }

    /// Literal pass followed by whitespace collapsing and trimming.
    pub fn apply_literal(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (wrong, right) in &self.rules.literal {
            // `str::replace` scans left to right and never revisits inserted text.
            if result.contains(wrong.as_str()) {
                result = result.replace(wrong.as_str(), right);
            }
        }
        WHITESPACE_RE.replace_all(&result, " ").trim().to_string()
    }

    pub fn apply_patterns(&self, text: &str) -> String {
        self.rules
            .patterns
            .iter()
            .fold(text.to_string(), |acc, (pattern, replacement)| {
                pattern.replace_all(&acc, *replacement).into_owned()
            })
    }
}

/// Advisory check that a correction still resembles its source: both non-empty and
/// neither more than twice as long as the other.
pub fn is_plausible_correction(original: &str, corrected: &str) -> bool {
    let original_len = original.chars().count();
    let corrected_len = corrected.chars().count();
    if original_len == 0 || corrected_len == 0 {
        return false;
    }
    corrected_len <= original_len * 2 && original_len <= corrected_len * 2
}
