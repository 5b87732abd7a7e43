//! Built-in OCR correction tables.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal substitutions applied in order.
///
/// Only whole-token confusions are listed. Bare character pairs such as `rn`, `cl` or
/// `tc` also occur inside correctly spelled words and are left to user dictionaries.
pub const LITERAL_FIXES: &[(&str, &str)] = &[
    // Character confusions at word level
    ("rnatch", "match"),
    ("vvork", "work"),
    ("cornpany", "company"),
    ("rnoney", "money"),
    ("rnanage", "manage"),
    ("rnarket", "market"),
    ("tilie", "title"),
    ("nieet", "meet"),
    ("rnust", "must"),
    ("vvill", "will"),
    ("vvith", "with"),
    ("vvhen", "when"),
    ("vvhere", "where"),
    ("vvhat", "what"),
    ("vvhy", "why"),
    ("rnight", "might"),
    ("rnore", "more"),
    ("rnark", "mark"),
    // Technical terms
    ("Aadile", "Agile"),
    ("aadile", "agile"),
    ("Testina", "Testing"),
    ("testina", "testing"),
    ("Entrv", "Entry"),
    ("entrv", "entry"),
    ("lntroduction", "Introduction"),
    ("Reguirements", "Requirements"),
    ("reguirements", "requirements"),
    ("Develooment", "Development"),
    ("develooment", "development"),
    ("Manaaement", "Management"),
    ("manaaement", "management"),
    ("Orqanization", "Organization"),
    ("orqanization", "organization"),
    ("Backaround", "Background"),
    ("backaround", "background"),
    ("Technoloaical", "Technological"),
    ("technoloaical", "technological"),
    // Common misspellings
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("occured", "occurred"),
    ("definately", "definitely"),
    ("managment", "management"),
    ("enviroment", "environment"),
    ("accomodate", "accommodate"),
    ("begining", "beginning"),
    ("beleive", "believe"),
    ("occassion", "occasion"),
    ("profesional", "professional"),
    ("recomend", "recommend"),
    ("neccessary", "necessary"),
    ("accross", "across"),
    ("untill", "until"),
    ("thier", "their"),
    ("freind", "friend"),
    ("sence", "sense"),
    // Document vocabulary
    ("qgovernance", "governance"),
    ("decision-makina", "decision-making"),
    ("fundina", "funding"),
    ("reallv", "really"),
    ("librarv", "library"),
    ("fullv", "fully"),
    ("aovernment", "government"),
    ("Strateqy", "Strategy"),
    // Dash read in place of a colon
    ("timeline-", "Timeline:"),
    ("summary-", "Summary:"),
    ("background-", "Background:"),
    ("guidance-", "Guidance:"),
];

pub static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Aggressive-mode rewrites, applied in order.
pub static PATTERN_FIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // "1 2" -> "1.2"
        (r"(\d)\s+(\d)", "${1}.${2}"),
        // "1 . 2" -> "1.2"
        (r"(\d)\s*\.\s+(\d)", "${1}.${2}"),
        // ordinal suffixes
        (r"\blst\b", "1st"),
        (r"\b(\d+)lst\b", "${1}st"),
        (r"\b(\d+)ncl\b", "${1}nd"),
        (r"\b(\d+)rcl\b", "${1}rd"),
        // repeated spaces
        (r"[ \t]{2,}", " "),
        // no space before punctuation
        (r"[ \t]+([,.;:!?])", "${1}"),
        // scanner artifacts
        (r"\|{2,}", "|"),
        (r"-{3,}", "-"),
        (r"_{3,}", "_"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("static regex"), replacement))
    .collect()
});
