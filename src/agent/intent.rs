//! Keyword-based intent detection.

use std::sync::LazyLock;

use regex::Regex;

static ARITHMETIC_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\d\.\s\+\-\*/\^%\(\)eE,]+$").expect("arithmetic pattern is valid")
});

const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "dew point",
    "dewpoint",
    "heat index",
    "wind chill",
    "feels like",
];

const MATH_MARKERS: &[&str] = &["+", "-", "*", "/", "sqrt", "sin", "cos", "^"];

const FAQ_KEYWORDS: &[&str] = &[
    "support", "price", "refund", "contact", "hours", "password", "how to",
];

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Help,
    Weather,
    Algebra,
    Math,
    Faq,
    Unknown,
}

/// Classify a message. Checks run in a fixed order and the first hit wins.
pub fn detect_intent(text: &str) -> Intent {
    let t = text.trim().to_lowercase();

    if matches!(t.as_str(), "help" | "h" | "?") {
        return Intent::Help;
    }
    if WEATHER_KEYWORDS.iter().any(|k| t.contains(k)) {
        return Intent::Weather;
    }
    if t.starts_with("solve") {
        return Intent::Algebra;
    }
    if ARITHMETIC_ONLY.is_match(&t) || MATH_MARKERS.iter().any(|m| t.contains(m)) {
        return Intent::Math;
    }
    if FAQ_KEYWORDS.iter().any(|k| t.contains(k)) {
        return Intent::Faq;
    }
    Intent::Unknown
}
