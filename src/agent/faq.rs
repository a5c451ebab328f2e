//! Frequently asked questions lookup.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// One question/answer pair as stored in the FAQ file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FaqEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// In-memory FAQ collection.
#[derive(Debug, Clone, Default)]
pub struct FaqStore {
    entries: Vec<FaqEntry>,
}

impl FaqStore {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// Load entries from a JSON array file.
    ///
    /// A missing or malformed file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "FAQ file not readable");
                return Self::default();
            }
        };
        match serde_json::from_str::<Vec<FaqEntry>>(&raw) {
            Ok(entries) => {
                tracing::info!(path = %path.display(), count = entries.len(), "FAQ entries loaded");
                Self::new(entries)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "FAQ file is not valid JSON");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the best answer for `input`.
    ///
    /// A question contained verbatim in the input wins; otherwise the entry
    /// sharing the most words with the input, first one on ties.
    pub fn answer(&self, input: &str) -> Option<String> {
        let query = input.to_lowercase();

        if let Some(entry) = self.entries.iter().find(|entry| {
            let question = entry.question.to_lowercase();
            !question.is_empty() && query.contains(&question)
        }) {
            return Some(format!("FAQ: {}", entry.answer));
        }

        let query_words = words(&query);
        let mut best: Option<(&FaqEntry, usize)> = None;
        for entry in &self.entries {
            let question = entry.question.to_lowercase();
            let score = words(&question).intersection(&query_words).count();
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((entry, score));
            }
        }
        best.map(|(entry, _)| format!("FAQ: {}", entry.answer))
    }
}

fn words(text: &str) -> HashSet<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn store() -> FaqStore {
        FaqStore::new(vec![
            FaqEntry {
                question: "How do I reset my password".into(),
                answer: "Use the 'Forgot password' link.".into(),
            },
            FaqEntry {
                question: "What are your support hours".into(),
                answer: "9am to 5pm, Monday to Friday.".into(),
            },
        ])
    }

    #[test]
    fn test_exact_question_match() {
        assert_eq!(
            store().answer("hi! what are your support hours?").as_deref(),
            Some("FAQ: 9am to 5pm, Monday to Friday.")
        );
    }

    #[test]
    fn test_token_overlap_match() {
        assert_eq!(
            store().answer("password reset please").as_deref(),
            Some("FAQ: Use the 'Forgot password' link.")
        );
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(store().answer("banana"), None);
        assert_eq!(FaqStore::default().answer("support hours"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"question": "refund policy", "answer": "30 days."}}]"#).unwrap();
        let store = FaqStore::load(file.path());
        assert_eq!(store.len(), 1);
        assert_eq!(store.answer("what is the refund policy").as_deref(), Some("FAQ: 30 days."));
    }

    #[test]
    fn test_load_missing_or_malformed_file() {
        assert!(FaqStore::load("/definitely/not/here.json").is_empty());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(FaqStore::load(file.path()).is_empty());
    }
}
