//! Comment text normalization
//!
//! Classifiers are trained on clean natural-language text, so markup, links,
//! and emoji are removed before any text is sent upstream. The steps run in a
//! fixed order; later steps assume the earlier cleanup has happened.

use emolens_core::{Comment, Error, Result};
use regex::Regex;

/// Regex-based comment cleaner
pub struct TextNormalizer {
    html_regex: Regex,
    url_regex: Regex,
    emoji_regex: Regex,
    disallowed_regex: Regex,
    whitespace_regex: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            html_regex: compile("html", r"<[^>]*>")?,
            url_regex: compile("url", r"https?://\S+|www\.\S+")?,
            // Pictographs, misc symbols, misc technical, general punctuation
            emoji_regex: compile(
                "emoji",
                r"[\x{1F300}-\x{1F9FF}\x{2600}-\x{27BF}\x{2300}-\x{23FF}\x{2000}-\x{206F}]",
            )?,
            // Keep Latin letters, digits, Devanagari, whitespace, and basic punctuation
            disallowed_regex: compile(
                "allow-list",
                r#"[^\x{0900}-\x{097F}a-zA-Z0-9\s।,.:;!?'"()\-]"#,
            )?,
            whitespace_regex: compile("whitespace", r"\s+")?,
        })
    }

    /// Clean a single comment
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let cleaned = self.html_regex.replace_all(text, "");
        let cleaned = self.url_regex.replace_all(&cleaned, "");
        let cleaned = self.emoji_regex.replace_all(&cleaned, "");
        let cleaned = self.disallowed_regex.replace_all(&cleaned, "");
        let cleaned = self.whitespace_regex.replace_all(&cleaned, " ");

        cleaned.trim().to_string()
    }

    /// Clean many texts, dropping those that end up empty
    pub fn clean_batch(&self, texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .map(|text| self.normalize(text))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Clean comment texts in place, dropping comments that end up empty
    pub fn clean_comments(&self, comments: Vec<Comment>) -> Vec<Comment> {
        comments
            .into_iter()
            .filter_map(|mut comment| {
                comment.text = self.normalize(&comment.text);
                (!comment.text.is_empty()).then_some(comment)
            })
            .collect()
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::internal(format!("Failed to compile {name} regex: {e}")))
}
