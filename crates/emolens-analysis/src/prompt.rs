//! Narrative prompt construction and LLM reply cleanup

use emolens_core::{AnalysisAggregate, Error, Result, TopComment, VideoMetadata};
use regex::{Captures, Regex};

const NOT_AVAILABLE: &str = "N/A";

/// Render the report request for an aggregate
///
/// Pure template substitution; missing metadata renders as `N/A`.
pub fn build_prompt(aggregate: &AnalysisAggregate, metadata: Option<&VideoMetadata>) -> String {
    let title = metadata
        .and_then(|m| m.title.as_deref())
        .unwrap_or(NOT_AVAILABLE);
    let channel = metadata
        .and_then(|m| m.channel_name.as_deref())
        .unwrap_or(NOT_AVAILABLE);
    let total = if aggregate.total_comments == 0 {
        NOT_AVAILABLE.to_string()
    } else {
        aggregate.total_comments.to_string()
    };

    let sentiment = &aggregate.sentiment;
    let emotion = &aggregate.emotion;

    format!(
        "\nYou are an advanced YouTube analytics AI.\n\
         Generate a professional analysis report based on the following data:\n\
         \n\
         Video Title: {title}\n\
         Channel Name: {channel}\n\
         Total Comments: {total}\n\
         \n\
         Sentiment Distribution:\n\
         Positive: {}%\n\
         Neutral:  {}%\n\
         Negative: {}%\n\
         \n\
         Emotion Distribution:\n\
         Joy:      {}%\n\
         Anger:    {}%\n\
         Sadness:  {}%\n\
         Fear:     {}%\n\
         Surprise: {}%\n\
         Disgust:  {}%\n\
         \n\
         Top Positive Comments:\n\
         {}\n\
         \n\
         Top Negative Comments:\n\
         {}\n\
         \n\
         Provide:\n\
         1. Overall audience reaction\n\
         2. Emotional trends\n\
         3. Key concerns\n\
         4. Engagement insight\n\
         5. Final conclusion\n\
         6. Improvement Opportunities for Creator\n",
        sentiment.positive.percentage,
        sentiment.neutral.percentage,
        sentiment.negative.percentage,
        emotion.joy.percentage,
        emotion.anger.percentage,
        emotion.sadness.percentage,
        emotion.fear.percentage,
        emotion.surprise.percentage,
        emotion.disgust.percentage,
        comment_lines(&aggregate.top_positive_comments, "positive"),
        comment_lines(&aggregate.top_negative_comments, "negative"),
    )
}

fn comment_lines(comments: &[TopComment], polarity: &str) -> String {
    if comments.is_empty() {
        return format!("- No {polarity} comments available");
    }

    comments
        .iter()
        .map(|c| {
            format!(
                "- \"{}\" [emotion: {} ({:.3})]",
                c.text, c.emotion.label, c.emotion.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns a markdown-ish LLM reply into plain display text
///
/// Formatting is idempotent: the cleanup pass repeats until the text stops
/// changing, so formatting already formatted text is a no-op.
pub struct ReplyFormatter {
    fenced_code: Regex,
    inline_code: Regex,
    header: Regex,
    horizontal_rule: Regex,
    bullet: Regex,
    numbered: Regex,
    bold_stars: Regex,
    bold_underscores: Regex,
    italic_stars: Regex,
    italic_underscores: Regex,
    trailing_space: Regex,
    blank_lines: Regex,
}

impl ReplyFormatter {
    /// Create a new formatter
    pub fn new() -> Result<Self> {
        Ok(Self {
            fenced_code: compile("fenced code", r"(?s)```.*?```")?,
            inline_code: compile("inline code", r"`([^`]*)`")?,
            header: compile("header", r"(?m)^#{1,6}[ \t]+(.+)$")?,
            horizontal_rule: compile("horizontal rule", r"(?m)^(?:\*{3,}|-{3,}|_{3,})[ \t]*$")?,
            bullet: compile("bullet", r"(?m)^[ \t]*[-*•>][ \t]+")?,
            numbered: compile("numbered list", r"(?m)^[ \t]*(\d+)\.[ \t]+")?,
            bold_stars: compile("bold", r"\*\*([^*\n]+)\*\*")?,
            bold_underscores: compile("bold", r"(?m)(^|\W)__([^_\n]+)__(\W|$)")?,
            italic_stars: compile("italic", r"\*([^*\n]+)\*")?,
            italic_underscores: compile("italic", r"(?m)(^|\W)_([^_\n]+)_(\W|$)")?,
            trailing_space: compile("trailing space", r"(?m)[ \t]+$")?,
            blank_lines: compile("blank lines", r"\n{3,}")?,
        })
    }

    /// Format an LLM reply for plain display
    ///
    /// Terminates: every rewrite except bullet and header normalization
    /// shortens the text, and those two are stable once applied.
    pub fn format(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One cleanup pass
    fn pass(&self, text: &str) -> String {
        let out = text.replace("\r\n", "\n");
        let out = self.fenced_code.replace_all(&out, "");
        let out = self.inline_code.replace_all(&out, "${1}");
        let out = self
            .header
            .replace_all(&out, |caps: &Captures| caps[1].to_uppercase());
        let out = self.horizontal_rule.replace_all(&out, "");
        let out = self.bullet.replace_all(&out, "• ");
        let out = self.numbered.replace_all(&out, "${1}. ");
        let out = self.bold_stars.replace_all(&out, "${1}");
        let out = self.bold_underscores.replace_all(&out, "${1}${2}${3}");
        let out = self.italic_stars.replace_all(&out, "${1}");
        let out = self.italic_underscores.replace_all(&out, "${1}${2}${3}");
        let out = self.trailing_space.replace_all(&out, "");
        let out = self.blank_lines.replace_all(&out, "\n\n");

        out.trim().to_string()
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::internal(format!("Failed to compile {name} regex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use emolens_core::{ClassShare, EmotionLabel, LabeledScore};

    fn formatter() -> ReplyFormatter {
        ReplyFormatter::new().unwrap()
    }

    #[test]
    fn test_prompt_contains_distribution_and_sections() {
        let mut aggregate = AnalysisAggregate::empty();
        aggregate.total_comments = 10;
        aggregate.sentiment.positive = ClassShare { count: 5, percentage: 50.0 };
        aggregate.emotion.anger = ClassShare { count: 1, percentage: 10.0 };
        aggregate.top_positive_comments.push(TopComment {
            text: "Loved the editing".to_string(),
            emotion: LabeledScore::new(EmotionLabel::Joy, 0.9876),
        });

        let mut metadata = VideoMetadata::new("dQw4w9WgXcQ");
        metadata.title = Some("Launch Day".to_string());
        metadata.channel_name = Some("Studio".to_string());

        let prompt = build_prompt(&aggregate, Some(&metadata));

        assert!(prompt.contains("Video Title: Launch Day"));
        assert!(prompt.contains("Channel Name: Studio"));
        assert!(prompt.contains("Total Comments: 10"));
        assert!(prompt.contains("Positive: 50%"));
        assert!(prompt.contains("Anger:    10%"));
        assert!(prompt.contains("- \"Loved the editing\" [emotion: joy (0.988)]"));
        assert!(prompt.contains("- No negative comments available"));
        assert!(prompt.contains("6. Improvement Opportunities for Creator"));
    }

    #[test]
    fn test_prompt_fallbacks_without_metadata() {
        let prompt = build_prompt(&AnalysisAggregate::empty(), None);

        assert!(prompt.contains("Video Title: N/A"));
        assert!(prompt.contains("Channel Name: N/A"));
        assert!(prompt.contains("Total Comments: N/A"));
        assert!(prompt.contains("Negative: 0%"));
        assert!(prompt.contains("- No positive comments available"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let aggregate = AnalysisAggregate::empty();
        assert_eq!(build_prompt(&aggregate, None), build_prompt(&aggregate, None));
    }

    #[test]
    fn test_format_flattens_markdown() {
        let reply = "## Overall Reaction\n\n\
                     The audience is **very** positive and *engaged*.\n\
                     ---\n\
                     - point one\n\
                     * point two   \n\
                     > quoted\n\
                     1.    First\n\
                     Use `inline` code.\n\
                     ```\nlet x = 1;\n```\n\n\n\n\
                     ### key_concerns stay snake_case";

        let formatted = formatter().format(reply);

        assert_eq!(
            formatted,
            "OVERALL REACTION\n\n\
             The audience is very positive and engaged.\n\n\
             • point one\n\
             • point two\n\
             • quoted\n\
             1. First\n\
             Use inline code.\n\n\
             KEY_CONCERNS STAY SNAKE_CASE"
        );
    }

    #[test]
    fn test_format_strips_underscore_emphasis() {
        assert_eq!(formatter().format("a __bold__ and _soft_ word"), "a bold and soft word");
    }

    #[test]
    fn test_format_is_idempotent_on_nested_markers() {
        let f = formatter();
        for input in [
            "# # nested header",
            "******deep******",
            "  -   *  mixed bullet*",
            "``` unterminated",
            "text\n\n\n\n\nmore\t \n",
            "",
        ] {
            let once = f.format(input);
            assert_eq!(f.format(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_format_unwraps_deeply_nested_emphasis() {
        let f = formatter();
        let input = format!("{}a{}", "*".repeat(800), "*".repeat(800));

        let once = f.format(&input);
        assert_eq!(once, "a");
        assert_eq!(f.format(&once), once);
    }

    proptest::proptest! {
        #[test]
        fn prop_format_is_idempotent(input in "[a-zA-Z0-9 #*_`>.\\-\n]{0,64}") {
            let f = formatter();
            let once = f.format(&input);
            proptest::prop_assert_eq!(f.format(&once), once);
        }
    }
}
