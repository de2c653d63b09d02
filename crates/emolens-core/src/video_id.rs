//! YouTube video id extraction

use crate::error::{Error, Result};
use regex::Regex;

const URL_PATTERN: &str =
    r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})";
const BARE_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{11}$";

/// Extract the 11-character video id from a YouTube URL or a bare id
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::validation("YouTube URL is required!!"));
    }

    let bare = Regex::new(BARE_ID_PATTERN)
        .map_err(|e| Error::internal(format!("Failed to compile video id regex: {e}")))?;
    if bare.is_match(input) {
        return Ok(input.to_string());
    }

    let url = Regex::new(URL_PATTERN)
        .map_err(|e| Error::internal(format!("Failed to compile video URL regex: {e}")))?;
    url.captures(input)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| Error::validation(format!("Invalid YouTube URL: {input}")))
}
