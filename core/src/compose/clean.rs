const MENTION_MARKER: char = '@';
const HASHTAG_MARKER: char = '#';
const LINK_MARKER: &str = "http";

/// Prepare raw message text for classification.
///
/// Mentions and links are dropped, hashtags keep their word without the
/// marker, and the remaining words are joined with single spaces. Applying
/// it to already-clean text returns the text unchanged.
pub fn clean_message(message: &str) -> String {
    message
        .split_whitespace()
        .map(|word| word.trim_start_matches(HASHTAG_MARKER))
        .filter(|word| {
            !word.is_empty() && !word.starts_with(MENTION_MARKER) && !word.starts_with(LINK_MARKER)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
