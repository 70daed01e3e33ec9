//! Pure text-scanning utilities for coterie.
//!
//! Extracts `@mentions` and `#hashtags` from user-generated text. These are
//! plain functions with no I/O; resolving usernames to user IDs and indexing
//! tags are the callers' concern.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

// An @ or # token only starts a mention/hashtag when it is not glued to a
// preceding word character, so "user@example.com" contains no mention.
// The regex crate has no lookbehind; match the boundary explicitly.
#[allow(clippy::unwrap_used)]
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])@(\w+)").unwrap());

#[allow(clippy::unwrap_used)]
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w#])#(\w+)").unwrap());

/// Extract `@username` mentions from text.
///
/// Returns a set of unique usernames without the `@` prefix.
#[must_use]
pub fn extract_mentions(text: &str) -> HashSet<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract `#hashtag` tags from text.
///
/// Returns a set of unique tags without the `#` prefix.
#[must_use]
pub fn extract_hashtags(text: &str) -> HashSet<String> {
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_mention() {
        let mentions = extract_mentions("hello @alice!");
        assert_eq!(mentions.len(), 1);
        assert!(mentions.contains("alice"));
    }

    #[test]
    fn test_extract_multiple_mentions_deduplicated() {
        let mentions = extract_mentions("@alice @bob and @alice again");
        assert_eq!(mentions.len(), 2);
        assert!(mentions.contains("alice"));
        assert!(mentions.contains("bob"));
    }

    #[test]
    fn test_mention_at_start_of_text() {
        let mentions = extract_mentions("@carol check this out");
        assert!(mentions.contains("carol"));
    }

    #[test]
    fn test_doubled_at_sign_still_mentions() {
        let mentions = extract_mentions("hey @@frank");
        assert_eq!(mentions.len(), 1);
        assert!(mentions.contains("frank"));
    }

    #[test]
    fn test_handle_chain_mentions_only_the_first() {
        let mentions = extract_mentions("@a@b");
        assert_eq!(mentions.len(), 1);
        assert!(mentions.contains("a"));
    }

    #[test]
    fn test_email_address_is_not_a_mention() {
        let mentions = extract_mentions("reach me at alice@example.com");
        assert!(!mentions.contains("example"));
    }

    #[test]
    fn test_bare_at_sign_is_not_a_mention() {
        assert!(extract_mentions("just an @ by itself").is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_mentions("").is_empty());
        assert!(extract_hashtags("").is_empty());
    }

    #[test]
    fn test_extract_hashtags() {
        let tags = extract_hashtags("sunset #photography #nofilter #photography");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("photography"));
        assert!(tags.contains("nofilter"));
    }

    #[test]
    fn test_hashtag_at_start_of_text() {
        let tags = extract_hashtags("#monday mood");
        assert!(tags.contains("monday"));
    }

    #[test]
    fn test_anchor_in_word_is_not_a_hashtag() {
        let tags = extract_hashtags("see issue34#comment");
        assert!(!tags.contains("comment"));
    }

    #[test]
    fn test_mentions_and_hashtags_coexist() {
        let text = "great shot @dave! #photo";
        assert!(extract_mentions(text).contains("dave"));
        assert!(extract_hashtags(text).contains("photo"));
    }

    #[test]
    fn test_punctuation_terminates_token() {
        let mentions = extract_mentions("thanks @eve, appreciated");
        assert!(mentions.contains("eve"));
        let tags = extract_hashtags("#wow. nice");
        assert!(tags.contains("wow"));
    }
}
