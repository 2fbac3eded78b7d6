/// Token the prompts ask the model to answer with when the user is on task.
pub const FOCUSED_TOKEN: &str = "FOCUSED";

/// Default upper bound (in characters) below which a response counts as a
/// bare focus affirmation rather than a sentence that mentions the token.
pub const DEFAULT_FOCUSED_MAX_LEN: usize = 20;

/// Decision produced by the focus heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusVerdict {
    /// The model affirmed the user is on task; nothing is shown.
    Focused,
    /// Everything else: the full response text is shown to the user.
    Nudge(String),
}

/// Substring heuristic mapping raw model text to a verdict.
///
/// A response is `Focused` when it contains `FOCUSED` (any case) and is
/// shorter than `focused_max_len` characters, i.e. it looks like a bare
/// affirmation such as `"FOCUSED."`. Anything else becomes a nudge
/// carrying the whole response.
///
/// This is a substring check, not a parser. Known limits: a long sentence
/// that happens to embed the token is still a nudge, a benign answer that
/// omits the token is a nudge, and an error message that reached this
/// point is a nudge too. Changing the threshold changes observable
/// behavior; treat it as part of the contract.
#[must_use]
pub fn classify_response(response: &str, focused_max_len: usize) -> FocusVerdict {
    let has_token = response.to_uppercase().contains(FOCUSED_TOKEN);
    if has_token && response.chars().count() < focused_max_len {
        FocusVerdict::Focused
    } else {
        FocusVerdict::Nudge(response.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_affirmation_is_focused() {
        assert_eq!(
            classify_response("FOCUSED.", DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Focused
        );
    }

    #[test]
    fn test_token_match_is_case_insensitive() {
        assert_eq!(
            classify_response("focused", DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Focused
        );
        assert_eq!(
            classify_response("Focused!", DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Focused
        );
    }

    #[test]
    fn test_long_response_with_token_is_a_nudge() {
        let text = "You are clearly not FOCUSED on the report right now.";
        assert_eq!(
            classify_response(text, DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Nudge(text.to_string())
        );
    }

    #[test]
    fn test_response_without_token_is_a_nudge() {
        let text = "Back to the report with you!";
        assert_eq!(
            classify_response(text, DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Nudge(text.to_string())
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly at the threshold no longer counts as a bare affirmation.
        let text = format!("FOCUSED{}", ".".repeat(DEFAULT_FOCUSED_MAX_LEN - 7));
        assert_eq!(text.chars().count(), DEFAULT_FOCUSED_MAX_LEN);
        assert_eq!(
            classify_response(&text, DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Nudge(text.clone())
        );
    }

    #[test]
    fn test_threshold_counts_chars_not_bytes() {
        // Multi-byte padding keeps the char count under the threshold even
        // though the byte length is far over it.
        let text = "FOCUSED \u{e9}\u{e9}\u{e9}";
        assert!(text.len() > text.chars().count());
        assert_eq!(
            classify_response(text, DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Focused
        );
    }

    #[test]
    fn test_empty_response_is_a_nudge() {
        assert_eq!(
            classify_response("", DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Nudge(String::new())
        );
    }

    #[test]
    fn test_error_text_is_misread_as_a_nudge() {
        // Documented fragility: an error string that reaches the heuristic
        // is indistinguishable from a genuine nudge.
        let text = "Error in offline analysis: daemon not ready after 15s";
        assert_eq!(
            classify_response(text, DEFAULT_FOCUSED_MAX_LEN),
            FocusVerdict::Nudge(text.to_string())
        );
    }
}
