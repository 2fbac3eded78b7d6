//! Prompt builders for the two analysis paths.
//!
//! Screen text is clipped to a fixed character budget before it is
//! embedded; an unbounded OCR dump makes the local daemon crawl without
//! improving the verdict.

/// Character budget applied to OCR text before it is embedded in a prompt.
pub const PROMPT_CHAR_BUDGET: usize = 2000;

/// Clip to at most `budget` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Prompt for the local daemon: goal plus visible screen text.
#[must_use]
pub fn offline_prompt(goal: &str, screen_text: &str, budget: usize) -> String {
    format!(
        "You are a focus assistant. The user's goal is: \"{goal}\".\n\
         Here is the text content visible on their screen:\n\
         \n\
         ---\n\
         {}\n\
         ---\n\
         \n\
         (Text truncated to {budget} chars for speed)\n\
         \n\
         Is the user working on their goal?\n\
         If YES, reply with \"FOCUSED\".\n\
         If NO, reply with a SHORT, QUIRKY, SARCASTIC nudge to get them back to work.",
        truncate_chars(screen_text, budget),
    )
}

/// Prompt for the hosted vision model; the screenshot rides along as an
/// image part, so only the goal goes into the text.
#[must_use]
pub fn online_prompt(goal: &str) -> String {
    format!(
        "The user's declared goal is: \"{goal}\".\n\
         Look at this screenshot of their desktop.\n\
         Are they working on it?\n\
         If yes, just say \"FOCUSED\".\n\
         If no, write a SHORT, QUIRKY, SARCASTIC nudge to get them back to work."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_clips_to_budget() {
        assert_eq!(truncate_chars("abcdefgh", 3), "abc");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "\u{e9}\u{e9}\u{e9}\u{e9}";
        assert_eq!(truncate_chars(text, 2), "\u{e9}\u{e9}");
    }

    #[test]
    fn test_truncate_zero_budget() {
        assert_eq!(truncate_chars("anything", 0), "");
    }

    #[test]
    fn test_offline_prompt_embeds_goal_and_text() {
        let prompt = offline_prompt("write report", "quarterly numbers", PROMPT_CHAR_BUDGET);
        assert!(prompt.contains("\"write report\""));
        assert!(prompt.contains("quarterly numbers"));
        assert!(prompt.contains("FOCUSED"));
    }

    #[test]
    fn test_offline_prompt_clips_screen_text() {
        let long_text = "x".repeat(5000);
        let prompt = offline_prompt("goal", &long_text, PROMPT_CHAR_BUDGET);
        assert!(!prompt.contains(&long_text));
        assert!(prompt.contains(&"x".repeat(PROMPT_CHAR_BUDGET)));
    }

    #[test]
    fn test_online_prompt_embeds_goal() {
        let prompt = online_prompt("study algorithms");
        assert!(prompt.contains("\"study algorithms\""));
        assert!(prompt.contains("FOCUSED"));
    }
}
