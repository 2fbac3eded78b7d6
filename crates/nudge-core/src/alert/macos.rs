use async_trait::async_trait;
use tokio::process::Command;

use super::{AlertError, AlertPresenter};

const TOOL: &str = "osascript";

/// Blocking modal via AppleScript's `display dialog`. The osascript child
/// only exits once the dialog is dismissed, which is what makes
/// `present` block.
pub struct MacPresenter {
    title: String,
}

impl MacPresenter {
    #[must_use]
    pub fn new(title: String) -> Self {
        Self { title }
    }

    fn dialog_script(&self, message: &str) -> String {
        format!(
            "display dialog \"{}\" with title \"{}\" buttons {{\"Back to work\"}} \
             default button 1 with icon caution",
            escape_applescript(message),
            escape_applescript(&self.title),
        )
    }
}

#[async_trait]
impl AlertPresenter for MacPresenter {
    async fn present(&self, message: &str) -> Result<(), AlertError> {
        let status = Command::new(TOOL)
            .arg("-e")
            .arg(self.dialog_script(message))
            .status()
            .await
            .map_err(|source| AlertError::Tool { tool: TOOL, source })?;

        // Escape makes osascript exit non-zero ("user canceled"); the
        // dialog was still seen and dismissed.
        if !status.success() {
            log::debug!("dialog dismissed via cancel ({status})");
        }
        Ok(())
    }
}

/// Message text is embedded in an AppleScript string literal, so quotes
/// and backslashes must be neutralized.
fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_quotes() {
        assert_eq!(
            escape_applescript("go \"work\" now"),
            "go \\\"work\\\" now"
        );
    }

    #[test]
    fn test_escape_neutralizes_backslashes() {
        assert_eq!(escape_applescript("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_dialog_script_embeds_message_and_title() {
        let presenter = MacPresenter::new(String::from("Focus Nudge"));
        let script = presenter.dialog_script("Back to the report!");
        assert!(script.contains("Back to the report!"));
        assert!(script.contains("Focus Nudge"));
        assert!(script.starts_with("display dialog"));
    }
}
