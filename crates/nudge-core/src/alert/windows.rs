use async_trait::async_trait;
use tokio::process::Command;

use super::{AlertError, AlertPresenter};

const TOOL: &str = "powershell";

/// Shows a warning message box; the call returns when the box is closed.
/// Text and title travel via environment variables, so no quoting is
/// needed inside the script.
const DIALOG_SNIPPET: &str = r"
Add-Type -AssemblyName PresentationFramework
[void][System.Windows.MessageBox]::Show($env:NUDGE_ALERT_TEXT, $env:NUDGE_ALERT_TITLE, 'OK', 'Warning')
";

/// Blocking modal via a PowerShell MessageBox.
pub struct WindowsPresenter {
    title: String,
}

impl WindowsPresenter {
    #[must_use]
    pub fn new(title: String) -> Self {
        Self { title }
    }
}

#[async_trait]
impl AlertPresenter for WindowsPresenter {
    async fn present(&self, message: &str) -> Result<(), AlertError> {
        let status = Command::new(TOOL)
            .arg("-NoProfile")
            .arg("-Command")
            .arg(DIALOG_SNIPPET)
            .env("NUDGE_ALERT_TEXT", message)
            .env("NUDGE_ALERT_TITLE", &self.title)
            .status()
            .await
            .map_err(|source| AlertError::Tool { tool: TOOL, source })?;

        if !status.success() {
            log::debug!("dialog dismissed via cancel ({status})");
        }
        Ok(())
    }
}
