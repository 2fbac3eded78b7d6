use async_trait::async_trait;
use tokio::process::Command;

use super::{AlertError, AlertPresenter};

const TOOL: &str = "zenity";

/// Blocking modal via `zenity --warning`. Message and title travel as
/// plain arguments, so no shell escaping is involved.
pub struct LinuxPresenter {
    title: String,
}

impl LinuxPresenter {
    #[must_use]
    pub fn new(title: String) -> Self {
        Self { title }
    }
}

#[async_trait]
impl AlertPresenter for LinuxPresenter {
    async fn present(&self, message: &str) -> Result<(), AlertError> {
        let status = Command::new(TOOL)
            .arg("--warning")
            .arg("--title")
            .arg(&self.title)
            .arg("--text")
            .arg(message)
            .status()
            .await
            .map_err(|source| AlertError::Tool { tool: TOOL, source })?;

        // Escape/close yields a non-zero exit; the dialog was still seen.
        if !status.success() {
            log::debug!("dialog dismissed via cancel ({status})");
        }
        Ok(())
    }
}
