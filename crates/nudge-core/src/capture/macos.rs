use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{scratch_png_file, screenshot_from_png, CaptureError, ScreenCapturer, Screenshot};

const TOOL: &str = "screencapture";

/// Captures the whole screen via the system `screencapture` utility.
#[derive(Debug, Default)]
pub struct MacCapturer;

impl MacCapturer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScreenCapturer for MacCapturer {
    async fn capture(&self) -> Result<Screenshot, CaptureError> {
        let file = scratch_png_file()?;

        // -x: no capture sound.
        let status = Command::new(TOOL)
            .arg("-x")
            .arg("-t")
            .arg("png")
            .arg(file.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| CaptureError::Tool { tool: TOOL, source })?;

        if !status.success() {
            return Err(CaptureError::Failed { tool: TOOL, status });
        }

        let png = tokio::fs::read(file.path()).await?;
        screenshot_from_png(png)
    }
}
