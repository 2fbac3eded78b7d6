use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{scratch_png_file, screenshot_from_png, CaptureError, ScreenCapturer, Screenshot};

const TOOL: &str = "powershell";

/// Copies the virtual screen into a bitmap and saves it as PNG. The target
/// path travels via an environment variable, so no quoting is needed.
const CAPTURE_SNIPPET: &str = r"
Add-Type -AssemblyName System.Windows.Forms,System.Drawing
$bounds = [System.Windows.Forms.SystemInformation]::VirtualScreen
$bmp = New-Object System.Drawing.Bitmap $bounds.Width, $bounds.Height
$gfx = [System.Drawing.Graphics]::FromImage($bmp)
$gfx.CopyFromScreen($bounds.Location, [System.Drawing.Point]::Empty, $bounds.Size)
$bmp.Save($env:NUDGE_SHOT_PATH, [System.Drawing.Imaging.ImageFormat]::Png)
";

/// Captures the whole screen through a PowerShell + System.Drawing
/// one-shot script.
#[derive(Debug, Default)]
pub struct WindowsCapturer;

impl WindowsCapturer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScreenCapturer for WindowsCapturer {
    async fn capture(&self) -> Result<Screenshot, CaptureError> {
        let file = scratch_png_file()?;

        let status = Command::new(TOOL)
            .arg("-NoProfile")
            .arg("-Command")
            .arg(CAPTURE_SNIPPET)
            .env("NUDGE_SHOT_PATH", file.path())
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
