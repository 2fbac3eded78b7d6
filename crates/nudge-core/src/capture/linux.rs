use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{scratch_png_file, screenshot_from_png, CaptureError, ScreenCapturer, Screenshot};

/// Tools tried in order: Wayland compositors first, then X11, then the
/// ImageMagick fallback. The first one present on PATH is used.
const CANDIDATES: &[(&str, &[&str])] = &[
    ("grim", &[]),
    ("scrot", &["--overwrite"]),
    ("import", &["-window", "root"]),
];

/// Captures the whole screen through whichever capture tool the desktop
/// provides.
#[derive(Debug, Default)]
pub struct LinuxCapturer;

impl LinuxCapturer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScreenCapturer for LinuxCapturer {
    async fn capture(&self) -> Result<Screenshot, CaptureError> {
        let file = scratch_png_file()?;

        for &(tool, args) in CANDIDATES {
            match run_tool(tool, args, file.path()).await {
                Ok(()) => {
                    let png = tokio::fs::read(file.path()).await?;
                    return screenshot_from_png(png);
                }
                // Not installed; try the next candidate.
                Err(CaptureError::Tool { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    log::debug!("{tool} not found, trying next capture tool");
                }
                // The tool ran and refused (denied capture, no display);
                // surface that rather than masking it with a fallback.
                Err(e) => return Err(e),
            }
        }

        Err(CaptureError::NoBackend)
    }
}

async fn run_tool(tool: &'static str, args: &[&str], path: &Path) -> Result<(), CaptureError> {
    let status = Command::new(tool)
        .args(args)
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| CaptureError::Tool { tool, source })?;

    if !status.success() {
        return Err(CaptureError::Failed { tool, status });
    }
    Ok(())
}
