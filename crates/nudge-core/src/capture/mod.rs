use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

/// Full-desktop raster snapshot.
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// PNG-encoded image bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}

/// Screen capture failure. The cycle that hit one is skipped; nothing is
/// shown to the user.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no screen capture tool available on this platform")]
    NoBackend,
    #[error("failed to run {tool}: {source}")]
    Tool {
        tool: &'static str,
        source: std::io::Error,
    },
    #[error("{tool} exited with {status} (screen access denied?)")]
    Failed {
        tool: &'static str,
        status: std::process::ExitStatus,
    },
    #[error("captured image could not be decoded: {0}")]
    Decode(image::ImageError),
    #[error("could not read captured image: {0}")]
    Io(#[from] std::io::Error),
}

/// Screen capture backend for one platform. One shot per call, no retry.
#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    /// Capture the primary display.
    async fn capture(&self) -> Result<Screenshot, CaptureError>;
}

/// Create the platform-specific capturer.
///
/// # Errors
///
/// Returns an error on platforms without a capture backend.
pub fn create_capturer() -> Result<Box<dyn ScreenCapturer>, CaptureError> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacCapturer::new()))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxCapturer::new()))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WindowsCapturer::new()))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(CaptureError::NoBackend)
    }
}

/// Wrap freshly captured PNG bytes, decoding once to validate them and
/// record the dimensions.
pub(crate) fn screenshot_from_png(png: Vec<u8>) -> Result<Screenshot, CaptureError> {
    let decoded = image::load_from_memory(&png).map_err(CaptureError::Decode)?;
    Ok(Screenshot {
        width: decoded.width(),
        height: decoded.height(),
        png,
        captured_at: Utc::now(),
    })
}

/// Scratch file the capture tool writes its PNG into.
pub(crate) fn scratch_png_file() -> Result<tempfile::NamedTempFile, CaptureError> {
    Ok(tempfile::Builder::new()
        .prefix("nudge-shot-")
        .suffix(".png")
        .tempfile()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_screenshot_from_png_records_dimensions() {
        let png = encoded_png(4, 3);
        let shot = screenshot_from_png(png.clone()).unwrap();
        assert_eq!(shot.width, 4);
        assert_eq!(shot.height, 3);
        assert_eq!(shot.png, png);
    }

    #[test]
    fn test_screenshot_from_garbage_is_a_decode_error() {
        let err = screenshot_from_png(vec![0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, CaptureError::Decode(_)));
    }
}
