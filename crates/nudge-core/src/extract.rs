use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;

use nudge_ai::NO_TEXT_PLACEHOLDER;

use crate::capture::Screenshot;

const TOOL: &str = "tesseract";

/// OCR wrapper over the `tesseract` CLI.
///
/// Extraction never fails from the caller's point of view: a missing
/// binary, a crashed run or an empty page all degrade to the placeholder
/// text so the classification pipeline keeps going.
#[derive(Debug, Default)]
pub struct TextExtractor;

impl TextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract visible text from the screenshot, or the placeholder.
    pub async fn extract(&self, shot: &Screenshot) -> String {
        match run_ocr(shot).await {
            Ok(raw) => match normalize_ocr_output(&raw) {
                Some(text) => {
                    log::debug!("OCR recovered {} chars", text.chars().count());
                    text
                }
                None => {
                    log::warn!("No text detected on screen");
                    NO_TEXT_PLACEHOLDER.to_string()
                }
            },
            Err(e) => {
                log::warn!("OCR failed, continuing without screen text: {e}");
                NO_TEXT_PLACEHOLDER.to_string()
            }
        }
    }
}

async fn run_ocr(shot: &Screenshot) -> Result<String> {
    let file = tempfile::Builder::new()
        .prefix("nudge-ocr-")
        .suffix(".png")
        .tempfile()?;
    tokio::fs::write(file.path(), &shot.png).await?;

    let output = Command::new(TOOL)
        .arg(file.path())
        .arg("stdout")
        .stderr(Stdio::null())
        .output()
        .await
        .context("failed to run tesseract")?;

    if !output.status.success() {
        anyhow::bail!("tesseract exited with {}", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Trimmed OCR text, or `None` when nothing readable came back.
fn normalize_ocr_output(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
