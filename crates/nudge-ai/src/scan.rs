use chrono::{DateTime, Utc};

/// Text substituted when OCR recovers nothing readable from the screen.
pub const NO_TEXT_PLACEHOLDER: &str = "[No readable text found on screen]";

/// One captured screen plus whatever text OCR recovered from it.
///
/// Built per poll cycle and dropped as soon as classification is done;
/// nothing about a scan is persisted.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Full-desktop screenshot, PNG-encoded.
    pub png: Vec<u8>,
    /// Visible screen text, when the OCR pass ran.
    pub ocr_text: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl ScanResult {
    /// Screen text for prompt building, degraded to the placeholder when
    /// no OCR text is attached.
    #[must_use]
    pub fn text_or_placeholder(&self) -> &str {
        self.ocr_text.as_deref().unwrap_or(NO_TEXT_PLACEHOLDER)
    }
}
