use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::lifecycle::{LifecycleError, OllamaLifecycle, OllamaSettings};
use crate::prompt;
use crate::providers::gemini::{GeminiClient, GeminiSettings};
use crate::scan::ScanResult;

/// Environment variable holding the hosted API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Which backend performs classification. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Hosted vision model (Gemini).
    Online,
    /// Local daemon over OCR text.
    Offline,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(format!("unknown mode: {other} (expected online or offline)")),
        }
    }
}

/// Analysis failure, kept apart from genuine model text so callers cannot
/// mistake one for the other.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("GEMINI_API_KEY not found in .env")]
    MissingApiKey,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{0}")]
    Api(anyhow::Error),
}

impl AnalysisError {
    /// Render the failure the way the assistant reports it to the user.
    /// The missing-key message is mode-independent; everything else is
    /// prefixed with the analysis path that failed.
    #[must_use]
    pub fn to_report_text(&self, mode: Mode) -> String {
        match self {
            Self::MissingApiKey => format!("Error: {self}"),
            Self::Lifecycle(_) | Self::Api(_) => format!("Error in {mode} analysis: {self}"),
        }
    }
}

/// A classification backend: goal plus scan in, raw model text out.
#[async_trait]
pub trait FocusAnalyzer: Send + Sync {
    /// Submit one classification request. No retry; the caller decides
    /// what a failure means.
    async fn analyze(&self, goal: &str, scan: &ScanResult) -> Result<String, AnalysisError>;

    fn mode(&self) -> Mode;
}

/// Local path: OCR text through a daemon managed for exactly one request.
pub struct OfflineAnalyzer {
    lifecycle: OllamaLifecycle,
}

impl OfflineAnalyzer {
    #[must_use]
    pub fn new(settings: OllamaSettings) -> Self {
        Self {
            lifecycle: OllamaLifecycle::new(settings),
        }
    }
}

#[async_trait]
impl FocusAnalyzer for OfflineAnalyzer {
    async fn analyze(&self, goal: &str, scan: &ScanResult) -> Result<String, AnalysisError> {
        let settings = self.lifecycle.settings();
        let prompt = prompt::offline_prompt(
            goal,
            scan.text_or_placeholder(),
            settings.prompt_char_budget,
        );
        let image = settings
            .attach_screenshot
            .then_some(scan.png.as_slice());

        Ok(self.lifecycle.classify_once(&prompt, image).await?)
    }

    fn mode(&self) -> Mode {
        Mode::Offline
    }
}

/// Hosted path: screenshot and goal to the Gemini API.
pub struct OnlineAnalyzer {
    client: Option<GeminiClient>,
}

impl OnlineAnalyzer {
    /// `api_key` is whatever the environment held at startup; a missing
    /// key surfaces per request, not as a construction failure.
    #[must_use]
    pub fn new(api_key: Option<String>, settings: &GeminiSettings) -> Self {
        Self {
            client: api_key.map(|key| GeminiClient::new(&key, &settings.model)),
        }
    }
}

#[async_trait]
impl FocusAnalyzer for OnlineAnalyzer {
    async fn analyze(&self, goal: &str, scan: &ScanResult) -> Result<String, AnalysisError> {
        let client = self.client.as_ref().ok_or(AnalysisError::MissingApiKey)?;
        let prompt = prompt::online_prompt(goal);

        client
            .generate(&prompt, Some(&scan.png))
            .await
            .map_err(AnalysisError::Api)
    }

    fn mode(&self) -> Mode {
        Mode::Online
    }
}

/// Build the analyzer for the selected mode. The hosted key is read from
/// the environment here, once, at startup.
#[must_use]
pub fn create_analyzer(
    mode: Mode,
    ollama: OllamaSettings,
    gemini: &GeminiSettings,
) -> Box<dyn FocusAnalyzer> {
    match mode {
        Mode::Offline => Box::new(OfflineAnalyzer::new(ollama)),
        Mode::Online => Box::new(OnlineAnalyzer::new(
            std::env::var(GEMINI_API_KEY_VAR).ok(),
            gemini,
        )),
    }
}
