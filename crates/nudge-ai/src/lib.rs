pub mod analyzer;
pub mod focus;
pub mod lifecycle;
pub mod prompt;
pub mod providers;
pub mod scan;

pub use analyzer::{
    create_analyzer, AnalysisError, FocusAnalyzer, Mode, OfflineAnalyzer, OnlineAnalyzer,
    GEMINI_API_KEY_VAR,
};
pub use focus::{classify_response, FocusVerdict, DEFAULT_FOCUSED_MAX_LEN};
pub use lifecycle::{LifecycleError, OllamaLifecycle, OllamaSettings};
pub use providers::gemini::{GeminiClient, GeminiSettings};
pub use providers::ollama::OllamaClient;
pub use scan::{ScanResult, NO_TEXT_PLACEHOLDER};
