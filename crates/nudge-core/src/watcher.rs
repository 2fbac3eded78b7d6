//! The poll loop: sleep a fixed interval, scan once, classify, alert on a
//! distraction verdict, repeat until interrupted.
//!
//! Strictly sequential. A cycle runs to completion (including a blocking
//! alert) before the next sleep begins; no two scans ever overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};

use nudge_ai::{classify_response, create_analyzer, FocusAnalyzer, FocusVerdict, Mode, ScanResult};

use crate::alert::{create_presenter, AlertPresenter};
use crate::capture::{create_capturer, ScreenCapturer};
use crate::config::Config;
use crate::extract::TextExtractor;

/// Outcome of one scan-and-classify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// On task; nothing was shown.
    Focused,
    /// Distracted (or the analysis failed); the alert was presented.
    Nudged,
    /// Screen capture failed; cycle skipped without an alert.
    CaptureFailed,
}

/// Drives the scan cycle on a fixed interval until interrupted.
pub struct Watcher {
    goal: String,
    capturer: Box<dyn ScreenCapturer>,
    extractor: TextExtractor,
    analyzer: Box<dyn FocusAnalyzer>,
    presenter: Box<dyn AlertPresenter>,
    interval_seconds: u64,
    focused_max_len: usize,
    shutdown: Arc<AtomicBool>,
}

impl Watcher {
    /// Wire up the full platform stack for `goal` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform has no capture backend.
    pub fn new(goal: String, mode: Mode, config: &Config) -> Result<Self> {
        Ok(Self::with_parts(
            goal,
            create_capturer()?,
            create_analyzer(mode, config.ollama.clone(), &config.gemini),
            create_presenter(config.alert.title.clone()),
            config,
        ))
    }

    /// Assemble a watcher from explicit parts; `new` and the tests both
    /// come through here.
    #[must_use]
    pub fn with_parts(
        goal: String,
        capturer: Box<dyn ScreenCapturer>,
        analyzer: Box<dyn FocusAnalyzer>,
        presenter: Box<dyn AlertPresenter>,
        config: &Config,
    ) -> Self {
        Self {
            goal,
            capturer,
            extractor: TextExtractor::new(),
            analyzer,
            presenter,
            interval_seconds: config.interval_seconds,
            focused_max_len: config.focused_max_len,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run until Ctrl-C. The loop sleeps first; an interrupt during the
    /// sleep ends the run without another scan. Cycle failures (including
    /// an alert that could not be shown) are logged and never end the
    /// loop.
    ///
    /// # Errors
    ///
    /// Currently infallible; `Result` keeps the signature stable for
    /// callers.
    pub async fn run_with_signals(&mut self) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(self.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately; consume it
        // so every scan is preceded by a full sleep.
        ticker.tick().await;

        log::info!(
            "Watching (goal: {:?}, mode: {}, every {}s)",
            self.goal,
            self.analyzer.mode(),
            self.interval_seconds
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    log::info!("Waking up, scanning screen...");
                    match self.run_cycle().await {
                        Ok(outcome) => log::debug!("Cycle finished: {outcome:?}"),
                        Err(e) => log::error!("Cycle failed: {e}"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received Ctrl-C, shutting down...");
                    self.shutdown.store(true, Ordering::SeqCst);
                }
            }

            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
        }

        log::info!("Watcher stopped.");
        Ok(())
    }

    /// One full cycle: capture, extract (offline only), analyze, alert on
    /// a nudge verdict.
    ///
    /// An analysis failure is rendered to its report text and pushed
    /// through the same focus heuristic as a genuine response, so the
    /// error surfaces as an alert. That mirrors the long-standing behavior
    /// of the assistant; see DESIGN.md before "fixing" it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the alert itself cannot be presented.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let shot = match self.capturer.capture().await {
            Ok(shot) => shot,
            Err(e) => {
                log::warn!("Screen capture failed, skipping cycle: {e}");
                return Ok(CycleOutcome::CaptureFailed);
            }
        };
        log::debug!("Captured {}x{} screen", shot.width, shot.height);

        let mode = self.analyzer.mode();
        let ocr_text = match mode {
            Mode::Offline => Some(self.extractor.extract(&shot).await),
            Mode::Online => None,
        };
        let scan = ScanResult {
            png: shot.png,
            ocr_text,
            captured_at: shot.captured_at,
        };

        let response = match self.analyzer.analyze(&self.goal, &scan).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Analysis failed: {e}");
                e.to_report_text(mode)
            }
        };
        log::info!("Result: {response}");

        match classify_response(&response, self.focused_max_len) {
            FocusVerdict::Focused => Ok(CycleOutcome::Focused),
            FocusVerdict::Nudge(message) => {
                self.presenter.present(&message).await?;
                Ok(CycleOutcome::Nudged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::alert::AlertError;
    use crate::capture::{CaptureError, Screenshot};
    use nudge_ai::AnalysisError;

    struct StaticCapturer;

    #[async_trait]
    impl ScreenCapturer for StaticCapturer {
        async fn capture(&self) -> Result<Screenshot, CaptureError> {
            Ok(Screenshot {
                png: vec![0x00],
                width: 1,
                height: 1,
                captured_at: Utc::now(),
            })
        }
    }

    struct FailingCapturer;

    #[async_trait]
    impl ScreenCapturer for FailingCapturer {
        async fn capture(&self) -> Result<Screenshot, CaptureError> {
            Err(CaptureError::Tool {
                tool: "screencapture",
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    /// Answers with a fixed reply, or with a missing-key failure when no
    /// reply is canned.
    struct CannedAnalyzer {
        reply: Option<String>,
        mode: Mode,
    }

    #[async_trait]
    impl FocusAnalyzer for CannedAnalyzer {
        async fn analyze(&self, _goal: &str, _scan: &ScanResult) -> Result<String, AnalysisError> {
            self.reply.clone().ok_or(AnalysisError::MissingApiKey)
        }

        fn mode(&self) -> Mode {
            self.mode
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPresenter {
        messages: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AlertPresenter for RecordingPresenter {
        async fn present(&self, message: &str) -> Result<(), AlertError> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn watcher_with(
        capturer: Box<dyn ScreenCapturer>,
        analyzer: Box<dyn FocusAnalyzer>,
        presenter: RecordingPresenter,
    ) -> Watcher {
        Watcher::with_parts(
            String::from("write report"),
            capturer,
            analyzer,
            Box::new(presenter),
            &Config::default(),
        )
    }

    #[tokio::test]
    async fn test_focused_response_shows_no_alert() {
        let presenter = RecordingPresenter::default();
        let mut watcher = watcher_with(
            Box::new(StaticCapturer),
            Box::new(CannedAnalyzer {
                reply: Some(String::from("FOCUSED.")),
                mode: Mode::Offline,
            }),
            presenter.clone(),
        );

        let outcome = watcher.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Focused);
        assert!(presenter.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_distracted_response_presents_the_nudge() {
        let presenter = RecordingPresenter::default();
        let mut watcher = watcher_with(
            Box::new(StaticCapturer),
            Box::new(CannedAnalyzer {
                reply: Some(String::from("Cat videos count as research now?")),
                mode: Mode::Online,
            }),
            presenter.clone(),
        );

        let outcome = watcher.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Nudged);
        assert_eq!(
            *presenter.messages.lock().unwrap(),
            vec![String::from("Cat videos count as research now?")]
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_alerts_with_the_error_text() {
        let presenter = RecordingPresenter::default();
        let mut watcher = watcher_with(
            Box::new(StaticCapturer),
            Box::new(CannedAnalyzer {
                reply: None,
                mode: Mode::Online,
            }),
            presenter.clone(),
        );

        let outcome = watcher.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Nudged);
        assert_eq!(
            *presenter.messages.lock().unwrap(),
            vec![String::from("Error: GEMINI_API_KEY not found in .env")]
        );
    }

    #[tokio::test]
    async fn test_capture_failure_skips_cycle_without_alert() {
        let presenter = RecordingPresenter::default();
        let mut watcher = watcher_with(
            Box::new(FailingCapturer),
            Box::new(CannedAnalyzer {
                reply: Some(String::from("FOCUSED.")),
                mode: Mode::Online,
            }),
            presenter.clone(),
        );

        let outcome = watcher.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::CaptureFailed);
        assert!(presenter.messages.lock().unwrap().is_empty());
    }
}
