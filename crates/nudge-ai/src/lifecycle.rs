//! Local daemon lifecycle: the inference backend exists for exactly one
//! classification request, then goes away again.
//!
//! Sequence: spawn `ollama serve`, poll the HTTP health endpoint until it
//! answers (bounded), make sure the model artifact is installed (pull once
//! if not), issue one chat request, then terminate gracefully with a
//! forced kill as the fallback. Early returns cannot leak the process:
//! the child is registered with `kill_on_drop`.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::providers::ollama::{model_matches, OllamaClient};

/// Tuning for the local daemon lifecycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    /// Model identifier handed to chat and pull requests.
    pub model: String,
    pub base_url: String,
    /// Executable spawned as `<binary> serve`.
    pub binary: String,
    pub readiness_timeout_seconds: u64,
    pub readiness_poll_ms: u64,
    /// How long a graceful shutdown may take before the forced kill.
    pub shutdown_grace_seconds: u64,
    pub prompt_char_budget: usize,
    /// Also send the raw screenshot with the chat request. Off by default;
    /// only useful with a vision-capable model.
    pub attach_screenshot: bool,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            model: String::from("llama3.2"),
            base_url: String::from("http://localhost:11434"),
            binary: String::from("ollama"),
            readiness_timeout_seconds: 15,
            readiness_poll_ms: 500,
            shutdown_grace_seconds: 5,
            prompt_char_budget: crate::prompt::PROMPT_CHAR_BUDGET,
            attach_screenshot: false,
        }
    }
}

/// Failure anywhere in the spawn/provision/request sequence. One failure
/// aborts the whole offline path; there is no retry.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to launch `{binary} serve`: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },
    #[error("daemon not ready after {0}s")]
    ReadinessTimeout(u64),
    #[error("could not query installed models: {0}")]
    ListModels(anyhow::Error),
    #[error("pull of model `{model}` failed: {reason}")]
    Pull { model: String, reason: anyhow::Error },
    #[error("chat request failed: {0}")]
    Chat(anyhow::Error),
}

/// Owns a local inference daemon for the duration of exactly one
/// classification request.
pub struct OllamaLifecycle {
    settings: OllamaSettings,
}

impl OllamaLifecycle {
    #[must_use]
    pub fn new(settings: OllamaSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &OllamaSettings {
        &self.settings
    }

    /// Run the full daemon lifecycle around a single chat request.
    ///
    /// # Errors
    ///
    /// Returns the first failure in the sequence. The daemon process is
    /// force-killed on every error path before this returns.
    pub async fn classify_once(
        &self,
        prompt: &str,
        image_png: Option<&[u8]>,
    ) -> Result<String, LifecycleError> {
        let daemon = DaemonHandle::spawn(&self.settings.binary)?;
        let client = OllamaClient::new(&self.settings.base_url);

        self.wait_until_ready(&client).await?;
        self.ensure_model(&client).await?;

        let answer = client
            .chat(&self.settings.model, prompt, image_png)
            .await
            .map_err(LifecycleError::Chat)?;

        daemon
            .shutdown(Duration::from_secs(self.settings.shutdown_grace_seconds))
            .await;

        Ok(answer)
    }

    /// Bounded polling health check; a daemon that never answers within
    /// the timeout is reported as such instead of being blindly queried.
    async fn wait_until_ready(&self, client: &OllamaClient) -> Result<(), LifecycleError> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.settings.readiness_timeout_seconds);
        let poll = Duration::from_millis(self.settings.readiness_poll_ms);

        while tokio::time::Instant::now() < deadline {
            if client.is_ready().await {
                log::debug!("daemon is ready");
                return Ok(());
            }
            tokio::time::sleep(poll).await;
        }

        Err(LifecycleError::ReadinessTimeout(
            self.settings.readiness_timeout_seconds,
        ))
    }

    /// Check the daemon's installed models and pull the target exactly
    /// once when it is missing.
    async fn ensure_model(&self, client: &OllamaClient) -> Result<(), LifecycleError> {
        let installed = client
            .list_models()
            .await
            .map_err(LifecycleError::ListModels)?;

        if installed
            .iter()
            .any(|name| model_matches(name, &self.settings.model))
        {
            log::debug!("model {} already installed", self.settings.model);
            return Ok(());
        }

        log::info!(
            "model {} not installed, pulling (this can take a while)...",
            self.settings.model
        );
        client
            .pull_model(&self.settings.model)
            .await
            .map_err(|reason| LifecycleError::Pull {
                model: self.settings.model.clone(),
                reason,
            })
    }
}

/// Child-process guard for `<binary> serve`. Output is discarded; the
/// process dies with the guard unless `shutdown` already reaped it.
struct DaemonHandle {
    child: Child,
}

impl DaemonHandle {
    fn spawn(binary: &str) -> Result<Self, LifecycleError> {
        let child = Command::new(binary)
            .arg("serve")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LifecycleError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        log::debug!("spawned `{binary} serve` (pid {:?})", child.id());
        Ok(Self { child })
    }

    /// Ask the daemon to exit, wait up to `grace`, then force-kill.
    async fn shutdown(mut self, grace: Duration) {
        if self.terminate_and_wait(grace).await {
            log::debug!("daemon exited within the grace period");
            return;
        }
        log::warn!("daemon did not stop gracefully, force-killing");
        if let Err(e) = self.child.kill().await {
            log::warn!("failed to kill daemon: {e}");
        }
    }

    #[cfg(unix)]
    async fn terminate_and_wait(&mut self, grace: Duration) -> bool {
        let Some(pid) = self.child.id() else {
            // Already reaped.
            return true;
        };
        // SAFETY: pid belongs to a child we spawned and still own.
        #[allow(clippy::cast_possible_wrap)]
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
        tokio::time::timeout(grace, self.child.wait()).await.is_ok()
    }

    #[cfg(not(unix))]
    async fn terminate_and_wait(&mut self, _grace: Duration) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = OllamaSettings::default();
        assert_eq!(settings.model, "llama3.2");
        assert_eq!(settings.base_url, "http://localhost:11434");
        assert_eq!(settings.binary, "ollama");
        assert_eq!(settings.readiness_timeout_seconds, 15);
        assert_eq!(settings.shutdown_grace_seconds, 5);
        assert_eq!(settings.prompt_char_budget, 2000);
        assert!(!settings.attach_screenshot);
    }

    #[tokio::test]
    async fn test_spawn_failure_surfaces_as_lifecycle_error() {
        let settings = OllamaSettings {
            binary: String::from("/definitely/not/a/real/binary"),
            ..OllamaSettings::default()
        };
        let lifecycle = OllamaLifecycle::new(settings);

        let err = lifecycle.classify_once("prompt", None).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Spawn { .. }));
    }

    #[test]
    fn test_readiness_timeout_names_the_budget() {
        let err = LifecycleError::ReadinessTimeout(15);
        assert_eq!(err.to_string(), "daemon not ready after 15s");
    }
}
