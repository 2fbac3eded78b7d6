use async_trait::async_trait;
use thiserror::Error;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

/// Alert delivery failure. Distinct from a dismissal: pressing Escape or
/// closing the dialog still counts as the user having seen it.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("no dialog tool available on this platform")]
    NoBackend,
    #[error("failed to run {tool}: {source}")]
    Tool {
        tool: &'static str,
        source: std::io::Error,
    },
}

/// Modal alert backend for one platform.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show the message in an OS modal dialog and block until the user
    /// dismisses it (click, Enter or Escape). No timeout: an unattended
    /// dialog blocks indefinitely.
    async fn present(&self, message: &str) -> Result<(), AlertError>;
}

/// Create the platform-specific presenter.
#[must_use]
pub fn create_presenter(title: String) -> Box<dyn AlertPresenter> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacPresenter::new(title))
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::LinuxPresenter::new(title))
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPresenter::new(title))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = title;
        Box::new(NullPresenter)
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
struct NullPresenter;

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
#[async_trait]
impl AlertPresenter for NullPresenter {
    async fn present(&self, _message: &str) -> Result<(), AlertError> {
        Err(AlertError::NoBackend)
    }
}
