use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use nudge_ai::{GeminiSettings, OllamaSettings, DEFAULT_FOCUSED_MAX_LEN};

/// Runtime settings. Every field has a default, so a missing config file
/// just means stock behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds slept between scan cycles.
    pub interval_seconds: u64,
    /// Character threshold for the focus heuristic.
    pub focused_max_len: usize,
    pub ollama: OllamaSettings,
    pub gemini: GeminiSettings,
    pub alert: AlertSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Title of the modal dialog.
    pub title: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            title: String::from("Focus Nudge"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            focused_max_len: DEFAULT_FOCUSED_MAX_LEN,
            ollama: OllamaSettings::default(),
            gemini: GeminiSettings::default(),
            alert: AlertSettings::default(),
        }
    }
}

impl Config {
    /// Path of the user config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        let mut path =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get config dir"))?;
        path.push("nudge");
        path.push("config.toml");
        Ok(path)
    }

    /// Load from the default path; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&raw)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a TOML fragment over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Merge a `.env` file from the working directory into the process
/// environment. Variables already set win; a missing file is not an error.
pub fn load_env_file() {
    load_env_file_from(Path::new(".env"));
}

fn load_env_file_from(path: &Path) {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_env_lines(&raw) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, &value);
        }
    }
    log::debug!("Merged environment from {}", path.display());
}

/// `KEY=VALUE` lines; blanks and `#` comments are skipped, surrounding
/// quotes on values are stripped.
fn parse_env_lines(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.interval_seconds, 300);
        assert_eq!(config.focused_max_len, 20);
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.alert.title, "Focus Nudge");
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.interval_seconds, 300);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_partial_toml_overrides_single_fields() {
        let config = Config::from_toml(
            r#"
            interval_seconds = 60

            [ollama]
            model = "llama3.2:3b"
            "#,
        )
        .unwrap();
        assert_eq!(config.interval_seconds, 60);
        assert_eq!(config.ollama.model, "llama3.2:3b");
        // Untouched fields keep their defaults.
        assert_eq!(config.ollama.readiness_timeout_seconds, 15);
        assert_eq!(config.focused_max_len, 20);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml("interval_seconds = ").is_err());
    }

    #[test]
    fn test_parse_env_lines() {
        let parsed = parse_env_lines(
            "# comment\n\nGEMINI_API_KEY=abc123\nQUOTED=\"hello world\"\n  SPACED =  v  \nbroken-line\n",
        );
        assert_eq!(
            parsed,
            vec![
                (String::from("GEMINI_API_KEY"), String::from("abc123")),
                (String::from("QUOTED"), String::from("hello world")),
                (String::from("SPACED"), String::from("v")),
            ]
        );
    }

    #[test]
    fn test_env_file_does_not_override_existing() {
        std::env::set_var("NUDGE_TEST_EXISTING", "original");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NUDGE_TEST_EXISTING=shadowed").unwrap();
        writeln!(file, "NUDGE_TEST_FRESH=loaded").unwrap();

        load_env_file_from(file.path());

        assert_eq!(std::env::var("NUDGE_TEST_EXISTING").unwrap(), "original");
        assert_eq!(std::env::var("NUDGE_TEST_FRESH").unwrap(), "loaded");
        std::env::remove_var("NUDGE_TEST_EXISTING");
        std::env::remove_var("NUDGE_TEST_FRESH");
    }
}
