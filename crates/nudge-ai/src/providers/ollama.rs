use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;

/// HTTP client for a local Ollama daemon.
///
/// No request timeout is configured: a model pull can legitimately take
/// minutes on a cold machine.
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Health probe; true once the daemon answers its tag listing.
    pub async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Names of the locally installed models, as the daemon reports them
    /// (tagged, e.g. `llama3.2:latest`).
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to query Ollama model list")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error: {}", error_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Ollama model list")?;

        let models = json["models"]
            .as_array()
            .context("Ollama model list missing models array")?
            .iter()
            .filter_map(|model| model["name"].as_str().map(ToString::to_string))
            .collect();

        Ok(models)
    }

    /// Download a model; blocks until the daemon reports completion.
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);

        let body = json!({
            "model": model,
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send pull request to Ollama")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error: {}", error_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Ollama pull response")?;

        match json["status"].as_str() {
            Some("success") => Ok(()),
            Some(status) => anyhow::bail!("pull ended with status: {}", status),
            None => anyhow::bail!("pull response carried no status"),
        }
    }

    /// One chat-style completion, optionally with a PNG attachment for
    /// vision-capable models.
    pub async fn chat(&self, model: &str, prompt: &str, image_png: Option<&[u8]>) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let mut message = json!({
            "role": "user",
            "content": prompt
        });
        if let Some(png) = image_png {
            message["images"] = json!([BASE64.encode(png)]);
        }

        let body = json!({
            "model": model,
            "messages": [message],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error: {}", error_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        // Extract text from: message.content
        json["message"]["content"]
            .as_str()
            .map(ToString::to_string)
            .context("Failed to extract text from Ollama response")
    }
}

/// Whether an installed model name satisfies the requested one.
///
/// The daemon reports canonical tags, so a request for `llama3.2` must
/// match an installed `llama3.2:latest`; without this the manager would
/// re-pull an already present model on every scan.
#[must_use]
pub fn model_matches(installed: &str, requested: &str) -> bool {
    if installed == requested {
        return true;
    }
    !requested.contains(':') && installed == format!("{requested}:latest")
}
