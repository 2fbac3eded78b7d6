use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Settings for the hosted classifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: String::from("gemini-2.5-flash"),
        }
    }
}

/// Google GenAI (Gemini) client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// One generateContent call carrying the prompt and, optionally, a PNG
    /// screenshot as an inline image part.
    pub async fn generate(&self, prompt: &str, image_png: Option<&[u8]>) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let mut parts = vec![json!({ "text": prompt })];
        if let Some(png) = image_png {
            parts.push(json!({
                "inline_data": {
                    "mime_type": "image/png",
                    "data": BASE64.encode(png)
                }
            }));
        }

        let body = json!({
            "contents": [{
                "parts": parts
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Google AI")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Google AI API error: {}", error_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Google AI response")?;

        // Extract text from: candidates[0].content.parts[0].text
        json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(ToString::to_string)
            .context("Failed to extract text from Google AI response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        let settings = GeminiSettings::default();
        assert_eq!(settings.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_model_name_follows_settings() {
        let client = GeminiClient::new("key", "gemini-2.0-pro");
        assert_eq!(client.model_name(), "gemini-2.0-pro");
    }
}
