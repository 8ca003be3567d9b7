use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{io_error, ConversionError};
use crate::llm::openai::OPENAI_API_BASE;

/// Speech-to-text through an OpenAI-compatible `/audio/transcriptions` endpoint
pub struct Transcriber {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl Transcriber {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::new_with_api_base(api_key, model, OPENAI_API_BASE)
    }

    pub fn new_with_api_base(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub async fn transcribe(&self, path: &Path) -> Result<String, ConversionError> {
        let bytes = tokio::fs::read(path).await.map_err(io_error(path))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        info!(path = %path.display(), bytes = bytes.len(), model = %self.model, "Transcribing audio");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| ConversionError::Transcription(e.to_string()))?;
        let form = Form::new().text("model", self.model.clone()).part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ConversionError::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConversionError::Transcription(format!("API error ({}): {}", status, error_text)));
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ConversionError::Transcription(format!("invalid response: {}", e)))?;

        Ok(transcription.text)
    }
}
