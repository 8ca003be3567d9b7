use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tracing::info;

use crate::convert::is_image_path;
use crate::llm::LLMAdapter;
use crate::tools::{optional_str, required_str, Tool};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const TOOL_NAME: &str = "visualizer";

const CAPTION_PROMPT: &str = "Please write a detailed caption for this image.";

/// Answers questions about an image with a vision-capable model
pub struct VisualQaTool {
    llm: Arc<dyn LLMAdapter>,
    model: String,
    max_tokens: u32,
}

impl VisualQaTool {
    pub fn new(llm: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            max_tokens: 1000,
        }
    }

    pub async fn visualize(&self, image_path: &str, question: Option<&str>) -> AppResult<String> {
        let path = Path::new(image_path);
        if !is_image_path(path) {
            return Err(AppError::UnsupportedInput(format!(
                "{} is not an image: use inspect_file_as_text instead!",
                image_path
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Cannot read image {}: {}", image_path, e)))?;
        let media_type = mime_guess::from_path(path).first_or_octet_stream();

        let prompt = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(CAPTION_PROMPT);

        info!(image = %image_path, bytes = bytes.len(), "Asking vision model about image");

        let mut request = LLMRequest::new(
            self.model.clone(),
            vec![LLMMessage::user_with_base64_image(
                prompt,
                STANDARD.encode(&bytes),
                media_type.essence_str(),
            )],
        );
        request.max_tokens = Some(self.max_tokens);

        let response = self.llm.create_chat_completion(&request).await?;
        Ok(response.content)
    }
}

#[async_trait]
impl Tool for VisualQaTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A tool that can answer questions about attached images."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "image_path": {
                    "type": "string",
                    "description": "The path to the image on which to answer the question. This should be a local path to downloaded image."
                },
                "question": {
                    "type": ["string", "null"],
                    "description": "The question to answer."
                }
            },
            "required": ["image_path"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<String> {
        let image_path = required_str(&input, "image_path")?;
        let question = optional_str(&input, "question")?;
        self.visualize(image_path, question).await
    }
}
