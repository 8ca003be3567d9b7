//! `inspect_file_as_text`
//!
//! Reads a file through a [`DocumentConverter`] and either hands the text back
//! verbatim or asks the model a question about it. Images are refused up front
//! so agents go to the visualizer instead; archives and question-less calls
//! never reach the model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::InspectorConfig;
use crate::convert::{is_archive_path, is_image_path, DocumentConverter};
use crate::llm::LLMAdapter;
use crate::tools::{optional_str, required_str, Tool};
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};

pub const TOOL_NAME: &str = "inspect_file_as_text";

const DESCRIPTION: &str = "You cannot load files yourself: instead call this tool to read a file as markdown text and ask questions about it.
This tool handles the following file extensions: [\".html\", \".htm\", \".xlsx\", \".pptx\", \".wav\", \".mp3\", \".flac\", \".pdf\", \".docx\"], and all other types of text files. IT DOES NOT HANDLE IMAGES.";

const STANDARD_HEADINGS: &str = "Now answer the question below. Use these three headings: '1. Short answer', '2. Extremely detailed answer', '3. Additional Context on the document and question asked'.";

/// Shape of the prompt sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// System message with the file, user message with the question
    InitialExam,
    /// Caption-then-answer instructions with three fixed headings
    #[default]
    Standard,
}

pub struct TextInspectorTool {
    converter: Arc<dyn DocumentConverter>,
    llm: Arc<dyn LLMAdapter>,
    model: String,
    config: Arc<InspectorConfig>,
}

impl TextInspectorTool {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        llm: Arc<dyn LLMAdapter>,
        model: impl Into<String>,
        config: Arc<InspectorConfig>,
    ) -> Self {
        Self {
            converter,
            llm,
            model: model.into(),
            config,
        }
    }

    pub async fn inspect(&self, file_path: &str, question: Option<&str>) -> AppResult<String> {
        self.inspect_with_style(file_path, question, PromptStyle::Standard).await
    }

    pub async fn inspect_initial_exam(&self, file_path: &str, question: Option<&str>) -> AppResult<String> {
        self.inspect_with_style(file_path, question, PromptStyle::InitialExam).await
    }

    pub async fn inspect_with_style(
        &self,
        file_path: &str,
        question: Option<&str>,
        style: PromptStyle,
    ) -> AppResult<String> {
        let path = Path::new(file_path);

        if is_image_path(path) {
            return Err(AppError::UnsupportedInput(
                "Cannot use inspect_file_as_text tool with images: use visualizer instead!".to_string(),
            ));
        }

        let result = self.converter.convert(path).await?;
        info!(
            file = %file_path,
            chars = result.text_content.chars().count(),
            "Converted file for inspection"
        );

        if is_archive_path(path) {
            return Ok(result.text_content);
        }

        let question = match question.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => q,
            None => return Ok(result.text_content),
        };

        let title = result
            .title
            .as_deref()
            .or_else(|| path.file_name().and_then(|n| n.to_str()))
            .unwrap_or(file_path);
        let limit = self.config.text_limit();
        let excerpt = truncate_chars(&result.text_content, limit);
        debug!(limit, excerpt_chars = excerpt.chars().count(), style = ?style, "Asking model about file");

        let request = LLMRequest::new(self.model.clone(), build_messages(style, title, excerpt, question));
        let response = self.llm.create_chat_completion(&request).await?;

        info!(file = %file_path, response_len = response.content.len(), "Inspection answered");
        Ok(response.content)
    }
}

/// Prefix of `text` holding at most `limit` characters
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn build_messages(style: PromptStyle, title: &str, excerpt: &str, question: &str) -> Vec<LLMMessage> {
    match style {
        PromptStyle::InitialExam => vec![
            LLMMessage::system(format!("Here is a file:\n### {}\n\n{}", title, excerpt)),
            LLMMessage::user(question),
        ],
        PromptStyle::Standard => vec![
            LLMMessage::system(format!(
                "You will have to write a short caption for this file, then answer this question:{}",
                question
            )),
            LLMMessage::user(format!("Here is the complete file:\n### {}\n\n{}", title, excerpt)),
            LLMMessage::user(format!("{}{}", STANDARD_HEADINGS, question)),
        ],
    }
}

#[async_trait]
impl Tool for TextInspectorTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file you want to read as text. Must be a '.something' file, like '.pdf'. If it is an image, use the visualizer tool instead! DO NOT USE THIS TOOL FOR A WEBPAGE: use the search tool instead!"
                },
                "question": {
                    "type": ["string", "null"],
                    "description": "[Optional]: Your question, as a natural language sentence. Provide as much context as possible. Do not pass this parameter if you just want to directly return the content of the file."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<String> {
        let file_path = required_str(&input, "file_path")?;
        let question = optional_str(&input, "question")?;
        self.inspect(file_path, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConversionError, ConversionResult};
    use crate::types::{LLMResponse, MessageRole, TokenUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeConverter {
        result: Option<ConversionResult>,
        calls: AtomicUsize,
    }

    impl FakeConverter {
        fn returning(title: Option<&str>, text: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Some(ConversionResult::new(title.map(str::to_string), text)),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DocumentConverter for FakeConverter {
        async fn convert(&self, path: &Path) -> Result<ConversionResult, ConversionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| ConversionError::malformed(path, "corrupt file"))
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        requests: Mutex<Vec<LLMRequest>>,
        fail: bool,
    }

    impl RecordingLlm {
        fn requests(&self) -> Vec<LLMRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMAdapter for RecordingLlm {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(AppError::LLMApi("service unavailable".to_string()));
            }
            Ok(LLMResponse {
                content: "model answer".to_string(),
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn inspector(converter: Arc<FakeConverter>, llm: Arc<RecordingLlm>, text_limit: usize) -> TextInspectorTool {
        let config = InspectorConfig {
            use_open_models: false,
            proprietary_text_limit: text_limit,
            open_text_limit: 20_000,
        };
        TextInspectorTool::new(converter, llm, "o1", Arc::new(config))
    }

    fn text_of(message: &LLMMessage) -> &str {
        message.content.as_text().unwrap()
    }

    #[tokio::test]
    async fn test_images_are_refused_for_every_question() {
        let llm = Arc::new(RecordingLlm::default());
        let converter = FakeConverter::returning(None, "exif data");
        let tool = inspector(converter.clone(), llm.clone(), 70_000);

        for path in ["photo.png", "scan.jpg", "PHOTO.JPEG"] {
            for question in [None, Some("what is shown?")] {
                let err = tool.inspect(path, question).await.unwrap_err();
                assert!(matches!(err, AppError::UnsupportedInput(_)), "{path}");
                let err = tool.inspect_initial_exam(path, question).await.unwrap_err();
                assert!(matches!(err, AppError::UnsupportedInput(_)), "{path}");
            }
        }
        assert!(llm.requests().is_empty());
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_refused_even_when_conversion_would_fail() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::failing(), llm, 70_000);

        let err = tool.inspect("photo.png", Some("anything")).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_bare_dotfile_images_are_refused() {
        let llm = Arc::new(RecordingLlm::default());
        let converter = FakeConverter::returning(None, "exif data");
        let tool = inspector(converter.clone(), llm.clone(), 70_000);

        for path in [".png", "dir/.jpg", "uploads/.JPEG"] {
            let err = tool.inspect(path, Some("what is shown?")).await.unwrap_err();
            assert!(matches!(err, AppError::UnsupportedInput(_)), "{path}");
        }
        assert!(llm.requests().is_empty());
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bare_dotfile_archive_returns_listing() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::returning(None, "* a.txt"), llm.clone(), 70_000);

        assert_eq!(tool.inspect("downloads/.zip", Some("summarize")).await.unwrap(), "* a.txt");
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_archive_returns_listing_without_model_call() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::returning(Some("archive.zip"), "* a.txt\n* b.csv"), llm.clone(), 70_000);

        let answer = tool.inspect("archive.zip", Some("summarize")).await.unwrap();
        assert_eq!(answer, "* a.txt\n* b.csv");
        let answer = tool.inspect_initial_exam("archive.zip", Some("summarize")).await.unwrap();
        assert_eq!(answer, "* a.txt\n* b.csv");
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_question_dumps_full_text() {
        let llm = Arc::new(RecordingLlm::default());
        let text = "A".repeat(100_000);
        let tool = inspector(FakeConverter::returning(Some("Q3 Report"), &text), llm.clone(), 70_000);

        assert_eq!(tool.inspect("report.pdf", None).await.unwrap(), text);
        assert_eq!(tool.inspect("report.pdf", Some("")).await.unwrap(), text);
        assert_eq!(tool.inspect("report.pdf", Some("   ")).await.unwrap(), text);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_standard_prompt_truncates_to_limit() {
        let llm = Arc::new(RecordingLlm::default());
        let text = "A".repeat(100_000);
        let tool = inspector(FakeConverter::returning(Some("Q3 Report"), &text), llm.clone(), 70_000);

        let answer = tool.inspect("report.pdf", Some("What is the revenue?")).await.unwrap();
        assert_eq!(answer, "model answer");

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "o1");

        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(text_of(&messages[0]).contains("What is the revenue?"));

        let file_message = text_of(&messages[1]);
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(file_message.contains("### Q3 Report"));
        assert_eq!(file_message.matches('A').count(), 70_000);

        let headings = text_of(&messages[2]);
        assert!(headings.contains("1. Short answer"));
        assert!(headings.contains("2. Extremely detailed answer"));
        assert!(headings.contains("3. Additional Context"));
        assert!(headings.ends_with("What is the revenue?"));
    }

    #[tokio::test]
    async fn test_open_models_truncate_to_open_limit() {
        let llm = Arc::new(RecordingLlm::default());
        let text = "A".repeat(100_000);
        let config = InspectorConfig {
            use_open_models: true,
            proprietary_text_limit: 70_000,
            open_text_limit: 20_000,
        };
        let tool = TextInspectorTool::new(
            FakeConverter::returning(Some("Q3 Report"), &text),
            llm.clone(),
            "o1",
            Arc::new(config),
        );

        tool.inspect("report.pdf", Some("What is the revenue?")).await.unwrap();
        tool.inspect_initial_exam("report.pdf", Some("What is the revenue?")).await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(text_of(&requests[0].messages[1]).matches('A').count(), 20_000);
        assert_eq!(text_of(&requests[1].messages[0]).matches('A').count(), 20_000);
    }

    #[test]
    fn test_standard_prompt_joins_question_without_separator() {
        let messages = build_messages(PromptStyle::Standard, "notes.txt", "body", "Who wrote it?");
        assert_eq!(
            text_of(&messages[0]),
            "You will have to write a short caption for this file, then answer this question:Who wrote it?"
        );
        assert_eq!(text_of(&messages[1]), "Here is the complete file:\n### notes.txt\n\nbody");
        assert_eq!(
            text_of(&messages[2]),
            "Now answer the question below. Use these three headings: '1. Short answer', \
             '2. Extremely detailed answer', '3. Additional Context on the document and question asked'.\
             Who wrote it?"
        );
    }

    #[tokio::test]
    async fn test_initial_exam_prompt_shape() {
        let llm = Arc::new(RecordingLlm::default());
        let text = "A".repeat(100_000);
        let tool = inspector(FakeConverter::returning(Some("Q3 Report"), &text), llm.clone(), 70_000);

        tool.inspect_initial_exam("report.pdf", Some("What is the revenue?"))
            .await
            .unwrap();

        let messages = &llm.requests()[0].messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        let system = text_of(&messages[0]);
        assert!(system.starts_with("Here is a file:\n### Q3 Report\n\n"));
        assert_eq!(system.matches('A').count(), 70_000);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(text_of(&messages[1]), "What is the revenue?");
    }

    #[tokio::test]
    async fn test_short_text_is_forwarded_whole() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::returning(None, "tiny"), llm.clone(), 70_000);

        tool.inspect_initial_exam("notes.txt", Some("what?")).await.unwrap();

        let system = llm.requests()[0].messages[0].content.as_text().unwrap().to_string();
        assert_eq!(system, "Here is a file:\n### notes.txt\n\ntiny");
    }

    #[tokio::test]
    async fn test_conversion_error_propagates() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::failing(), llm.clone(), 70_000);

        let err = tool.inspect("broken.docx", Some("what?")).await.unwrap_err();
        assert!(matches!(err, AppError::Conversion(ConversionError::Malformed { .. })));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let llm = Arc::new(RecordingLlm {
            fail: true,
            ..Default::default()
        });
        let tool = inspector(FakeConverter::returning(None, "text"), llm, 70_000);

        let err = tool.inspect("notes.txt", Some("what?")).await.unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
    }

    #[tokio::test]
    async fn test_zip_substring_is_not_an_archive() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::returning(None, "contents"), llm.clone(), 70_000);

        let answer = tool.inspect("not.zipped.txt", Some("what?")).await.unwrap();
        assert_eq!(answer, "model answer");
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_parses_arguments() {
        let llm = Arc::new(RecordingLlm::default());
        let tool = inspector(FakeConverter::returning(None, "raw text"), llm, 70_000);

        let out = tool
            .execute(json!({"file_path": "notes.txt", "question": null}))
            .await
            .unwrap();
        assert_eq!(out, "raw text");

        let err = tool.execute(json!({"question": "what?"})).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 70_000), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_schema_requires_only_file_path() {
        let tool = inspector(FakeConverter::returning(None, ""), Arc::new(RecordingLlm::default()), 10);
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], json!(["file_path"]));
        assert!(schema["properties"]["question"].is_object());
        assert_eq!(tool.name(), "inspect_file_as_text");
    }
}
