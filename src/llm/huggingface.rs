use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;

// Hugging Face inference providers router, OpenAI-compatible
const HF_ROUTER_API_BASE: &str = "https://router.huggingface.co/v1";

pub struct HuggingFaceAdapter {
    inner: crate::llm::openai::OpenAIAdapter,
}

impl HuggingFaceAdapter {
    pub fn new(api_key: &str) -> Self {
        Self {
            inner: crate::llm::openai::OpenAIAdapter::new_with_api_base(api_key, HF_ROUTER_API_BASE),
        }
    }
}

#[async_trait]
impl LLMAdapter for HuggingFaceAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.inner.create_chat_completion(request).await
    }
}
