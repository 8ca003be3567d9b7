use async_trait::async_trait;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub api_base: Option<String>,
}

impl From<&crate::config::ModelConfig> for LLMProviderConfig {
    fn from(model: &crate::config::ModelConfig) -> Self {
        Self {
            name: model.provider.clone(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match (provider.name.as_str(), provider.api_base.as_deref()) {
            // An explicit base URL points any provider at an OpenAI-compatible gateway
            (_, Some(base)) => Box::new(crate::llm::openai::OpenAIAdapter::new_with_api_base(&provider.api_key, base)),
            ("openai", None) => Box::new(crate::llm::openai::OpenAIAdapter::new(&provider.api_key)),
            ("huggingface" | "hf", None) => Box::new(crate::llm::huggingface::HuggingFaceAdapter::new(&provider.api_key)),
            ("openrouter", None) => Box::new(crate::llm::openrouter::OpenRouterAdapter::new(&provider.api_key)),
            (other, None) => {
                return Err(AppError::InvalidRequest(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

#[async_trait]
impl LLMAdapter for LLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        tracing::debug!(provider = %self.provider_name, model = %request.model, messages = request.messages.len(), "Sending chat completion");
        self.adapter.create_chat_completion(request).await
    }
}
