use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Character budget forwarded to proprietary models.
pub const PROPRIETARY_TEXT_LIMIT: usize = 70_000;
/// Character budget forwarded to open models.
pub const OPEN_TEXT_LIMIT: usize = 20_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub inspector: InspectorConfig,
    pub eval: EvalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub use_open_models: bool,
    pub proprietary: ModelConfig,
    pub open: ModelConfig,
    /// Speech-to-text endpoint; its key always belongs to its base URL
    pub transcription: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspectorConfig {
    pub use_open_models: bool,
    pub proprietary_text_limit: usize,
    pub open_text_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    pub output_dir: PathBuf,
    pub set: String,
    pub data_dir: PathBuf,
}

impl LLMConfig {
    /// Model driving the agents
    pub fn active(&self) -> &ModelConfig {
        if self.use_open_models {
            &self.open
        } else {
            &self.proprietary
        }
    }

    /// Model behind the file and image tools. Open models only shrink the
    /// inspector's text limit, the tools stay on the proprietary model.
    pub fn tools(&self) -> &ModelConfig {
        &self.proprietary
    }
}

impl InspectorConfig {
    pub fn text_limit(&self) -> usize {
        if self.use_open_models {
            self.open_text_limit
        } else {
            self.proprietary_text_limit
        }
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            use_open_models: false,
            proprietary_text_limit: PROPRIETARY_TEXT_LIMIT,
            open_text_limit: OPEN_TEXT_LIMIT,
        }
    }
}

impl EvalConfig {
    /// Where results for the configured split are written
    pub fn output_folder(&self) -> PathBuf {
        self.output_dir.join(&self.set)
    }
}

fn api_key_for(provider: &str) -> String {
    let var = match provider {
        "huggingface" => "HF_TOKEN",
        "openrouter" => "OPENROUTER_API_KEY",
        _ => "OPENAI_API_KEY",
    };
    env::var(var).unwrap_or_default()
}

/// Transcription shares a custom gateway with the proprietary model.
/// Without one it goes to OpenAI, so it needs an OpenAI key.
fn transcription_config(proprietary: &ModelConfig, model: String, openai_api_key: String) -> ModelConfig {
    let api_key = if proprietary.api_base.is_some() || proprietary.provider == "openai" {
        proprietary.api_key.clone()
    } else {
        openai_api_key
    };
    ModelConfig {
        provider: "openai".to_string(),
        model,
        api_key,
        api_base: proprietary.api_base.clone(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let use_open_models: bool = env::var("USE_OPEN_MODELS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()?;
        let api_base = env::var("LLM_API_BASE").ok();

        let proprietary_provider = env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let open_provider = env::var("OPEN_LLM_PROVIDER").unwrap_or_else(|_| "huggingface".to_string());

        let proprietary = ModelConfig {
            api_key: api_key_for(&proprietary_provider),
            provider: proprietary_provider,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "o1".to_string()),
            api_base: api_base.clone(),
        };
        let transcription = transcription_config(
            &proprietary,
            env::var("TRANSCRIPTION_MODEL").unwrap_or_else(|_| "whisper-1".to_string()),
            api_key_for("openai"),
        );

        Ok(Self {
            llm: LLMConfig {
                use_open_models,
                proprietary,
                open: ModelConfig {
                    api_key: api_key_for(&open_provider),
                    provider: open_provider,
                    model: env::var("OPEN_LLM_MODEL")
                        .unwrap_or_else(|_| "meta-llama/Meta-Llama-3.1-70B-Instruct".to_string()),
                    api_base,
                },
                transcription,
            },
            inspector: InspectorConfig {
                use_open_models,
                proprietary_text_limit: env::var("PROPRIETARY_TEXT_LIMIT")
                    .unwrap_or_else(|_| PROPRIETARY_TEXT_LIMIT.to_string())
                    .parse()?,
                open_text_limit: env::var("OPEN_TEXT_LIMIT")
                    .unwrap_or_else(|_| OPEN_TEXT_LIMIT.to_string())
                    .parse()?,
            },
            eval: EvalConfig {
                output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()).into(),
                set: env::var("GAIA_SET").unwrap_or_else(|_| "validation".to_string()),
                data_dir: env::var("GAIA_DATA_DIR").unwrap_or_else(|_| "data/gaia".to_string()).into(),
            },
        })
    }
}
