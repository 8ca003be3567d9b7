// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod huggingface;
pub mod openrouter;

pub use provider::*;
pub use crate::types::*;
