// GAIA Toolbox - file inspection and visual QA tools for benchmark agents

pub mod config;
pub mod types;
pub mod llm;
pub mod convert;  // Document to markdown conversion
pub mod tools;    // inspect_file_as_text and visualizer
pub mod dataset;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use convert::{ConversionError, ConversionResult, DocumentConverter, MarkdownConverter};
pub use tools::{PromptStyle, TextInspectorTool, Toolbox, VisualQaTool};
pub use types::{AppError, AppResult};
