//! Task-solving tools
//!
//! Tools handed to the manager agent. Each one declares a name, a description
//! and a JSON schema for its arguments, and is invoked with a JSON object.
//!
//! - **inspect_file_as_text**: reads documents, archives and audio as text and
//!   optionally answers a question about them
//! - **visualizer**: answers questions about images
//!
//! The set of tools is closed, so [`TaskTool`] dispatches statically and
//! [`Toolbox`] resolves tools by name.

pub mod text_inspector;
pub mod visual_qa;

pub use text_inspector::{PromptStyle, TextInspectorTool};
pub use visual_qa::VisualQaTool;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{AppError, AppResult};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, input: Value) -> AppResult<String>;
}

pub(crate) fn required_str<'a>(input: &'a Value, field: &str) -> AppResult<&'a str> {
    match input.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(AppError::InvalidRequest(format!("'{}' must not be empty", field))),
        Some(_) => Err(AppError::InvalidRequest(format!("'{}' must be a string", field))),
        None => Err(AppError::InvalidRequest(format!("Missing '{}' field", field))),
    }
}

pub(crate) fn optional_str<'a>(input: &'a Value, field: &str) -> AppResult<Option<&'a str>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AppError::InvalidRequest(format!("'{}' must be a string", field))),
    }
}

pub enum TaskTool {
    TextInspector(TextInspectorTool),
    Visualizer(VisualQaTool),
}

impl TaskTool {
    fn inner(&self) -> &dyn Tool {
        match self {
            TaskTool::TextInspector(tool) => tool as &dyn Tool,
            TaskTool::Visualizer(tool) => tool as &dyn Tool,
        }
    }
}

#[async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn description(&self) -> &str {
        self.inner().description()
    }

    fn parameters_schema(&self) -> Value {
        self.inner().parameters_schema()
    }

    async fn execute(&self, input: Value) -> AppResult<String> {
        match self {
            TaskTool::TextInspector(tool) => tool.execute(input).await,
            TaskTool::Visualizer(tool) => tool.execute(input).await,
        }
    }
}

impl From<TextInspectorTool> for TaskTool {
    fn from(tool: TextInspectorTool) -> Self {
        TaskTool::TextInspector(tool)
    }
}

impl From<VisualQaTool> for TaskTool {
    fn from(tool: VisualQaTool) -> Self {
        TaskTool::Visualizer(tool)
    }
}

/// The manager agent's task-solving toolbox
#[derive(Default)]
pub struct Toolbox {
    tools: Vec<TaskTool>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: impl Into<TaskTool>) -> Self {
        self.register(tool);
        self
    }

    /// Replaces any tool already registered under the same name
    pub fn register(&mut self, tool: impl Into<TaskTool>) {
        let tool = tool.into();
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&TaskTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn invoke(&self, name: &str, input: Value) -> AppResult<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| AppError::ToolNotFound(name.to_string()))?;
        tracing::debug!(tool = name, "Invoking tool");
        tool.execute(input).await
    }
}
