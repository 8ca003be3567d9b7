use std::sync::Arc;

use clap::{Parser, Subcommand};
use gaia_toolbox::config::Config;
use gaia_toolbox::convert::{MarkdownConverter, Transcriber};
use gaia_toolbox::llm::{LLMAdapter, LLMProviderConfig, LLM};
use gaia_toolbox::tools::{PromptStyle, TextInspectorTool, VisualQaTool};
use gaia_toolbox::{dataset, utils};
use tracing::info;

#[derive(Parser)]
#[command(name = "gaia-toolbox", version, about = "Run the GAIA task-solving tools by hand")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a file as text, optionally asking a question about it
    Inspect {
        file: String,
        #[arg(short, long)]
        question: Option<String>,
        /// Use the two-message initial exam prompt
        #[arg(long)]
        initial_exam: bool,
    },
    /// Ask a vision model about an image
    Visualize {
        image: String,
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Load a dataset split and show tasks per level
    Tasks {
        /// Split to load, defaults to GAIA_SET
        #[arg(long)]
        set: Option<String>,
    },
}

fn build_tool_llm(config: &Config) -> anyhow::Result<Arc<dyn LLMAdapter>> {
    let llm = LLM::new(LLMProviderConfig::from(config.llm.tools()))?;
    Ok(Arc::new(llm))
}

fn build_converter(config: &Config) -> MarkdownConverter {
    let endpoint = &config.llm.transcription;
    if endpoint.api_key.is_empty() {
        return MarkdownConverter::new();
    }
    let transcriber = match &endpoint.api_base {
        Some(base) => Transcriber::new_with_api_base(&endpoint.api_key, &endpoint.model, base),
        None => Transcriber::new(&endpoint.api_key, &endpoint.model),
    };
    MarkdownConverter::with_transcriber(transcriber)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logger();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        open_models = config.llm.use_open_models,
        model = %config.llm.active().model,
        tool_model = %config.llm.tools().model,
        text_limit = config.inspector.text_limit(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Inspect {
            file,
            question,
            initial_exam,
        } => {
            let tool = TextInspectorTool::new(
                Arc::new(build_converter(&config)),
                build_tool_llm(&config)?,
                config.llm.tools().model.clone(),
                Arc::new(config.inspector.clone()),
            );
            let style = if initial_exam {
                PromptStyle::InitialExam
            } else {
                PromptStyle::Standard
            };
            let output = tool.inspect_with_style(&file, question.as_deref(), style).await?;
            println!("{}", output);
        }
        Command::Visualize { image, question } => {
            let tool = VisualQaTool::new(build_tool_llm(&config)?, config.llm.tools().model.clone());
            let output = tool.visualize(&image, question.as_deref()).await?;
            println!("{}", output);
        }
        Command::Tasks { set } => {
            let set = set.unwrap_or_else(|| config.eval.set.clone());
            let rows = dataset::load_tasks(&config.eval.data_dir, &set)?;
            println!("Loaded evaluation dataset ({} tasks):", rows.len());
            for (level, count) in dataset::level_counts(&rows) {
                println!("  level {}: {}", level, count);
            }
            let attachments = rows.iter().filter(|row| row.has_attachment()).count();
            println!("  with attachments: {}", attachments);
        }
    }

    Ok(())
}
