//! Document conversion
//!
//! Turns files of many formats into a title and markdown-flavoured text that
//! can be forwarded to a language model or handed back to an agent verbatim.
//!
//! ```text
//! path ──► DocumentKind::from_path ──► html | spreadsheet | presentation | docx
//!                                      pdf  | audio       | archive      | text
//! ```
//!
//! Parsing runs on the blocking pool; audio goes through an OpenAI-compatible
//! transcription endpoint when a [`Transcriber`] is configured.

pub mod archive;
pub mod audio;
pub mod docx;
pub mod html;
pub mod pdf;
pub mod presentation;
pub mod spreadsheet;
pub mod text;

pub use audio::Transcriber;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extracted title and text of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub title: Option<String>,
    pub text_content: String,
}

impl ConversionResult {
    pub fn new(title: Option<String>, text_content: impl Into<String>) -> Self {
        Self {
            title,
            text_content: text_content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("File has no extension: {0}")]
    MissingExtension(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Conversion task failed: {0}")]
    Task(String),
}

impl ConversionError {
    pub(crate) fn malformed(path: &Path, reason: impl std::fmt::Display) -> Self {
        ConversionError::Malformed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConversionError {
    let path = path.display().to_string();
    move |source| ConversionError::Io { path, source }
}

/// Converts a file on disk into text
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, path: &Path) -> Result<ConversionResult, ConversionError>;
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Workbook,
    Csv,
    Presentation,
    Docx,
    Pdf,
    Audio,
    Archive,
    Image,
    Text,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => DocumentKind::Html,
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => DocumentKind::Workbook,
            "csv" => DocumentKind::Csv,
            "pptx" => DocumentKind::Presentation,
            "docx" => DocumentKind::Docx,
            "pdf" => DocumentKind::Pdf,
            "wav" | "mp3" | "flac" | "m4a" | "ogg" => DocumentKind::Audio,
            "zip" => DocumentKind::Archive,
            ext if IMAGE_EXTENSIONS.contains(&ext) => DocumentKind::Image,
            _ => DocumentKind::Text,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConversionError> {
        extension_of(path)
            .map(|ext| Self::from_extension(&ext))
            .ok_or_else(|| ConversionError::MissingExtension(path.display().to_string()))
    }
}

/// Lowercase extension of the final path component
///
/// A bare dotfile such as `.png` or `uploads/.jpg` counts as having the
/// extension after its leading dot.
pub fn extension_of(path: &Path) -> Option<String> {
    let ext = match path.extension() {
        Some(ext) => ext.to_str(),
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix('.')),
    };
    ext.filter(|ext| !ext.is_empty() && !ext.contains('.'))
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_image_path(path: &Path) -> bool {
    matches!(DocumentKind::from_path(path), Ok(DocumentKind::Image))
}

pub fn is_archive_path(path: &Path) -> bool {
    matches!(DocumentKind::from_path(path), Ok(DocumentKind::Archive))
}

/// Default converter covering every format the inspection tool advertises
#[derive(Default)]
pub struct MarkdownConverter {
    transcriber: Option<Transcriber>,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcriber(transcriber: Transcriber) -> Self {
        Self {
            transcriber: Some(transcriber),
        }
    }
}

fn convert_blocking(path: &Path, kind: DocumentKind) -> Result<ConversionResult, ConversionError> {
    match kind {
        DocumentKind::Html => html::convert(path),
        DocumentKind::Workbook => spreadsheet::convert_workbook(path),
        DocumentKind::Csv => spreadsheet::convert_csv(path),
        DocumentKind::Presentation => presentation::convert(path),
        DocumentKind::Docx => docx::convert(path),
        DocumentKind::Pdf => pdf::convert(path),
        DocumentKind::Archive => archive::convert(path),
        DocumentKind::Text => text::convert(path),
        DocumentKind::Image => Err(ConversionError::UnsupportedFormat(format!(
            "{} is an image; use the visualizer tool",
            path.display()
        ))),
        DocumentKind::Audio => Err(ConversionError::UnsupportedFormat(format!(
            "{} is audio and needs a transcriber",
            path.display()
        ))),
    }
}

#[async_trait]
impl DocumentConverter for MarkdownConverter {
    async fn convert(&self, path: &Path) -> Result<ConversionResult, ConversionError> {
        let kind = DocumentKind::from_path(path)?;
        debug!(path = %path.display(), kind = ?kind, "Converting document");

        if kind == DocumentKind::Audio {
            let transcriber = self.transcriber.as_ref().ok_or_else(|| {
                ConversionError::UnsupportedFormat("audio transcription is not configured".to_string())
            })?;
            let transcript = transcriber.transcribe(path).await?;
            return Ok(ConversionResult::new(None, format!("### Audio Transcript:\n{}", transcript)));
        }

        let owned: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || convert_blocking(&owned, kind))
            .await
            .map_err(|e| ConversionError::Task(e.to_string()))?
    }
}
