use std::path::Path;

use lopdf::Document;

use super::{ConversionError, ConversionResult};

pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let document = Document::load(path).map_err(|e| ConversionError::malformed(path, e))?;

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document
        .extract_text(&pages)
        .map_err(|e| ConversionError::malformed(path, e))?;

    Ok(ConversionResult::new(None, text.trim_end().to_string()))
}
