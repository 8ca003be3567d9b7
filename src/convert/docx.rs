use std::path::Path;

use docx_rust::DocxFile;

use super::{ConversionError, ConversionResult};

pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let file = DocxFile::from_file(path).map_err(|e| ConversionError::malformed(path, format!("{:?}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| ConversionError::malformed(path, format!("{:?}", e)))?;

    // Paragraphs come back separated by CRLF
    let text = docx.document.body.text().replace("\r\n", "\n");
    Ok(ConversionResult::new(None, text))
}
